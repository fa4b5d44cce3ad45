pub mod annuity;
pub mod error;
pub mod types;

pub use annuity::solver::{solve_annuity, AnnuityInput, AnnuityOutput};
pub use annuity::{KnownValue, PeriodRounding, Target, Timing};
pub use error::AnnuityError;
pub use types::*;

/// Standard result type for all annuity operations
pub type AnnuityResult<T> = Result<T, AnnuityError>;
