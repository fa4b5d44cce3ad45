//! Ordinary ("vencida") and due ("anticipada") annuities.
//!
//! Given three of the four annuity variables (payment `R`, periodic rate `i`,
//! number of periods `n`, and one of present value `P` / future value `F`),
//! [`formulas`] solves for the missing one in closed form and [`solver`]
//! validates a whole request and dispatches it to the right formula.
//!
//! Due-annuity values are the ordinary values scaled by `(1 + i)`.

pub mod formulas;
pub mod solver;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AnnuityError;

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

/// When each payment falls within its period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    /// Payments at the end of each period.
    #[default]
    #[serde(alias = "vencida", alias = "end")]
    Ordinary,
    /// Payments at the start of each period.
    #[serde(alias = "anticipada", alias = "start")]
    Due,
}

impl std::fmt::Display for Timing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timing::Ordinary => write!(f, "ordinary"),
            Timing::Due => write!(f, "due"),
        }
    }
}

impl FromStr for Timing {
    type Err = AnnuityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ordinary" | "vencida" | "end" => Ok(Timing::Ordinary),
            "due" | "anticipada" | "start" => Ok(Timing::Due),
            other => Err(AnnuityError::InvalidSelection(format!(
                "unknown annuity timing '{other}'. Use: ordinary, due"
            ))),
        }
    }
}

/// The unknown being solved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    #[serde(alias = "F", alias = "f")]
    FutureValue,
    #[serde(alias = "P", alias = "p")]
    PresentValue,
    #[serde(alias = "R", alias = "r")]
    Payment,
    #[serde(alias = "n", alias = "N")]
    Periods,
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::FutureValue => write!(f, "future value (F)"),
            Target::PresentValue => write!(f, "present value (P)"),
            Target::Payment => write!(f, "payment (R)"),
            Target::Periods => write!(f, "periods (n)"),
        }
    }
}

impl FromStr for Target {
    type Err = AnnuityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // Single letters are matched case-insensitively, so "N" is periods too.
        match trimmed.to_lowercase().as_str() {
            "f" | "future" | "future_value" | "future-value" => Ok(Target::FutureValue),
            "p" | "present" | "present_value" | "present-value" => Ok(Target::PresentValue),
            "r" | "payment" | "rent" => Ok(Target::Payment),
            "n" | "periods" => Ok(Target::Periods),
            _ => Err(AnnuityError::InvalidSelection(format!(
                "unknown target '{trimmed}'. Use: F, P, R, n"
            ))),
        }
    }
}

/// Which of present or future value is supplied when solving for `R` or `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnownValue {
    #[serde(alias = "P", alias = "p")]
    Present,
    #[serde(alias = "F", alias = "f")]
    Future,
}

impl std::fmt::Display for KnownValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KnownValue::Present => write!(f, "present value"),
            KnownValue::Future => write!(f, "future value"),
        }
    }
}

/// How a fractional period count is turned into a whole number of payments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodRounding {
    /// Round half away from zero.
    #[default]
    Nearest,
    /// Round any fractional remainder up to the next whole period.
    Up,
}

impl FromStr for PeriodRounding {
    type Err = AnnuityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nearest" | "round" => Ok(PeriodRounding::Nearest),
            "up" | "ceil" | "ceiling" => Ok(PeriodRounding::Up),
            other => Err(AnnuityError::InvalidSelection(format!(
                "unknown period rounding '{other}'. Use: nearest, up"
            ))),
        }
    }
}
