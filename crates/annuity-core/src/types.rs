use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::annuity::formulas::EPSILON;

/// Monetary amounts (payments, present and future values). Never f64.
pub type Money = Decimal;

/// Periodic rates expressed as decimals (0.05 = 5% per period). Never as percentages.
pub type Rate = Decimal;

/// Envelope returned by every request-level calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    /// The formula that produced `result`.
    pub methodology: String,
    /// Echo of the request as received.
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
    /// Magnitude below which rates and payments count as zero.
    pub tolerance: Decimal,
}

/// Wrap a result in the standard envelope, timing it from `start`.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    start: Instant,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: start.elapsed().as_micros() as u64,
            precision: "rust_decimal_128bit".to_string(),
            tolerance: EPSILON,
        },
    }
}
