use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnuityError {
    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Logarithm domain error: argument {argument} is not positive")]
    LogarithmDomainError { argument: Decimal },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for AnnuityError {
    fn from(e: serde_json::Error) -> Self {
        AnnuityError::SerializationError(e.to_string())
    }
}
