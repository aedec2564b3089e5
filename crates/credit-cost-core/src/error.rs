use thiserror::Error;

#[derive(Debug, Error)]
pub enum CreditCostError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CreditCostError {
    fn from(e: serde_json::Error) -> Self {
        CreditCostError::SerializationError(e.to_string())
    }
}
