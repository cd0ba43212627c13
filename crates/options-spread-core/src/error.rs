use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreenerError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unsupported strategy: {0}")]
    UnsupportedStrategy(String),

    #[error("No trade found with a positive expected result")]
    NoTradeFound,

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ScreenerError {
    fn from(e: serde_json::Error) -> Self {
        ScreenerError::SerializationError(e.to_string())
    }
}
