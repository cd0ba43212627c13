pub mod error;
pub mod pricing;
pub mod stats;
pub mod strategy;
pub mod types;

pub use error::ScreenerError;
pub use types::*;

/// Standard result type for all screener operations
pub type ScreenerResult<T> = Result<T, ScreenerError>;
