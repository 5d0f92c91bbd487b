use std::time::Duration;

use thiserror::Error;

/// Errors raised by cache backends.
///
/// None of these reach repository callers: the repository logs them and falls
/// back to the store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
    #[error("Cache value could not be (de)serialized: {0}")]
    Serialization(String),
    /// The call did not finish within its budget, in milliseconds.
    #[error("Cache call exceeded its {0}ms budget")]
    Timeout(u64),
}

impl CacheError {
    pub fn timeout(budget: Duration) -> Self {
        Self::Timeout(u64::try_from(budget.as_millis()).unwrap_or(u64::MAX))
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
