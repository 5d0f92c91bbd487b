use thiserror::Error;

use super::CollectionKind;

/// Errors that can occur while encoding, decoding or mutating a collection column.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Failed to encode collection: {0}")]
    Encode(String),
    #[error("Failed to decode collection: {0}")]
    Decode(String),
    #[error("Operation '{op}' is not supported on a {kind} collection")]
    UnsupportedOperation {
        kind: CollectionKind,
        op: &'static str,
    },
    #[error("Invalid map key: {0:?}")]
    InvalidKey(String),
}

/// Result type for collection codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
