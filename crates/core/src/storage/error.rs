use thiserror::Error;

use crate::collection::CodecError;
use crate::convention::{IdentifierError, TimestampError};

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Invalid {entity_type} status: {status}")]
    InvalidStatus {
        entity_type: &'static str,
        status: String,
    },
}

/// Coarse classification of repository errors for callers deciding how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The requested row does not exist.
    NotFound,
    /// The store failed; the operation may succeed later.
    Store,
    /// A value could not be encoded or decoded.
    Encoding,
    /// The request itself is wrong and will never succeed as issued.
    Caller,
}

impl RepositoryError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::AlreadyExists { .. } | Self::ConnectionFailed(_) | Self::QueryFailed(_) => {
                ErrorClass::Store
            }
            Self::Serialization(_) => ErrorClass::Encoding,
            Self::InvalidData(_) | Self::InvalidStatus { .. } => ErrorClass::Caller,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<CodecError> for RepositoryError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Encode(_) | CodecError::Decode(_) => Self::Serialization(err.to_string()),
            CodecError::UnsupportedOperation { .. } | CodecError::InvalidKey(_) => {
                Self::InvalidData(err.to_string())
            }
        }
    }
}

impl From<IdentifierError> for RepositoryError {
    fn from(err: IdentifierError) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<TimestampError> for RepositoryError {
    fn from(err: TimestampError) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionKind;

    #[test]
    fn test_repository_error_not_found_display() {
        let error = RepositoryError::NotFound {
            entity_type: "Conference",
            id: "abc-123".to_string(),
        };
        assert_eq!(error.to_string(), "Conference not found: abc-123");
        assert!(error.is_not_found());
    }

    #[test]
    fn test_repository_error_already_exists_display() {
        let error = RepositoryError::AlreadyExists {
            entity_type: "Chat",
            id: "abc-123".to_string(),
        };
        assert_eq!(error.to_string(), "Chat already exists: abc-123");
    }

    #[test]
    fn test_repository_error_invalid_status_display() {
        let error = RepositoryError::InvalidStatus {
            entity_type: "Recording",
            status: "paused".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid Recording status: paused");
    }

    #[test]
    fn test_error_classes() {
        let cases = [
            (
                RepositoryError::NotFound {
                    entity_type: "Trunk",
                    id: "x".to_string(),
                },
                ErrorClass::NotFound,
            ),
            (
                RepositoryError::ConnectionFailed("down".to_string()),
                ErrorClass::Store,
            ),
            (
                RepositoryError::QueryFailed("syntax".to_string()),
                ErrorClass::Store,
            ),
            (
                RepositoryError::AlreadyExists {
                    entity_type: "Trunk",
                    id: "x".to_string(),
                },
                ErrorClass::Store,
            ),
            (
                RepositoryError::Serialization("bad json".to_string()),
                ErrorClass::Encoding,
            ),
            (
                RepositoryError::InvalidData("unknown column".to_string()),
                ErrorClass::Caller,
            ),
            (
                RepositoryError::InvalidStatus {
                    entity_type: "Recording",
                    status: "initiating".to_string(),
                },
                ErrorClass::Caller,
            ),
        ];

        for (error, class) in cases {
            assert_eq!(error.class(), class, "{error}");
        }
    }

    #[test]
    fn test_codec_errors_map_by_kind() {
        let decode: RepositoryError = CodecError::Decode("eof".to_string()).into();
        assert_eq!(decode.class(), ErrorClass::Encoding);

        let unsupported: RepositoryError = CodecError::UnsupportedOperation {
            kind: CollectionKind::List,
            op: "set_key",
        }
        .into();
        assert_eq!(unsupported.class(), ErrorClass::Caller);
    }
}
