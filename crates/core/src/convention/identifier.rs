//! Identifier columns are stored as 16 raw bytes rather than their 36-char
//! text form, keeping primary and secondary indexes compact.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when decoding a binary identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Invalid identifier length: expected 16 bytes, got {0}")]
    InvalidLength(usize),
}

/// Encodes an identifier for storage.
pub fn uuid_to_bytes(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

/// Decodes a stored identifier.
pub fn uuid_from_bytes(bytes: &[u8]) -> Result<Uuid, IdentifierError> {
    Uuid::from_slice(bytes).map_err(|_| IdentifierError::InvalidLength(bytes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_are_fixed_width() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let bytes = uuid_to_bytes(id);
        assert_eq!(bytes.len(), 16);
        assert_eq!(uuid_from_bytes(&bytes), Ok(id));
    }

    #[test]
    fn test_nil_is_all_zero() {
        assert_eq!(uuid_to_bytes(Uuid::nil()), vec![0u8; 16]);
    }

    #[test]
    fn test_invalid_length() {
        assert_eq!(
            uuid_from_bytes(&[1, 2, 3]),
            Err(IdentifierError::InvalidLength(3))
        );
    }

    #[test]
    fn test_byte_order_matches_uuid_order() {
        let low = Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap();
        let high = Uuid::parse_str("10000000-0000-0000-0000-000000000000").unwrap();
        assert!(low < high);
        assert!(uuid_to_bytes(low) < uuid_to_bytes(high));
    }
}
