use coherent_core::cache::CacheError;
use redis::{ErrorKind, RedisError};

/// Classifies a Redis failure. Socket level failures are connection errors,
/// a reply of the wrong type is a serialization error.
pub fn map_redis_error(err: RedisError) -> CacheError {
    let message = err.to_string();
    if err.is_connection_refusal() || err.is_connection_dropped() || err.is_timeout() {
        return CacheError::ConnectionFailed(message);
    }
    match err.kind() {
        ErrorKind::TypeError => CacheError::Serialization(message),
        _ => CacheError::OperationFailed(message),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_socket_failures_are_connection_errors() {
        for kind in [io::ErrorKind::ConnectionRefused, io::ErrorKind::TimedOut] {
            let err = RedisError::from(io::Error::new(kind, "socket"));
            assert!(matches!(map_redis_error(err), CacheError::ConnectionFailed(_)));
        }
    }

    #[test]
    fn test_reply_errors() {
        let wrong_type = RedisError::from((ErrorKind::TypeError, "not bytes"));
        assert!(matches!(
            map_redis_error(wrong_type),
            CacheError::Serialization(_)
        ));

        let rejected = RedisError::from((ErrorKind::ResponseError, "WRONGTYPE"));
        assert!(matches!(
            map_redis_error(rejected),
            CacheError::OperationFailed(_)
        ));
    }
}
