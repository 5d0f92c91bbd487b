use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Byte-valued look-aside cache in front of a [`Store`](crate::storage::Store).
///
/// Never authoritative: any entry may be missing or stale, and callers treat
/// every error as a miss.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value. `None` keeps
    /// it until evicted.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;
}
