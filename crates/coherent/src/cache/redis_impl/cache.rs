use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use coherent_core::cache::{Cache, Result};

use super::error::map_redis_error;

/// Redis rejects `PX 0`, so sub-millisecond TTLs round up.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

/// Cache shared by every process pointing at the same Redis database.
///
/// Holds a [`ConnectionManager`], which reconnects after a dropped socket;
/// clones share it.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Opens a managed connection to `url`.
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(map_redis_error)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut command = redis::cmd("SET");
        command.arg(key).arg(value);
        if let Some(ttl) = ttl {
            command.arg("PX").arg(ttl_millis(ttl));
        }

        let mut conn = self.conn.clone();
        let _: () = command
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await.map_err(map_redis_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use coherent_core::cache::{entity_key, secondary_key};
    use coherent_core::entity::trunk;
    use coherent_core::storage::FieldValue;
    use uuid::Uuid;

    use super::*;

    /// `None` when no Redis answers at `REDIS_URL`; such tests pass vacuously.
    async fn connect() -> Option<RedisCache> {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        match RedisCache::new(&url).await {
            Ok(cache) => Some(cache),
            Err(err) => {
                eprintln!("Skipping Redis test: {err}");
                None
            }
        }
    }

    #[test]
    fn test_ttl_millis() {
        assert_eq!(ttl_millis(Duration::from_secs(300)), 300_000);
        assert_eq!(ttl_millis(Duration::from_micros(10)), 1);
        assert_eq!(ttl_millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_primary_and_secondary_keys() {
        let Some(cache) = connect().await else { return };
        let id = Uuid::new_v4();
        let primary = entity_key(&trunk::SCHEMA, id);
        let secondary = secondary_key(
            &trunk::SCHEMA,
            trunk::DOMAIN_NAME,
            &FieldValue::from(format!("{id}.example")),
        );

        cache.set(&primary, b"{}", None).await.unwrap();
        cache
            .set(&secondary, b"{}", Some(Duration::from_secs(30)))
            .await
            .unwrap();
        assert_eq!(cache.get(&primary).await.unwrap(), Some(b"{}".to_vec()));
        assert_eq!(cache.get(&secondary).await.unwrap(), Some(b"{}".to_vec()));

        cache.delete(&primary).await.unwrap();
        cache.delete(&secondary).await.unwrap();
        cache.delete(&secondary).await.unwrap();
        assert_eq!(cache.get(&primary).await.unwrap(), None);
        assert_eq!(cache.get(&secondary).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ttl_expires() {
        let Some(cache) = connect().await else { return };
        let key = entity_key(&trunk::SCHEMA, Uuid::new_v4());

        cache
            .set(&key, b"brief", Some(Duration::from_millis(200)))
            .await
            .unwrap();
        assert!(cache.get(&key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(cache.get(&key).await.unwrap(), None);
    }
}
