//! Process-local LRU cache.
//!
//! Expiry is lazy: a read that finds an expired slot drops it and reports a
//! miss.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;

use coherent_core::cache::{Cache, Result};

#[derive(Debug)]
struct Slot {
    bytes: Vec<u8>,
    deadline: Option<Instant>,
}

impl Slot {
    fn live_at(&self, now: Instant) -> bool {
        self.deadline.is_none_or(|deadline| now <= deadline)
    }
}

/// Cache bounded by entry count. Clones share the same slots.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    slots: Arc<Mutex<LruCache<String, Slot>>>,
}

impl MemoryCache {
    /// A zero bound is raised to one.
    pub fn new(max_entries: usize) -> Self {
        let bound = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            slots: Arc::new(Mutex::new(LruCache::new(bound))),
        }
    }

    /// Slots currently held, including expired ones not yet read.
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Instant::now();
        let mut slots = self.slots.lock().await;
        let hit = slots
            .get(key)
            .filter(|slot| slot.live_at(now))
            .map(|slot| slot.bytes.clone());
        if hit.is_none() {
            slots.pop(key);
        }
        Ok(hit)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let slot = Slot {
            bytes: value.to_vec(),
            deadline: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.slots.lock().await.put(key.to_owned(), slot);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.slots.lock().await.pop(key);
        Ok(())
    }
}
