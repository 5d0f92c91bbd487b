//! Cached entity repository.
//!
//! Wraps a `Store` with a look-aside `Cache`:
//! - **Reads**: check the cache first; on a miss (or any cache failure) read
//!   the store and populate the cache
//! - **Writes**: persist to the store, re-read the row, overwrite the id key
//!   with the re-read value and drop the entity's secondary keys
//! - **Secondary lookups**: the key is written only after the store picked
//!   the row
//! - **Lists**: store only
//!
//! The store is authoritative. Cache failures are logged and never surface to
//! the caller; every cache call is bounded by `cache_timeout`.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use coherent_core::cache::{
    deserialize_entity, entity_key, secondary_key, serialize_entity, Cache, CacheError,
};
use coherent_core::collection::CollectionOp;
use coherent_core::convention::{Clock, Timestamp};
use coherent_core::entity::Entity;
use coherent_core::storage::schema::{IMMUTABLE_COLUMNS, TM_DELETE, TM_UPDATE};
use coherent_core::storage::{
    FieldValue, ListQuery, Lookup, Page, RepositoryError, Result, Store,
};

/// Tunables of the cache layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryOptions {
    /// Time-to-live of every cached entity.
    pub cache_ttl: Duration,
    /// Budget of a single cache call. Past it the call counts as failed.
    pub cache_timeout: Duration,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            cache_timeout: Duration::from_millis(100),
        }
    }
}

/// Repository for one entity kind.
///
/// # Type Parameters
///
/// * `E` - The entity kind
/// * `S` - The store implementation
/// * `C` - The cache implementation
pub struct CachedRepository<E, S, C>
where
    S: Store + ?Sized,
    C: Cache + ?Sized,
{
    store: Arc<S>,
    cache: Arc<C>,
    clock: Arc<dyn Clock>,
    options: RepositoryOptions,
    _entity: PhantomData<fn() -> E>,
}

impl<E, S, C> Clone for CachedRepository<E, S, C>
where
    S: Store + ?Sized,
    C: Cache + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            clock: Arc::clone(&self.clock),
            options: self.options,
            _entity: PhantomData,
        }
    }
}

impl<E, S, C> CachedRepository<E, S, C>
where
    E: Entity,
    S: Store + ?Sized,
    C: Cache + ?Sized,
{
    pub fn new(
        store: Arc<S>,
        cache: Arc<C>,
        clock: Arc<dyn Clock>,
        options: RepositoryOptions,
    ) -> Self {
        Self {
            store,
            cache,
            clock,
            options,
            _entity: PhantomData,
        }
    }

    pub(crate) fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Creates the kind's table and indexes if missing.
    pub async fn ensure_table(&self) -> Result<()> {
        self.store.ensure_table(E::SCHEMA).await
    }

    /// Gets an entity by id. Tombstoned entities are returned too.
    pub async fn get(&self, id: Uuid) -> Result<E> {
        let key = entity_key(E::SCHEMA, id);

        if let Some(entity) = self.cache_get(&key).await {
            tracing::trace!(entity_type = E::SCHEMA.entity_type, %id, "Cache hit");
            return Ok(entity);
        }

        tracing::trace!(entity_type = E::SCHEMA.entity_type, %id, "Cache miss");
        let row = self.store.get(E::SCHEMA, Lookup::by_id(id)).await?;
        let entity = E::from_row(&row)?;
        self.cache_set(&key, &entity).await;
        Ok(entity)
    }

    /// Gets the most recently created alive entity whose secondary column
    /// equals `value`.
    ///
    /// Only this path writes secondary keys, with the row the store picked.
    /// Writes drop the keys of the entity they touch, so a newer row sharing
    /// the value is found on the next lookup.
    pub async fn get_by(&self, column: &'static str, value: impl Into<FieldValue>) -> Result<E> {
        if !E::SCHEMA.is_secondary_key(column) {
            return Err(RepositoryError::InvalidData(format!(
                "'{column}' is not a lookup column of {}",
                E::SCHEMA.entity_type
            )));
        }
        let value = value.into();
        let key = secondary_key(E::SCHEMA, column, &value);

        if let Some(entity) = self.cache_get(&key).await {
            if still_matches(&entity, column, &value) {
                tracing::trace!(entity_type = E::SCHEMA.entity_type, %key, "Cache hit");
                return Ok(entity);
            }
            tracing::trace!(entity_type = E::SCHEMA.entity_type, %key, "Stale cache entry");
        } else {
            tracing::trace!(entity_type = E::SCHEMA.entity_type, %key, "Cache miss");
        }

        let row = self
            .store
            .get(E::SCHEMA, Lookup::by_column(column, value))
            .await?;
        let entity = E::from_row(&row)?;
        self.cache_set(&entity_key(E::SCHEMA, entity.id()), &entity).await;
        self.cache_set(&key, &entity).await;
        Ok(entity)
    }

    /// Persists a new entity and caches the stored row.
    ///
    /// `tm_create` is stamped with the current time unless already set;
    /// `tm_update` and `tm_delete` always start at the sentinel.
    pub async fn create(&self, entity: &E) -> Result<()> {
        let mut entity = entity.clone();
        let timestamps = entity.timestamps_mut();
        if timestamps.tm_create.is_sentinel() {
            timestamps.tm_create = self.clock.now();
        }
        timestamps.tm_update = Timestamp::sentinel();
        timestamps.tm_delete = Timestamp::sentinel();

        let id = entity.id();
        self.store.insert(E::SCHEMA, entity.to_row()?).await?;
        tracing::debug!(entity_type = E::SCHEMA.entity_type, %id, "Entity created");

        self.refresh(id).await;
        Ok(())
    }

    /// Updates the named scalar columns and stamps `tm_update`.
    ///
    /// An empty field set is a no-op. Identity columns are rejected.
    pub async fn update(&self, id: Uuid, fields: Vec<(&'static str, FieldValue)>) -> Result<()> {
        self.update_at(id, fields, self.clock.now()).await
    }

    /// Like [`Self::update`], with `tm_update` set to `now`.
    pub(crate) async fn update_at(
        &self,
        id: Uuid,
        mut fields: Vec<(&'static str, FieldValue)>,
        now: Timestamp,
    ) -> Result<()> {
        if fields.is_empty() {
            return Ok(());
        }
        if let Some((name, _)) = fields.iter().find(|(name, _)| IMMUTABLE_COLUMNS.contains(name)) {
            return Err(RepositoryError::InvalidData(format!(
                "column '{name}' cannot be updated"
            )));
        }

        fields.push((TM_UPDATE, now.into()));
        self.store.update_fields(E::SCHEMA, id, fields).await?;
        tracing::debug!(entity_type = E::SCHEMA.entity_type, %id, "Entity updated");

        self.refresh(id).await;
        Ok(())
    }

    /// Applies one single-element collection operation in the store.
    pub async fn mutate(&self, id: Uuid, column: &'static str, op: CollectionOp) -> Result<()> {
        let op_name = op.name();
        self.store
            .mutate_collection(E::SCHEMA, id, column, op, self.clock.now())
            .await?;
        tracing::debug!(
            entity_type = E::SCHEMA.entity_type,
            %id,
            column,
            op = op_name,
            "Collection mutated"
        );

        self.refresh(id).await;
        Ok(())
    }

    /// Tombstones an entity. The cache keeps the tombstoned value.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let now = self.clock.now();
        self.store
            .update_fields(
                E::SCHEMA,
                id,
                vec![(TM_UPDATE, now.into()), (TM_DELETE, now.into())],
            )
            .await?;
        tracing::debug!(entity_type = E::SCHEMA.entity_type, %id, "Entity deleted");

        self.refresh(id).await;
        Ok(())
    }

    /// Lists one page from the store in `(tm_create DESC, id DESC)` order.
    pub async fn list(&self, query: &ListQuery) -> Result<Page<E>> {
        let rows = self.store.list(E::SCHEMA, query).await?;
        let items = rows.iter().map(E::from_row).collect::<Result<Vec<_>>>()?;
        Ok(Page::from_items(items, query.limit))
    }

    /// Re-reads the row and overwrites its id key. Secondary keys of the
    /// previously cached value and of the re-read value are dropped. Failures
    /// are logged only; the store write already succeeded.
    async fn refresh(&self, id: Uuid) {
        let key = entity_key(E::SCHEMA, id);
        let previous = self.cache_get(&key).await;
        let entity = match self.store.get(E::SCHEMA, Lookup::by_id(id)).await {
            Ok(row) => E::from_row(&row),
            Err(err) => Err(err),
        };
        match entity {
            Ok(entity) => {
                let mut stale = self.secondary_cache_keys(&entity);
                for old in previous.iter().flat_map(|p| self.secondary_cache_keys(p)) {
                    if !stale.contains(&old) {
                        stale.push(old);
                    }
                }
                for stale_key in stale {
                    self.cache_delete(&stale_key).await;
                }
                self.cache_set(&key, &entity).await;
            }
            Err(err) => {
                tracing::warn!(
                    entity_type = E::SCHEMA.entity_type,
                    %id,
                    error = %err,
                    "Failed to refresh cache after write"
                );
            }
        }
    }

    async fn cache_set(&self, key: &str, entity: &E) {
        let bytes = match serialize_entity(entity) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(
                    entity_type = E::SCHEMA.entity_type,
                    id = %entity.id(),
                    error = %err,
                    "Failed to serialize entity for cache"
                );
                return;
            }
        };

        let ttl = Some(self.options.cache_ttl);
        if let Err(err) = self.bounded(self.cache.set(key, &bytes, ttl)).await {
            tracing::warn!(
                entity_type = E::SCHEMA.entity_type,
                %key,
                error = %err,
                "Failed to cache entity"
            );
        }
    }

    fn secondary_cache_keys(&self, entity: &E) -> Vec<String> {
        match entity.secondary_keys() {
            Ok(secondary) => secondary
                .iter()
                .map(|(column, value)| secondary_key(E::SCHEMA, column, value))
                .collect(),
            Err(err) => {
                tracing::warn!(
                    entity_type = E::SCHEMA.entity_type,
                    id = %entity.id(),
                    error = %err,
                    "Failed to compute secondary cache keys"
                );
                Vec::new()
            }
        }
    }

    async fn cache_delete(&self, key: &str) {
        if let Err(err) = self.bounded(self.cache.delete(key)).await {
            tracing::warn!(
                entity_type = E::SCHEMA.entity_type,
                %key,
                error = %err,
                "Failed to drop cache key"
            );
        }
    }

    /// Reads a cached entity. Errors, timeouts and undecodable values are
    /// misses.
    async fn cache_get(&self, key: &str) -> Option<E> {
        let bytes = match self.bounded(self.cache.get(key)).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(
                    entity_type = E::SCHEMA.entity_type,
                    %key,
                    error = %err,
                    "Cache read failed"
                );
                return None;
            }
        };

        match deserialize_entity(&bytes) {
            Ok(entity) => Some(entity),
            Err(err) => {
                tracing::warn!(
                    entity_type = E::SCHEMA.entity_type,
                    %key,
                    error = %err,
                    "Cache entry deserialization failed"
                );
                None
            }
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = coherent_core::cache::Result<T>>,
    ) -> coherent_core::cache::Result<T> {
        let budget = self.options.cache_timeout;
        tokio::time::timeout(budget, call)
            .await
            .unwrap_or_else(|_| Err(CacheError::timeout(budget)))
    }
}

/// A cached secondary hit is usable only while it is alive and still carries
/// the looked-up value.
fn still_matches<E: Entity>(entity: &E, column: &str, value: &FieldValue) -> bool {
    if entity.timestamps().is_deleted() {
        return false;
    }
    match entity.to_row() {
        Ok(row) => row.get(column) == Some(value),
        Err(_) => false,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::RwLock;

    use coherent_core::convention::ManualClock;
    use coherent_core::entity::{chat, trunk, Chat, ChatType, Trunk};
    use coherent_core::storage::{EntitySchema, Row};

    use crate::cache::MemoryCache;
    use crate::storage::InMemoryStore;

    /// Store wrapper counting point reads.
    #[derive(Default)]
    pub(crate) struct CountingStore {
        inner: InMemoryStore,
        gets: AtomicUsize,
    }

    impl CountingStore {
        pub(crate) fn gets(&self) -> usize {
            self.gets.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Store for CountingStore {
        async fn ensure_table(&self, schema: &'static EntitySchema) -> Result<()> {
            self.inner.ensure_table(schema).await
        }

        async fn insert(&self, schema: &'static EntitySchema, row: Row) -> Result<()> {
            self.inner.insert(schema, row).await
        }

        async fn get(&self, schema: &'static EntitySchema, lookup: Lookup) -> Result<Row> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            self.inner.get(schema, lookup).await
        }

        async fn list(&self, schema: &'static EntitySchema, query: &ListQuery) -> Result<Vec<Row>> {
            self.inner.list(schema, query).await
        }

        async fn update_fields(
            &self,
            schema: &'static EntitySchema,
            id: Uuid,
            fields: Vec<(&'static str, FieldValue)>,
        ) -> Result<()> {
            self.inner.update_fields(schema, id, fields).await
        }

        async fn mutate_collection(
            &self,
            schema: &'static EntitySchema,
            id: Uuid,
            column: &'static str,
            op: CollectionOp,
            tm_update: Timestamp,
        ) -> Result<()> {
            self.inner
                .mutate_collection(schema, id, column, op, tm_update)
                .await
        }
    }

    /// Cache that fails every call.
    struct FailingCache;

    #[async_trait]
    impl Cache for FailingCache {
        async fn get(&self, _key: &str) -> coherent_core::cache::Result<Option<Vec<u8>>> {
            Err(CacheError::ConnectionFailed("refused".to_string()))
        }

        async fn set(
            &self,
            _key: &str,
            _value: &[u8],
            _ttl: Option<Duration>,
        ) -> coherent_core::cache::Result<()> {
            Err(CacheError::ConnectionFailed("refused".to_string()))
        }

        async fn delete(&self, _key: &str) -> coherent_core::cache::Result<()> {
            Err(CacheError::ConnectionFailed("refused".to_string()))
        }
    }

    /// Cache that answers far past any reasonable budget.
    #[derive(Default)]
    struct SlowCache {
        entries: RwLock<std::collections::HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl Cache for SlowCache {
        async fn get(&self, key: &str) -> coherent_core::cache::Result<Option<Vec<u8>>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(self.entries.read().await.get(key).cloned())
        }

        async fn set(
            &self,
            key: &str,
            value: &[u8],
            _ttl: Option<Duration>,
        ) -> coherent_core::cache::Result<()> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            self.entries
                .write()
                .await
                .insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn delete(&self, key: &str) -> coherent_core::cache::Result<()> {
            self.entries.write().await.remove(key);
            Ok(())
        }
    }

    pub(crate) fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            "2024-06-15 10:30:00.000000".parse().unwrap(),
        ))
    }

    async fn repo<E: Entity, C: Cache>(
        cache: C,
        clock: Arc<ManualClock>,
    ) -> (CachedRepository<E, CountingStore, C>, Arc<CountingStore>, Arc<C>) {
        let store = Arc::new(CountingStore::default());
        let cache = Arc::new(cache);
        let options = RepositoryOptions {
            cache_ttl: Duration::from_secs(60),
            cache_timeout: Duration::from_millis(20),
        };
        let repo = CachedRepository::new(Arc::clone(&store), Arc::clone(&cache), clock, options);
        repo.ensure_table().await.unwrap();
        (repo, store, cache)
    }

    fn sample_chat() -> Chat {
        Chat::new(Uuid::from_u128(0xc), ChatType::Group)
            .with_id(Uuid::from_u128(1))
            .with_participants(vec![Uuid::from_u128(0xa), Uuid::from_u128(0xb)])
    }

    #[tokio::test]
    async fn test_create_stamps_and_caches() {
        let clock = clock();
        let (repo, store, cache) = repo::<Chat, _>(MemoryCache::new(100), clock.clone()).await;

        repo.create(&sample_chat()).await.unwrap();
        assert_eq!(store.gets(), 1);
        assert!(cache
            .get(&entity_key(&chat::SCHEMA, Uuid::from_u128(1)))
            .await
            .unwrap()
            .is_some());

        let fetched = repo.get(Uuid::from_u128(1)).await.unwrap();
        assert_eq!(store.gets(), 1);
        assert_eq!(fetched.timestamps.tm_create, clock.now());
        assert!(fetched.timestamps.tm_update.is_sentinel());
        assert!(fetched.timestamps.tm_delete.is_sentinel());
        assert_eq!(fetched.participant_ids, sample_chat().participant_ids);
    }

    #[tokio::test]
    async fn test_create_keeps_explicit_tm_create() {
        let (repo, _, _) = repo::<Chat, _>(MemoryCache::new(100), clock()).await;
        let mut entity = sample_chat();
        entity.timestamps.tm_create = "2020-01-01 00:00:00.000000".parse().unwrap();

        repo.create(&entity).await.unwrap();
        let fetched = repo.get(entity.id).await.unwrap();
        assert_eq!(fetched.timestamps.tm_create, entity.timestamps.tm_create);
    }

    #[tokio::test]
    async fn test_get_falls_back_to_store_then_caches() {
        let (repo, store, cache) = repo::<Chat, _>(MemoryCache::new(100), clock()).await;
        repo.create(&sample_chat()).await.unwrap();
        cache.delete(&entity_key(&chat::SCHEMA, Uuid::from_u128(1))).await.unwrap();
        let before = store.gets();

        repo.get(Uuid::from_u128(1)).await.unwrap();
        assert_eq!(store.gets(), before + 1);

        repo.get(Uuid::from_u128(1)).await.unwrap();
        assert_eq!(store.gets(), before + 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (repo, _, _) = repo::<Chat, _>(MemoryCache::new(100), clock()).await;
        let err = repo.get(Uuid::from_u128(42)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_failing_cache_degrades_to_store() {
        let (repo, store, _) = repo::<Chat, _>(FailingCache, clock()).await;

        repo.create(&sample_chat()).await.unwrap();
        let fetched = repo.get(Uuid::from_u128(1)).await.unwrap();
        assert_eq!(fetched.id, Uuid::from_u128(1));
        assert_eq!(store.gets(), 2);
    }

    #[tokio::test]
    async fn test_slow_cache_is_bounded() {
        let (repo, store, _) = repo::<Chat, _>(SlowCache::default(), clock()).await;

        let started = std::time::Instant::now();
        repo.create(&sample_chat()).await.unwrap();
        repo.get(Uuid::from_u128(1)).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(store.gets(), 2);
    }

    #[tokio::test]
    async fn test_update_bumps_tm_update_and_refreshes() {
        let clock = clock();
        let (repo, _, _) = repo::<Chat, _>(MemoryCache::new(100), clock.clone()).await;
        repo.create(&sample_chat()).await.unwrap();

        clock.advance(Duration::from_secs(60));
        repo.update(Uuid::from_u128(1), vec![(chat::NAME, "renamed".into())])
            .await
            .unwrap();

        let fetched = repo.get(Uuid::from_u128(1)).await.unwrap();
        assert_eq!(fetched.name, "renamed");
        assert_eq!(fetched.timestamps.tm_update, clock.now());
    }

    #[tokio::test]
    async fn test_empty_update_is_noop() {
        let (repo, store, _) = repo::<Chat, _>(MemoryCache::new(100), clock()).await;
        repo.create(&sample_chat()).await.unwrap();
        let before = store.gets();

        repo.update(Uuid::from_u128(1), Vec::new()).await.unwrap();
        assert_eq!(store.gets(), before);
        assert!(repo
            .get(Uuid::from_u128(1))
            .await
            .unwrap()
            .timestamps
            .tm_update
            .is_sentinel());
    }

    #[tokio::test]
    async fn test_update_rejects_identity_columns() {
        let (repo, _, _) = repo::<Chat, _>(MemoryCache::new(100), clock()).await;
        repo.create(&sample_chat()).await.unwrap();

        let err = repo
            .update(Uuid::from_u128(1), vec![("customer_id", Uuid::nil().into())])
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_delete_keeps_tombstone_cached() {
        let clock = clock();
        let (repo, store, _) = repo::<Chat, _>(MemoryCache::new(100), clock.clone()).await;
        repo.create(&sample_chat()).await.unwrap();

        clock.advance(Duration::from_secs(1));
        repo.delete(Uuid::from_u128(1)).await.unwrap();
        let before = store.gets();

        let fetched = repo.get(Uuid::from_u128(1)).await.unwrap();
        assert_eq!(store.gets(), before);
        assert!(fetched.timestamps.is_deleted());
        assert_eq!(fetched.timestamps.tm_delete, clock.now());
        assert_eq!(fetched.timestamps.tm_update, clock.now());

        let page = repo.list(&ListQuery::new(10)).await.unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_write_on_missing_entity_is_not_found() {
        let (repo, _, _) = repo::<Chat, _>(MemoryCache::new(100), clock()).await;
        let err = repo.delete(Uuid::from_u128(9)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_pages() {
        let (repo, _, _) = repo::<Chat, _>(MemoryCache::new(100), clock()).await;
        for id in 1..=3 {
            repo.create(&sample_chat().with_id(Uuid::from_u128(id))).await.unwrap();
        }

        let first = repo.list(&ListQuery::new(2)).await.unwrap();
        assert_eq!(first.items.len(), 2);
        let token = first.next_page_token;
        assert!(token.is_some());

        let second = repo.list(&ListQuery::new(2).after(token)).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].id, Uuid::from_u128(1));
        assert!(second.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_secondary_lookup_and_staleness() {
        let (repo, store, cache) = repo::<Trunk, _>(MemoryCache::new(100), clock()).await;
        let entity = Trunk::new(Uuid::nil(), "acme").with_id(Uuid::from_u128(1));
        repo.create(&entity).await.unwrap();
        let key = secondary_key(&trunk::SCHEMA, trunk::DOMAIN_NAME, &FieldValue::from("acme"));
        assert!(cache.get(&key).await.unwrap().is_none());

        let before = store.gets();
        let found = repo.get_by(trunk::DOMAIN_NAME, "acme").await.unwrap();
        assert_eq!(found.id, entity.id);
        assert_eq!(store.gets(), before + 1);
        repo.get_by(trunk::DOMAIN_NAME, "acme").await.unwrap();
        assert_eq!(store.gets(), before + 1);

        repo.update(entity.id, vec![(trunk::DOMAIN_NAME, "other".into())])
            .await
            .unwrap();
        assert!(cache.get(&key).await.unwrap().is_none());

        // An entry left behind under the old value is not trusted.
        let current = repo.get(entity.id).await.unwrap();
        cache
            .set(&key, &serialize_entity(&current).unwrap(), None)
            .await
            .unwrap();
        let err = repo.get_by(trunk::DOMAIN_NAME, "acme").await.unwrap_err();
        assert!(err.is_not_found());
        let moved = repo.get_by(trunk::DOMAIN_NAME, "other").await.unwrap();
        assert_eq!(moved.id, entity.id);
    }

    #[tokio::test]
    async fn test_secondary_lookup_skips_tombstoned_cache_entry() {
        let clock = clock();
        let (repo, _, _) = repo::<Trunk, _>(MemoryCache::new(100), clock.clone()).await;
        let entity = Trunk::new(Uuid::nil(), "acme").with_id(Uuid::from_u128(1));
        repo.create(&entity).await.unwrap();

        clock.advance(Duration::from_secs(1));
        repo.delete(entity.id).await.unwrap();

        let err = repo.get_by(trunk::DOMAIN_NAME, "acme").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_by_rejects_non_lookup_column() {
        let (repo, _, _) = repo::<Trunk, _>(MemoryCache::new(100), clock()).await;
        let err = repo.get_by(trunk::USERNAME, "alice").await.unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidData(_)));
    }
}
