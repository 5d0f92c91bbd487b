//! Cached repository.
//!
//! [`CachedRepository`] is generic over the entity kind; the per-kind modules
//! add the named operations (`add_participant`, `set_status`, ...) on top of
//! the generic `update`/`mutate` primitives.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! let store = Arc::new(SqliteStore::new("coherent.db").await?);
//! let cache = Arc::new(MemoryCache::new(10_000));
//! let chats: ChatRepository<_, _> =
//!     CachedRepository::new(store, cache, Arc::new(SystemClock), RepositoryOptions::default());
//!
//! chats.add_participant(chat_id, user_id).await?;
//! ```

mod chat;
mod confbridge;
mod conference;
mod recording;
mod repository;
mod trunk;

pub use chat::ChatRepository;
pub use confbridge::ConfbridgeRepository;
pub use conference::ConferenceRepository;
pub use recording::RecordingRepository;
pub use repository::{CachedRepository, RepositoryOptions};
pub use trunk::TrunkRepository;
