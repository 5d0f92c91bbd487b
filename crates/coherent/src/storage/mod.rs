//! Store backends and the cached repository built on top of them.
//!
//! - `sqlite`: the persistent store (`rusqlite` + `tokio-rusqlite`)
//! - `inmemory`: same contract and semantics, nothing persisted
//! - `cached`: the look-aside cache orchestration shared by every entity kind

pub mod cached;
pub mod inmemory;
pub mod sqlite;

pub use cached::{
    CachedRepository, ChatRepository, ConfbridgeRepository, ConferenceRepository,
    RecordingRepository, RepositoryOptions, TrunkRepository,
};
pub use inmemory::InMemoryStore;
pub use sqlite::SqliteStore;
