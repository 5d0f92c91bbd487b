//! SQLite storage backend.
//!
//! Uses `rusqlite` for the synchronous work and `tokio-rusqlite` to run it off
//! the async executor. Collection mutations are JSON1 expressions evaluated by
//! SQLite itself.

mod conversions;
mod error;
mod schema;
mod store;

pub use store::SqliteStore;
