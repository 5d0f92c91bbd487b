//! In-memory storage backend.
//!
//! Useful for tests and for running without a database file.

mod store;

pub use store::InMemoryStore;
