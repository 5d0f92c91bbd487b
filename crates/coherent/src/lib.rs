//! Imperative shell of the coherent entity repository: store and cache
//! backends, the cached repository, configuration.

pub mod cache;
pub mod config;
pub mod storage;

pub use config::{CacheBackend, Config};
