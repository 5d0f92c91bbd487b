//! Redis cache backend, shared by every process pointing at the same database.

mod cache;
mod error;

pub use cache::RedisCache;
