//! Cache backend implementations.
//!
//! Concrete implementations of `coherent_core::cache::Cache`. The in-memory
//! backend is always compiled; Redis sits behind the `redis` feature. The
//! backend is picked at startup from `CACHE_BACKEND`.

pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_impl;

pub use memory::MemoryCache;

#[cfg(feature = "redis")]
pub use redis_impl::RedisCache;
