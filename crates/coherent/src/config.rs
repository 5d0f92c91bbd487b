use std::{env, time::Duration};

use crate::storage::RepositoryOptions;

/// Which cache backend to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheBackend {
    #[default]
    Memory,
    /// Only usable when built with the `redis` feature.
    Redis,
}

impl CacheBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "redis" => Some(Self::Redis),
            _ => None,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache TTL in seconds (default: 300)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cache entries (default: 10,000)
    pub cache_max_entries: usize,
    /// Budget of a single cache call in milliseconds (default: 100)
    pub cache_timeout_ms: u64,
    /// Cache backend (default: memory)
    pub cache_backend: CacheBackend,
    /// Path to SQLite database file (default: "coherent.db")
    pub sqlite_path: String,
    /// Redis connection URL (default: "redis://localhost:6379")
    pub redis_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_TTL_SECONDS` - Cache TTL in seconds (default: 300)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `CACHE_TIMEOUT_MS` - Budget of one cache call (default: 100)
    /// - `CACHE_BACKEND` - `memory` or `redis` (default: memory)
    /// - `SQLITE_PATH` - SQLite database path (default: "coherent.db")
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    ///
    /// Unparsable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            cache_ttl_seconds: lookup("CACHE_TTL_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            cache_max_entries: lookup("CACHE_MAX_ENTRIES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            cache_timeout_ms: lookup("CACHE_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            cache_backend: lookup("CACHE_BACKEND")
                .and_then(|v| CacheBackend::parse(&v))
                .unwrap_or_default(),
            sqlite_path: lookup("SQLITE_PATH").unwrap_or_else(|| "coherent.db".to_string()),
            redis_url: lookup("REDIS_URL")
                .unwrap_or_else(|| "redis://localhost:6379".to_string()),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn repository_options(&self) -> RepositoryOptions {
        RepositoryOptions {
            cache_ttl: self.cache_ttl(),
            cache_timeout: Duration::from_millis(self.cache_timeout_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = config_from(&[]);

        assert_eq!(config.cache_ttl_seconds, 300);
        assert_eq!(config.cache_max_entries, 10_000);
        assert_eq!(config.cache_timeout_ms, 100);
        assert_eq!(config.cache_backend, CacheBackend::Memory);
        assert_eq!(config.sqlite_path, "coherent.db");
        assert_eq!(config.redis_url, "redis://localhost:6379");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("CACHE_TTL_SECONDS", "600"),
            ("CACHE_TIMEOUT_MS", "25"),
            ("CACHE_BACKEND", "Redis"),
            ("SQLITE_PATH", "/tmp/x.db"),
        ]);

        assert_eq!(config.cache_backend, CacheBackend::Redis);
        assert_eq!(config.sqlite_path, "/tmp/x.db");
        assert_eq!(
            config.repository_options(),
            RepositoryOptions {
                cache_ttl: Duration::from_secs(600),
                cache_timeout: Duration::from_millis(25),
            }
        );
    }

    #[test]
    fn test_garbage_falls_back() {
        let config = config_from(&[("CACHE_MAX_ENTRIES", "lots"), ("CACHE_BACKEND", "memcached")]);

        assert_eq!(config.cache_max_entries, 10_000);
        assert_eq!(config.cache_backend, CacheBackend::Memory);
    }
}
