//! Time-to-live memoization for read-mostly provider lookups
//!
//! A thin layer over `moka::future::Cache`. Values are recomputed once their
//! TTL has elapsed. Only successful results are stored; a failed computation
//! is handed to every caller waiting on the same key and then forgotten.

use moka::future::Cache;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

/// Default lifetime of a cached lookup (15 minutes)
pub const TTL_CACHE_TIME: Duration = Duration::from_secs(900);

/// Default max number of entries per cache
pub const DEFAULT_CACHE_MAX_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Time-to-live for cache entries
    pub ttl: Duration,

    /// Maximum number of entries in each cache
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: TTL_CACHE_TIME,
            max_capacity: DEFAULT_CACHE_MAX_CAPACITY,
        }
    }
}

impl CacheConfig {
    /// Create config with custom TTL (useful for testing)
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            max_capacity: DEFAULT_CACHE_MAX_CAPACITY,
        }
    }
}

/// Memoizes the results of one lookup operation, keyed by its arguments
pub struct TtlCache<K, V> {
    name: &'static str,
    inner: Cache<K, V>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + std::fmt::Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, config: &CacheConfig) -> Self {
        let inner = Cache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { name, inner }
    }

    /// Return the cached value for `key`, running `init` on a miss
    ///
    /// Errors from `init` are returned to the caller and not stored.
    pub async fn get_or_try_insert_with<F, E>(&self, key: K, init: F) -> Result<V, E>
    where
        F: Future<Output = Result<V, E>>,
        E: Clone + Send + Sync + 'static,
    {
        if let Some(value) = self.inner.get(&key).await {
            tracing::debug!(cache = self.name, key = ?key, "cache hit");
            return Ok(value);
        }

        tracing::debug!(cache = self.name, key = ?key, "cache miss");
        self.inner
            .try_get_with(key, init)
            .await
            .map_err(|e| E::clone(&e))
    }

    /// Store a freshly computed value, replacing any cached one
    pub async fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value).await;
    }

    /// Drop a single entry so the next lookup recomputes it
    pub async fn invalidate(&self, key: &K) {
        self.inner.invalidate(key).await;
    }

    /// Drop every entry
    pub fn invalidate_all(&self) {
        tracing::debug!(cache = self.name, "cache cleared");
        self.inner.invalidate_all();
    }
}
