//! In-memory TTL cache for completed lookups.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::AddressKey;

/// Default lifetime of a cached lookup (24 hours).
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheInner<V> {
    map: HashMap<AddressKey, CacheEntry<V>>,
    ttl: Duration,
}

impl<V: Clone> CacheInner<V> {
    fn new(ttl: Duration) -> Self {
        Self {
            map: HashMap::new(),
            ttl,
        }
    }

    /// Expired entries are removed on the read that finds them.
    fn get(&mut self, key: &AddressKey) -> Option<V> {
        let expired = match self.map.get(key) {
            None => return None,
            Some(entry) => Instant::now() > entry.expires_at,
        };

        if expired {
            self.map.remove(key);
            return None;
        }

        self.map.get(key).map(|entry| entry.value.clone())
    }

    fn set(&mut self, key: AddressKey, value: V) {
        let expires_at = Instant::now() + self.ttl;
        self.map.insert(key, CacheEntry { value, expires_at });
    }
}

/// Thread-safe lookup cache shared by every in-flight request.
///
/// There is no capacity bound and no background sweep; entries leave the map
/// only when a read finds them expired or on [`clear`](CacheStore::clear).
#[derive(Debug, Clone)]
pub struct CacheStore<V> {
    inner: Arc<tokio::sync::RwLock<CacheInner<V>>>,
}

impl<V: Clone + Send + Sync> CacheStore<V> {
    /// Create a new cache store with the given entry lifetime.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner::new(ttl))),
        }
    }

    /// Create a cache store with the default 24 hour lifetime.
    pub fn with_default_ttl() -> Self {
        Self::new(DEFAULT_TTL)
    }

    /// Create a disabled cache: writes are dropped and reads always miss.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Get the value stored under `key` if it has not expired.
    ///
    /// Takes the write lock so that the expiry check and the eviction happen in
    /// one critical section.
    pub async fn get(&self, key: &AddressKey) -> Option<V> {
        let mut store = self.inner.write().await;
        store.get(key)
    }

    /// Store `value` under `key`, replacing any previous entry and restarting
    /// its lifetime. No-op when the cache is disabled.
    pub async fn set(&self, key: AddressKey, value: V) {
        let mut store = self.inner.write().await;

        if store.ttl == Duration::ZERO {
            return;
        }

        store.set(key, value);
    }

    /// Clear all entries from the cache.
    pub async fn clear(&self) {
        let mut store = self.inner.write().await;
        store.map.clear();
    }

    /// Number of entries held, including expired entries not read since.
    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn ttl(&self) -> Duration {
        let store = self.inner.read().await;
        store.ttl
    }

    /// Check if the cache is disabled (TTL is ZERO).
    pub async fn is_disabled(&self) -> bool {
        self.ttl().await == Duration::ZERO
    }
}
