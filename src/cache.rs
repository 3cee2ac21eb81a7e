//! Size-bounded, time-expiring key/value cache.
//!
//! One instance sits in front of the live-data client and another in front
//! of the aggregation endpoints. Instances are built explicitly and handed
//! to their owner; nothing here is global.
//!
//! Expiry is lazy: an entry older than the TTL is dropped the next time it
//! is read. When the capacity is reached the least-recently-used entry is
//! evicted.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

pub struct TtlCache<V> {
    name: &'static str,
    ttl: Duration,
    entries: Mutex<LruCache<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    /// A capacity of zero is treated as one.
    pub fn new(name: &'static str, capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            name,
            ttl,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Fetch a live entry, refreshing its recency.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().await;

        let expired = match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                debug!(cache = self.name, key, "Cache hit");
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            debug!(cache = self.name, key, "Dropping expired cache entry");
            entries.pop(key);
        } else {
            debug!(cache = self.name, key, "Cache miss");
        }
        None
    }

    /// Insert or overwrite an entry, restarting its TTL.
    pub async fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let mut entries = self.entries.lock().await;
        if let Some((evicted, _)) = entries.push(
            key.clone(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        ) {
            if evicted != key {
                debug!(cache = self.name, evicted = %evicted, "Evicted least-recently-used entry");
            }
        }
    }

    /// Number of stored entries, including any not yet observed as expired.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn capacity(&self) -> usize {
        self.entries.lock().await.cap().get()
    }
}

/// Deterministic cache key: operation name followed by every parameter.
///
/// Each parameter is length-prefixed, so a separator inside a value can
/// never make two different parameter lists produce the same key.
pub fn cache_key(operation: &str, params: &[&str]) -> String {
    let mut key = String::from(operation);
    for p in params {
        key.push_str(&format!(":{}={p}", p.len()));
    }
    key
}
