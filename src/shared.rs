//! Shared Cache Handle
//!
//! The cache itself is single-owner. This module is the boundary where it is
//! placed behind a lock so several tasks can use one instance.

use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::cache::{CacheStats, Clock, ExpiringCache, SystemClock};
use crate::config::Config;
use crate::error::Result;

/// Entry copied out of the cache by [`SharedCache::snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry<K, V> {
    pub key: K,
    pub value: V,
    pub expire_at: Instant,
}

// == Shared Cache ==
/// Cloneable handle to an [`ExpiringCache`] guarded by an async mutex.
///
/// Every call holds the lock for its whole duration, so calls are serialized.
/// A mutex rather than a read-write lock: even `get` sweeps and updates
/// counters.
#[derive(Debug)]
pub struct SharedCache<K, V, C = SystemClock> {
    inner: Arc<Mutex<ExpiringCache<K, V, C>>>,
}

impl<K, V, C> Clone for SharedCache<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> SharedCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    /// Creates a shared cache from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(ExpiringCache::new(config.capacity)?))
    }
}

impl<K, V, C> SharedCache<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    /// Wraps an existing cache.
    pub fn new(cache: ExpiringCache<K, V, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    pub async fn put(&self, key: K, value: V, ttl: Duration) {
        self.inner.lock().await.put(key, value, ttl);
    }

    /// Returns a clone of the value for `key`.
    pub async fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().await.get(key).cloned()
    }

    pub async fn delete(&self, key: &K) -> Option<V> {
        self.inner.lock().await.delete(key)
    }

    /// Entry count, with the same staleness as [`ExpiringCache::len`].
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    pub async fn sweep(&self) -> usize {
        self.inner.lock().await.sweep()
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.lock().await.stats()
    }

    /// Copies every entry out in cursor order.
    ///
    /// Nothing is swept first, so expired entries not yet removed appear too.
    pub async fn snapshot(&self) -> Vec<SnapshotEntry<K, V>>
    where
        V: Clone,
    {
        let cache = self.inner.lock().await;
        let mut out = Vec::with_capacity(cache.len());
        let mut cursor = cache.cursor();
        while let (Some(key), Some(value), Some(expire_at)) =
            (cursor.key(), cursor.value(), cursor.expire_at())
        {
            out.push(SnapshotEntry {
                key: key.clone(),
                value: value.clone(),
                expire_at,
            });
            cursor.move_next();
        }
        out
    }

    /// Runs `f` with exclusive access to the underlying cache.
    pub async fn with<R>(&self, f: impl FnOnce(&mut ExpiringCache<K, V, C>) -> R) -> R {
        let mut cache = self.inner.lock().await;
        f(&mut cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    fn shared(capacity: usize) -> (SharedCache<String, String, ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let cache = ExpiringCache::with_clock(capacity, clock.clone()).unwrap();
        (SharedCache::new(cache), clock)
    }

    #[tokio::test]
    async fn test_shared_put_get_delete() {
        let (cache, _clock) = shared(10);
        cache
            .put("k".to_string(), "v".to_string(), Duration::from_secs(1))
            .await;

        assert_eq!(cache.get(&"k".to_string()).await, Some("v".to_string()));
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.delete(&"k".to_string()).await, Some("v".to_string()));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_shared_from_config_rejects_bad_capacity() {
        let config = Config {
            capacity: -1,
            ..Config::default()
        };
        assert!(SharedCache::<String, String>::from_config(&config).is_err());

        let ok = SharedCache::<String, String>::from_config(&Config::default()).unwrap();
        assert!(ok.is_empty().await);
    }

    #[tokio::test]
    async fn test_shared_clones_see_same_cache() {
        let (cache, clock) = shared(10);
        let other = cache.clone();
        other
            .put("a".to_string(), "1".to_string(), Duration::from_millis(5))
            .await;

        assert_eq!(cache.len().await, 1);
        clock.advance(Duration::from_millis(5));
        assert_eq!(cache.sweep().await, 1);
        assert_eq!(other.stats().await.expirations, 1);
    }

    #[tokio::test]
    async fn test_shared_snapshot_starts_with_soonest() {
        let (cache, clock) = shared(10);
        for (key, ttl) in [("a", 30), ("b", 10), ("c", 20)] {
            cache
                .put(key.to_string(), key.to_uppercase(), Duration::from_millis(ttl))
                .await;
        }

        let snapshot = cache.snapshot().await;
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].key, "b");
        assert_eq!(snapshot[0].value, "B");
        assert_eq!(snapshot[0].expire_at, clock.now() + Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_shared_with_exclusive_access() {
        let (cache, _clock) = shared(10);
        let soonest = cache
            .with(|inner| {
                inner.put("x".to_string(), "1".to_string(), Duration::from_secs(9));
                inner.put("y".to_string(), "2".to_string(), Duration::from_secs(1));
                inner.peek_soonest().map(|(k, _, _)| k.clone())
            })
            .await;

        assert_eq!(soonest.as_deref(), Some("y"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_shared_concurrent_tasks_respect_capacity() {
        let cache: SharedCache<u32, u32> = SharedCache::new(ExpiringCache::new(32).unwrap());
        let mut handles = Vec::new();

        for task in 0..8u32 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..100u32 {
                    let key = task * 1000 + i;
                    cache
                        .put(key, i, Duration::from_millis(u64::from(i) + 1000))
                        .await;
                    if let Some(value) = cache.get(&key).await {
                        assert_eq!(value, i);
                    }
                    if i % 7 == 0 {
                        cache.delete(&key).await;
                    }
                }
            }));
        }

        for handle in handles {
            handle.await.expect("Task should not panic");
        }

        assert!(cache.len().await <= 32);
        cache
            .with(|inner| assert!(inner.is_consistent()))
            .await;
    }
}
