//! Time-bounded read-through cache for derived report data.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::app_system::SharedClock;

/// Read-through cache with absolute per-entry expiry.
///
/// Expiry is measured on the injected clock. `invalidate` removes an entry
/// whether or not it is still live.
#[derive(Clone)]
pub struct ReportCache<K, V> {
    inner: Arc<RwLock<CacheInner<K, V>>>,
    clock: SharedClock,
}

struct CacheInner<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    /// Bumped by every invalidation. A compute that straddles one is not stored.
    generation: u64,
}

struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

impl<K: Eq + Hash, V> CacheInner<K, V> {
    /// Inserts `value` and drops every entry already expired at `now`.
    fn store(&mut self, key: K, value: V, now: DateTime<Utc>, expires_at: DateTime<Utc>) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!(evicted, "Expired cache entries evicted");
        }
        self.entries.insert(key, CacheEntry { value, expires_at });
    }
}

impl<K, V> ReportCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    pub fn new(clock: SharedClock) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CacheInner {
                entries: HashMap::new(),
                generation: 0,
            })),
            clock,
        }
    }

    fn expiry(&self, ttl: Duration) -> DateTime<Utc> {
        let now = self.clock.now();
        chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Live value for `key`, if any.
    pub async fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let inner = self.inner.read().await;
        inner
            .entries
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    #[cfg(test)]
    pub async fn set(&self, key: K, value: V, ttl: Duration) {
        let now = self.clock.now();
        let expires_at = self.expiry(ttl);
        let mut inner = self.inner.write().await;
        inner.store(key, value, now, expires_at);
    }

    /// Drops the entry for `key`. Returns whether one was present.
    pub async fn invalidate(&self, key: &K) -> bool {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        let removed = inner.entries.remove(key).is_some();
        debug!(?key, removed, "Cache entry invalidated");
        removed
    }

    /// Returns the live value for `key`, or runs `compute`, caches its result for `ttl` and returns it.
    ///
    /// No lock is held while `compute` runs. Errors are returned as-is and nothing is cached.
    pub async fn get_or_compute<F, Fut, E>(&self, key: K, ttl: Duration, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            debug!(?key, "Cache hit");
            return Ok(value);
        }

        let generation = self.inner.read().await.generation;
        debug!(?key, "Cache miss, computing");
        let value = compute().await?;

        let now = self.clock.now();
        let expires_at = self.expiry(ttl);
        let mut inner = self.inner.write().await;
        if inner.generation == generation {
            inner.store(key, value.clone(), now, expires_at);
        } else {
            debug!(?key, "Invalidated while computing, result not cached");
        }
        Ok(value)
    }

    /// Number of stored entries, expired ones included.
    #[cfg(test)]
    pub async fn entry_count(&self) -> usize {
        self.inner.read().await.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_system::ManualClock;
    use chrono::TimeZone;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(300);

    fn setup() -> (Arc<ManualClock>, ReportCache<&'static str, u32>) {
        let clock = ManualClock::at(Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap());
        let cache = ReportCache::new(clock.clone());
        (clock, cache)
    }

    async fn counted(cache: &ReportCache<&'static str, u32>, calls: &AtomicUsize, value: u32) -> u32 {
        cache
            .get_or_compute("daily", TTL, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Infallible>(value)
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_live_entry_skips_compute() {
        let (_clock, cache) = setup();
        let calls = AtomicUsize::new(0);

        assert_eq!(counted(&cache, &calls, 1).await, 1);
        assert_eq!(counted(&cache, &calls, 2).await, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_never_returned() {
        let (clock, cache) = setup();
        let calls = AtomicUsize::new(0);

        counted(&cache, &calls, 1).await;
        clock.advance(chrono::Duration::seconds(299));
        assert_eq!(cache.get(&"daily").await, Some(1));

        clock.advance(chrono::Duration::seconds(1));
        assert_eq!(cache.get(&"daily").await, None);
        assert_eq!(counted(&cache, &calls, 2).await, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_recompute() {
        let (_clock, cache) = setup();
        let calls = AtomicUsize::new(0);

        counted(&cache, &calls, 1).await;
        assert!(cache.invalidate(&"daily").await);
        assert!(!cache.invalidate(&"daily").await);

        assert_eq!(counted(&cache, &calls, 2).await, 2);
    }

    #[tokio::test]
    async fn test_invalidate_removes_expired_entries_too() {
        let (clock, cache) = setup();
        cache.set("daily", 1, TTL).await;
        clock.advance(chrono::Duration::minutes(10));

        assert!(cache.invalidate(&"daily").await);
        assert_eq!(cache.entry_count().await, 0);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let (_clock, cache) = setup();

        let err = cache
            .get_or_compute("daily", TTL, || async { Err::<u32, _>("store down") })
            .await
            .unwrap_err();
        assert_eq!(err, "store down");
        assert_eq!(cache.entry_count().await, 0);
    }

    #[tokio::test]
    async fn test_compute_straddling_invalidation_is_not_stored() {
        let (_clock, cache) = setup();
        let inner = cache.clone();

        let value = cache
            .get_or_compute("daily", TTL, || async move {
                // A commit lands while the aggregate is being computed.
                inner.invalidate(&"daily").await;
                Ok::<_, Infallible>(7)
            })
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(cache.get(&"daily").await, None);
    }

    #[tokio::test]
    async fn test_store_evicts_expired_entries() {
        let (clock, cache) = setup();
        cache.set("old", 1, Duration::from_secs(60)).await;
        cache.set("new", 2, TTL).await;
        clock.advance(chrono::Duration::minutes(2));

        cache.set("newer", 3, TTL).await;
        assert_eq!(cache.entry_count().await, 2);
        assert_eq!(cache.get(&"new").await, Some(2));
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_accumulate_past_expiry() {
        let clock = ManualClock::at(Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap());
        let cache: ReportCache<u32, u32> = ReportCache::new(clock.clone());

        for key in 0..500 {
            cache
                .get_or_compute(key, TTL, || async move { Ok::<_, Infallible>(key) })
                .await
                .unwrap();
        }
        assert_eq!(cache.entry_count().await, 500);

        clock.advance(chrono::Duration::days(1));
        let value = cache
            .get_or_compute(500, TTL, || async { Ok::<_, Infallible>(500) })
            .await
            .unwrap();

        assert_eq!(value, 500);
        assert_eq!(cache.entry_count().await, 1);
    }
}
