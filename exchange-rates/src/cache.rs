//! Exchange rate caching with TTL support and coalesced population.
//!
//! Reads of live entries go straight to a `DashMap`. On a miss, callers for
//! the same key queue on a per-key async mutex so that only one of them runs
//! the (expensive) computation; the others pick up its result.

use chrono::{DateTime, TimeDelta, Utc};
use converter_types::{CacheComputationError, CurrencyCode, ProviderError};
use dashmap::DashMap;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Default TTL applied to every key.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Builds the cache key for a currency pair: `rate:{FROM}:{TO}`.
pub fn cache_key(from: CurrencyCode, to: CurrencyCode) -> String {
    format!("rate:{}:{}", from, to)
}

/// Source of "now" for expiry decisions.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Used to test expiry deterministically.
#[derive(Debug)]
pub struct ManualClock {
    now: StdMutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: StdMutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let delta = TimeDelta::from_std(by).unwrap_or(TimeDelta::MAX);
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = now.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Thread-safe TTL cache keyed by string.
pub struct RateCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    /// One async mutex per key that currently has a computation queued.
    in_flight: DashMap<String, Arc<Mutex<()>>>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl<V: Clone + Send + Sync + 'static> RateCache<V> {
    /// Creates a cache backed by the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            in_flight: DashMap::new(),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
        }
    }

    /// Returns the value for `key` if it has not expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                return Some(entry.value.clone());
            }
        }
        None
    }

    /// Returns the live value for `key`, or runs `compute` and stores its result.
    ///
    /// At most one `compute` runs per key at a time. Callers arriving while a
    /// computation is in flight wait for it and reuse the stored value. A failed
    /// computation stores nothing; the next caller in line computes again.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: &str,
        compute: F,
    ) -> Result<V, CacheComputationError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ProviderError>>,
    {
        if let Some(value) = self.get(key) {
            debug!(key, "Cache hit");
            return Ok(value);
        }

        let slot = InFlightSlot {
            registry: &self.in_flight,
            key,
            lock: self
                .in_flight
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone(),
        };

        // Declared after `slot`, so the lock is released before the slot is.
        let _guard = slot.lock.lock().await;

        if let Some(value) = self.get(key) {
            debug!(key, "Cache populated while waiting");
            return Ok(value);
        }

        debug!(key, "Cache miss");
        match compute().await {
            Ok(value) => {
                self.insert(key, value.clone());
                Ok(value)
            }
            Err(source) => Err(CacheComputationError {
                key: key.to_string(),
                source,
            }),
        }
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub fn insert(&self, key: &str, value: V) {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.entries.insert(key.to_string(), CacheEntry { value, expires_at });
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        self.entries.retain(|_, entry| entry.is_live(now));
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl.to_std().unwrap_or(Duration::MAX)
    }
}

/// A caller's claim on a key's in-flight lock.
///
/// Dropping it removes the registry entry unless another caller still holds
/// the same lock. Runs on every exit path, cancellation included.
struct InFlightSlot<'a> {
    registry: &'a DashMap<String, Arc<Mutex<()>>>,
    key: &'a str,
    lock: Arc<Mutex<()>>,
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        // The registry's copy plus ours.
        self.registry.remove_if(self.key, |_, slot| {
            Arc::ptr_eq(slot, &self.lock) && Arc::strong_count(slot) == 2
        });
    }
}

/// Shared rate cache.
pub type SharedRateCache<V> = Arc<RateCache<V>>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Barrier;

    fn manual_cache(ttl_secs: u64) -> (RateCache<f64>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let cache = RateCache::with_clock(Duration::from_secs(ttl_secs), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_cache_key_format() {
        let usd: CurrencyCode = "usd".parse().unwrap();
        let eur: CurrencyCode = "EUR".parse().unwrap();
        assert_eq!(cache_key(usd, eur), "rate:USD:EUR");
        assert_eq!(
            cache_key(usd, eur),
            cache_key("USD".parse().unwrap(), "eur".parse().unwrap())
        );
    }

    #[tokio::test]
    async fn test_hit_skips_compute() {
        let (cache, _clock) = manual_cache(60);
        let calls = AtomicUsize::new(0);
        let calls = &calls;

        for _ in 0..3 {
            let value = cache
                .get_or_compute("rate:USD:EUR", move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(0.85)
                })
                .await
                .unwrap();
            assert_eq!(value, 0.85);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_recomputed_once() {
        let (cache, clock) = manual_cache(60);
        let calls = AtomicUsize::new(0);
        let calls = &calls;
        let compute = move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Ok(if n == 0 { 0.85 } else { 0.9 })
        };

        assert_eq!(cache.get_or_compute("k", compute).await.unwrap(), 0.85);

        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get_or_compute("k", compute).await.unwrap(), 0.85);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(1));
        assert!(cache.get("k").is_none());
        assert_eq!(cache.get_or_compute("k", compute).await.unwrap(), 0.9);
        assert_eq!(cache.get_or_compute("k", compute).await.unwrap(), 0.9);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_compute_is_not_cached() {
        let (cache, _clock) = manual_cache(60);

        let err = cache
            .get_or_compute("rate:USD:EUR", || async { Err(ProviderError::RateNotFound) })
            .await
            .unwrap_err();
        assert_eq!(err.key, "rate:USD:EUR");
        assert_eq!(err.source, ProviderError::RateNotFound);
        assert!(cache.is_empty());

        let value = cache
            .get_or_compute("rate:USD:EUR", || async { Ok(1.25) })
            .await
            .unwrap();
        assert_eq!(value, 1.25);
    }

    #[tokio::test]
    async fn test_concurrent_misses_are_coalesced() {
        let cache = Arc::new(RateCache::<f64>::new(Duration::from_secs(60)));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_compute("rate:USD:EUR", move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(0.85)
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 0.85);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.in_flight.is_empty());
    }

    #[tokio::test]
    async fn test_different_keys_compute_independently() {
        let cache = Arc::new(RateCache::<f64>::new(Duration::from_secs(60)));
        // Both computations must be in flight at the same time to pass the barrier.
        let barrier = Arc::new(Barrier::new(2));

        let spawn = |key: &'static str, rate: f64| {
            let cache = cache.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                cache
                    .get_or_compute(key, move || async move {
                        barrier.wait().await;
                        Ok(rate)
                    })
                    .await
            })
        };

        let a = spawn("rate:USD:EUR", 0.85);
        let b = spawn("rate:USD:GBP", 0.79);

        let (a, b) = tokio::time::timeout(Duration::from_secs(2), async {
            (a.await.unwrap(), b.await.unwrap())
        })
        .await
        .expect("keys were serialized against each other");

        assert_eq!(a.unwrap(), 0.85);
        assert_eq!(b.unwrap(), 0.79);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_callers_release_their_slot() {
        let cache = Arc::new(RateCache::<f64>::new(Duration::from_secs(60)));

        let spawn = || {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_compute("rate:USD:EUR", || async {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                        Ok(0.85)
                    })
                    .await
            })
        };

        // One caller inside compute, one queued on the lock.
        let running = spawn();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let queued = spawn();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cache.in_flight.len(), 1);

        queued.abort();
        assert!(queued.await.unwrap_err().is_cancelled());
        assert_eq!(cache.in_flight.len(), 1);

        running.abort();
        assert!(running.await.unwrap_err().is_cancelled());
        assert!(cache.in_flight.is_empty());

        // The key is usable again.
        let value = cache
            .get_or_compute("rate:USD:EUR", || async { Ok(0.9) })
            .await
            .unwrap();
        assert_eq!(value, 0.9);
        assert!(cache.in_flight.is_empty());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (cache, clock) = manual_cache(10);
        cache.insert("a", 1.0);
        clock.advance(Duration::from_secs(5));
        cache.insert("b", 2.0);
        clock.advance(Duration::from_secs(6));

        cache.purge_expired();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b"), Some(2.0));
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let cache = RateCache::<f64>::new(Duration::MAX);
        cache.insert("k", 1.0);
        assert_eq!(cache.get("k"), Some(1.0));
    }
}
