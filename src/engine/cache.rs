use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::observability::metrics::Metrics;
use crate::store::CacheStore;

#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
    metrics: Metrics,
}

impl ResultCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration, metrics: Metrics) -> Self {
        Self {
            store,
            ttl,
            metrics,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns the unexpired value cached under `key`, or runs `compute` and
    /// caches its result for `ttl`. Errors from `compute` are not cached.
    pub fn get_or_compute<T, F>(&self, key: &str, ttl: Duration, compute: F) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, AppError>,
    {
        let cache = cache_name(key);

        match self.store.get(key) {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    self.record_lookup(cache, "hit");
                    debug!(key, "cache hit");
                    return Ok(value);
                }
                Err(err) => warn!(key, error = %err, "discarding undecodable cache entry"),
            },
            Ok(None) => {}
            Err(err) => warn!(key, error = %err, "cache read failed"),
        }

        self.record_lookup(cache, "miss");
        let value = compute()?;

        match serde_json::to_string(&value) {
            Ok(raw) => {
                if let Err(err) = self.store.set(key, raw, ttl) {
                    self.metrics
                        .cache_write_failures_total
                        .with_label_values(&[cache])
                        .inc();
                    warn!(key, error = %err, "cache write failed");
                }
            }
            Err(err) => warn!(key, error = %err, "failed to serialize value for cache"),
        }

        Ok(value)
    }

    fn record_lookup(&self, cache: &str, outcome: &str) {
        self.metrics
            .cache_lookups_total
            .with_label_values(&[cache, outcome])
            .inc();
    }
}

fn cache_name(key: &str) -> &str {
    key.split_once(':').map_or("default", |(prefix, _)| prefix)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::Arc;
    use std::thread::sleep;
    use std::time::Duration;

    use super::ResultCache;
    use crate::error::AppError;
    use crate::observability::metrics::Metrics;
    use crate::store::{CacheError, CacheStore, InMemoryCacheStore};

    const TTL: Duration = Duration::from_secs(60);

    fn cache() -> ResultCache {
        ResultCache::new(Arc::new(InMemoryCacheStore::new(16)), TTL, Metrics::new())
    }

    #[test]
    fn second_call_within_ttl_does_not_recompute() {
        let cache = cache();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok::<_, AppError>(42_u32)
        };

        assert_eq!(cache.get_or_compute("answer:x", TTL, compute).unwrap(), 42);
        assert_eq!(cache.get_or_compute("answer:x", TTL, compute).unwrap(), 42);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn expired_entry_is_recomputed() {
        let cache = cache();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok::<_, AppError>(calls.get())
        };

        let ttl = Duration::from_millis(5);
        assert_eq!(cache.get_or_compute("n:1", ttl, compute).unwrap(), 1);
        sleep(Duration::from_millis(20));
        assert_eq!(cache.get_or_compute("n:1", ttl, compute).unwrap(), 2);
    }

    #[test]
    fn compute_failure_is_not_cached() {
        let cache = cache();

        let err = cache
            .get_or_compute::<u32, _>("flaky:1", TTL, || {
                Err(AppError::CollaboratorUnavailable("down".to_string()))
            })
            .unwrap_err();
        assert!(matches!(err, AppError::CollaboratorUnavailable(_)));
        assert_eq!(cache.len(), 0);

        let value = cache.get_or_compute("flaky:1", TTL, || Ok(7_u32)).unwrap();
        assert_eq!(value, 7);
    }

    struct BrokenStore;

    impl CacheStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Unavailable("timeout".to_string()))
        }

        fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("timeout".to_string()))
        }

        fn len(&self) -> usize {
            0
        }
    }

    #[test]
    fn unavailable_store_never_fails_the_caller() {
        let metrics = Metrics::new();
        let cache = ResultCache::new(Arc::new(BrokenStore), TTL, metrics.clone());

        let value = cache.get_or_compute("geocode:a", TTL, || Ok("ok".to_string()));
        assert_eq!(value.unwrap(), "ok");
        assert_eq!(
            metrics
                .cache_write_failures_total
                .with_label_values(&["geocode"])
                .get(),
            1
        );
    }

    #[test]
    fn undecodable_entry_is_treated_as_miss() {
        let store = Arc::new(InMemoryCacheStore::new(4));
        store.set("n:1", "not json".to_string(), TTL).unwrap();
        let cache = ResultCache::new(store, TTL, Metrics::new());

        let value = cache.get_or_compute("n:1", TTL, || Ok(5_u32)).unwrap();
        assert_eq!(value, 5);
        assert_eq!(cache.get_or_compute("n:1", TTL, || Ok(6_u32)).unwrap(), 5);
    }
}
