use std::time::{Duration, Instant};

use dashmap::DashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("cache is full ({0} entries)")]
    CapacityExceeded(usize),
}

pub trait CacheStore: Send + Sync {
    /// Returns `None` for a missing or expired key.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    fn len(&self) -> usize;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

pub struct InMemoryCacheStore {
    entries: DashMap<String, CacheEntry>,
    max_entries: usize,
}

impl InMemoryCacheStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
        }
    }

    fn purge_expired(&self, now: Instant) {
        self.entries.retain(|_, entry| !entry.is_expired(now));
    }
}

impl CacheStore for InMemoryCacheStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let value = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => None,
            None => return Ok(None),
        };

        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        Ok(value)
    }

    fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();

        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            self.purge_expired(now);
            if self.entries.len() >= self.max_entries {
                return Err(CacheError::CapacityExceeded(self.max_entries));
            }
        }

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use std::thread::sleep;
    use std::time::Duration;

    use super::{CacheError, CacheStore, InMemoryCacheStore};

    #[test]
    fn value_is_returned_before_expiry() {
        let cache = InMemoryCacheStore::new(10);
        cache.set("k", "v".to_string(), Duration::from_secs(60)).unwrap();
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn expired_value_is_evicted_on_read() {
        let cache = InMemoryCacheStore::new(10);
        cache.set("k", "v".to_string(), Duration::from_millis(5)).unwrap();
        sleep(Duration::from_millis(20));

        assert!(cache.get("k").unwrap().is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn full_cache_rejects_new_keys() {
        let cache = InMemoryCacheStore::new(1);
        cache.set("a", "1".to_string(), Duration::from_secs(60)).unwrap();

        let err = cache
            .set("b", "2".to_string(), Duration::from_secs(60))
            .unwrap_err();
        assert!(matches!(err, CacheError::CapacityExceeded(1)));

        // Overwriting an existing key still works.
        cache.set("a", "3".to_string(), Duration::from_secs(60)).unwrap();
        assert_eq!(cache.get("a").unwrap().as_deref(), Some("3"));
    }

    #[test]
    fn full_cache_makes_room_by_purging_expired_entries() {
        let cache = InMemoryCacheStore::new(1);
        cache.set("a", "1".to_string(), Duration::from_millis(5)).unwrap();
        sleep(Duration::from_millis(20));

        cache.set("b", "2".to_string(), Duration::from_secs(60)).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b").unwrap().as_deref(), Some("2"));
    }
}
