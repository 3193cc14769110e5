// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-bounded cache for remote results.
//!
//! Two instances exist per resolver, one for stack outputs and one for
//! resource metadata, shared across all concurrent lookups via `Arc` so a
//! cache warmed by one caller benefits the others: a fleet-wide scaling
//! event that triggers many simultaneous resolutions against the same stack
//! collapses to few remote calls.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// The outcome of a remote fetch, as stored in the cache.
///
/// Negative results are cached explicitly: a stack or resource the service
/// reported missing stays missing for the TTL window instead of being
/// re-queried on every lookup. The variant makes a cached negative
/// distinguishable from a legitimately empty result.
///
/// # Examples
///
/// ```
/// use stacksource::adapters::Fetched;
///
/// let hit: Fetched<Vec<u8>> = Fetched::Found(vec![1, 2]);
/// let miss: Fetched<Vec<u8>> = Fetched::NotFound;
/// assert_ne!(hit, miss);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fetched<T> {
    /// The remote service returned a payload.
    Found(T),
    /// The remote service reported the stack or resource missing.
    NotFound,
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// A cache whose entries expire after a fixed time-to-live.
///
/// `get` never returns a stale value: an entry past its deadline behaves
/// exactly like an absent one. Expired entries are not eagerly deleted;
/// they are dropped when read or overwritten by the next `put`. There is no
/// size bound beyond TTL churn; growth is limited only by key cardinality,
/// which is an accepted tradeoff for the short windows involved.
///
/// Concurrent `get`/`put` for the same key during a miss refill may cause a
/// redundant remote call, but a partially-written entry is never observable:
/// whole values are inserted under the interior mutex.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use stacksource::adapters::TtlCache;
///
/// let cache: TtlCache<String> = TtlCache::new(Duration::from_secs(60));
/// cache.put("eu-west-1/myapp", "value".to_string());
/// assert_eq!(cache.get("eu-west-1/myapp"), Some("value".to_string()));
/// assert_eq!(cache.get("other"), None);
/// ```
pub struct TtlCache<V> {
    default_ttl: Duration,
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    /// Creates an empty cache with the given default time-to-live.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `key` if present and unexpired.
    ///
    /// An expired entry is removed on the way out and reported as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores `value` under `key` with the default time-to-live.
    pub fn put(&self, key: &str, value: V) {
        self.put_with_ttl(key, value, self.default_ttl);
    }

    /// Stores `value` under `key`, expiring after `ttl`.
    ///
    /// Overwrites any existing entry, expired or not.
    pub fn put_with_ttl(&self, key: &str, value: V, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.insert(key.to_string(), entry);
    }

    /// Returns the number of entries currently stored, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_get_after_put() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put("key", 42);
        assert_eq!(cache.get("key"), Some(42));
    }

    #[test]
    fn test_get_absent_key() {
        let cache: TtlCache<i32> = TtlCache::new(Duration::from_secs(60));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_entry_expires() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put_with_ttl("key", 42, Duration::from_millis(20));
        assert_eq!(cache.get("key"), Some(42));

        thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get("key"), None);
    }

    #[test]
    fn test_expired_entry_is_reclaimed_on_read() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put_with_ttl("key", 1, Duration::from_millis(10));
        thread::sleep(Duration::from_millis(30));

        assert_eq!(cache.get("key"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_overwrites() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put("key", 1);
        cache.put("key", 2);
        assert_eq!(cache.get("key"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_revives_expired_entry() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put_with_ttl("key", 1, Duration::from_millis(10));
        thread::sleep(Duration::from_millis(30));

        cache.put("key", 2);
        assert_eq!(cache.get("key"), Some(2));
    }

    #[test]
    fn test_negative_result_storage() {
        let cache: TtlCache<Fetched<Vec<i32>>> = TtlCache::new(Duration::from_secs(60));
        cache.put("ghost", Fetched::NotFound);
        assert_eq!(cache.get("ghost"), Some(Fetched::NotFound));
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(TtlCache::new(Duration::from_secs(60)));
        let mut handles = Vec::new();

        for i in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                let key = format!("key{}", i % 2);
                cache.put(&key, i);
                cache.get(&key)
            }));
        }

        for handle in handles {
            // Every read observes a whole value, never a torn one.
            assert!(handle.join().unwrap().is_some());
        }
    }
}
