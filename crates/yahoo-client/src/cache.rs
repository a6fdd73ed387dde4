//! Bounded, time-expiring memoization for provider lookups.

use dashmap::DashMap;
use std::time::{Duration, Instant};

struct CacheEntry<T> {
    value: T,
    inserted_at: Instant,
}

/// TTL cache with a fixed capacity, keyed by call signature.
///
/// When full, expired entries are dropped first; if none have expired the
/// oldest entry is evicted.
pub struct TtlCache<T> {
    entries: DashMap<String, CacheEntry<T>>,
    ttl: Duration,
    capacity: usize,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            capacity,
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: String, value: T) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            self.entries
                .retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);

            if self.entries.len() >= self.capacity {
                let oldest = self
                    .entries
                    .iter()
                    .min_by_key(|entry| entry.inserted_at)
                    .map(|entry| entry.key().clone());
                if let Some(oldest_key) = oldest {
                    self.entries.remove(&oldest_key);
                }
            }
        }

        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_within_ttl() {
        let cache = TtlCache::new(Duration::from_secs(60), 10);
        cache.insert("quote:TCS.NS".into(), 42);
        assert_eq!(cache.get("quote:TCS.NS"), Some(42));
        assert_eq!(cache.get("quote:INFY.NS"), None);
    }

    #[test]
    fn expired_entry_misses() {
        let cache = TtlCache::new(Duration::ZERO, 10);
        cache.insert("quote:TCS.NS".into(), 42);
        assert_eq!(cache.get("quote:TCS.NS"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let cache = TtlCache::new(Duration::from_secs(60), 2);
        cache.insert("a".into(), 1);
        std::thread::sleep(Duration::from_millis(5));
        cache.insert("b".into(), 2);
        std::thread::sleep(Duration::from_millis(5));
        cache.insert("c".into(), 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn reinserting_existing_key_does_not_evict() {
        let cache = TtlCache::new(Duration::from_secs(60), 2);
        cache.insert("a".into(), 1);
        cache.insert("b".into(), 2);
        cache.insert("a".into(), 10);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(10));
        assert_eq!(cache.get("b"), Some(2));
    }
}
