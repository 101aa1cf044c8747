use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

/// Small TTL'd LRU cache for dashboard aggregates.
///
/// Aggregates are recomputed from the full registration set, so the
/// dashboard endpoints would otherwise re-read the collection on every
/// poll. Entries expire after `ttl` and are recomputed lazily.
pub struct StatsCache<T> {
    cache: Mutex<LruCache<String, (T, Instant)>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub hit_rate: f64,
}

impl<T> StatsCache<T> {
    pub fn new(capacity: usize, ttl_secs: u64) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                capacity
                    .try_into()
                    .unwrap_or_else(|_| std::num::NonZeroUsize::new(1).unwrap()),
            )),
            ttl: Duration::from_secs(ttl_secs),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &str) -> Option<T>
    where
        T: Clone,
    {
        let mut cache = self.cache.lock();
        if let Some((value, timestamp)) = cache.get(key) {
            if timestamp.elapsed() < self.ttl {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(value.clone());
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub fn set(&self, key: &str, value: T) {
        let mut cache = self.cache.lock();
        cache.put(key.to_string(), (value, Instant::now()));
    }

    pub fn make_key(parts: &[&str]) -> String {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };
        let cache = self.cache.lock();

        CacheStats {
            hits,
            misses,
            size: cache.len(),
            hit_rate,
        }
    }

    pub fn clear(&self) {
        let mut cache = self.cache.lock();
        cache.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_after_set() {
        let cache: StatsCache<u32> = StatsCache::new(4, 60);
        cache.set("k", 7);
        assert_eq!(cache.get("k"), Some(7));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_miss_is_counted() {
        let cache: StatsCache<u32> = StatsCache::new(4, 60);
        assert_eq!(cache.get("absent"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let cache: StatsCache<u32> = StatsCache::new(4, 0);
        cache.set("k", 7);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_make_key_separates_parts() {
        let a = StatsCache::<u32>::make_key(&["ab", "c"]);
        let b = StatsCache::<u32>::make_key(&["a", "bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_clear_resets_counters() {
        let cache: StatsCache<u32> = StatsCache::new(4, 60);
        cache.set("k", 1);
        cache.get("k");
        cache.clear();
        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.stats().size, 0);
    }
}
