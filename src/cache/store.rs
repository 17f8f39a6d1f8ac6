//! Cache Store Module
//!
//! Main cache engine combining the chained hash table with LRU tracking and
//! memory-budget accounting.

use std::fmt;

use tracing::{debug, trace, warn};

use crate::cache::{
    CacheEvent, CacheObserver, CacheStats, HashPolicy, HashTable, JenkinsHash, LruTracker,
    NoopObserver,
};
use crate::config::{Config, DEFAULT_INITIAL_BUCKETS};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Bounded-memory byte cache with LRU eviction.
///
/// `memory_used` is the summed size of all stored values; key bytes are not
/// counted. The hash table and the LRU tracker always hold the same key set.
pub struct CacheStore<H = JenkinsHash> {
    /// Key-value storage
    table: HashTable<H>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance counters
    stats: CacheStats,
    /// Bytes of value data currently stored
    memory_used: u64,
    /// Upper bound on `memory_used`
    memory_budget: u64,
    /// Receiver for eviction, collision, and resize events
    observer: Box<dyn CacheObserver>,
}

impl CacheStore<JenkinsHash> {
    // == Constructor ==
    /// Creates an empty cache using the default hash policy.
    ///
    /// # Arguments
    /// * `memory_budget` - Maximum total size of stored values, in bytes
    pub fn new(memory_budget: u64) -> Self {
        Self::with_hasher(memory_budget, JenkinsHash)
    }

    /// Creates an empty cache from a validated [`Config`].
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_buckets_and_hasher(
            config.memory_budget,
            config.initial_buckets,
            JenkinsHash,
        ))
    }
}

impl<H: HashPolicy> CacheStore<H> {
    /// Creates an empty cache with a custom hash policy.
    pub fn with_hasher(memory_budget: u64, hasher: H) -> Self {
        Self::with_buckets_and_hasher(memory_budget, DEFAULT_INITIAL_BUCKETS, hasher)
    }

    /// Creates an empty cache with a custom hash policy and initial bucket count.
    ///
    /// # Panics
    /// If `bucket_count` is zero.
    pub fn with_buckets_and_hasher(memory_budget: u64, bucket_count: usize, hasher: H) -> Self {
        Self {
            table: HashTable::with_buckets(bucket_count, hasher),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            memory_used: 0,
            memory_budget,
            observer: Box::new(NoopObserver),
        }
    }

    /// Installs the observer that receives [`CacheEvent`]s.
    pub fn set_observer(&mut self, observer: impl CacheObserver + 'static) {
        self.observer = Box::new(observer);
    }

    fn emit(&mut self, event: CacheEvent) {
        self.observer.on_event(&event);
    }

    // == Set ==
    /// Stores a copy of `value` under `key`.
    ///
    /// If the key already exists, the old value is released first. Least
    /// recently used entries are evicted until the new value fits the budget.
    ///
    /// # Errors
    /// `ItemTooLarge` if the value alone exceeds the memory budget. The cache
    /// is left untouched in that case.
    pub fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let size = match u32::try_from(value.len()) {
            Ok(size) if u64::from(size) <= self.memory_budget => size,
            _ => {
                warn!(
                    size = value.len(),
                    budget = self.memory_budget,
                    "refusing item larger than memory budget"
                );
                return Err(CacheError::ItemTooLarge {
                    size: value.len() as u64,
                    budget: self.memory_budget,
                });
            }
        };

        // Release the old value so it does not count against the new one
        if let Some(old) = self.table.remove(key) {
            self.lru.record_delete(key);
            self.release(old);
        }

        while self.memory_used + u64::from(size) > self.memory_budget {
            let victim = match self.lru.select_victim() {
                Some(victim) => victim.to_vec(),
                None => panic!(
                    "{} bytes accounted with no tracked entries",
                    self.memory_used
                ),
            };
            self.evict(victim);
        }

        let outcome = self.table.insert(key, value);
        if let Some(old) = outcome.replaced {
            self.release(old);
        }
        if outcome.collided {
            self.stats.record_collision();
            debug!(bucket = outcome.bucket, "hash collision");
            self.emit(CacheEvent::Collision {
                bucket: outcome.bucket,
            });
        }
        self.lru.record_insert(key);
        self.memory_used += u64::from(size);

        if let Some((from, to)) = self.table.resize_if_needed() {
            self.stats.record_resize();
            debug!(from, to, "resized hash table");
            self.emit(CacheEvent::Resized { from, to });
        }

        trace!(key_len = key.len(), size, memory_used = self.memory_used, "set");
        self.debug_check();
        Ok(())
    }

    fn evict(&mut self, key: Vec<u8>) {
        let size = match self.table.remove(&key) {
            Some(size) => size,
            None => panic!("LRU victim missing from hash table"),
        };
        self.lru.record_delete(&key);
        self.release(size);
        self.stats.record_eviction();
        debug!(key_len = key.len(), size, "evicted LRU entry");
        self.emit(CacheEvent::Evicted { key, size });
    }

    fn release(&mut self, size: u32) {
        self.memory_used = match self.memory_used.checked_sub(u64::from(size)) {
            Some(used) => used,
            None => panic!(
                "memory accounting underflow: releasing {} of {} bytes",
                size, self.memory_used
            ),
        };
    }

    // == Get ==
    /// Retrieves a copy of the value stored under `key`.
    ///
    /// A hit makes the key the most recently used.
    pub fn get(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        match self.table.lookup(key) {
            Some(value) => {
                let tracked = self.lru.record_access(key);
                debug_assert!(tracked, "stored key missing from LRU tracker");
                self.stats.record_hit();
                trace!(key_len = key.len(), size = value.len(), "get hit");
                Ok(value)
            }
            None => {
                self.stats.record_miss();
                trace!(key_len = key.len(), "get miss");
                Err(CacheError::not_found(key))
            }
        }
    }

    // == Delete ==
    /// Removes an entry by key.
    ///
    /// Returns false, changing nothing, if the key is absent.
    pub fn delete(&mut self, key: &[u8]) -> bool {
        match self.table.remove(key) {
            Some(size) => {
                let tracked = self.lru.record_delete(key);
                debug_assert!(tracked, "stored key missing from LRU tracker");
                self.release(size);
                trace!(key_len = key.len(), size, "delete");
                self.debug_check();
                true
            }
            None => false,
        }
    }

    // == Space Used ==
    /// Returns the total size of stored values in bytes.
    pub fn space_used(&self) -> u64 {
        self.memory_used
    }

    pub fn memory_budget(&self) -> u64 {
        self.memory_budget
    }

    // == Contains ==
    /// Checks for a key without counting a hit or changing recency.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.table.contains(key)
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    pub fn load_factor(&self) -> f64 {
        self.table.load_factor()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.table.len(),
            memory_used: self.memory_used,
            memory_budget: self.memory_budget,
            bucket_count: self.table.bucket_count(),
            occupied_buckets: self.table.occupied_buckets(),
            ..self.stats.clone()
        }
    }

    // == Clear ==
    /// Removes every entry. Counters, budget, and bucket array are kept.
    pub fn clear(&mut self) {
        let freed = self.table.clear();
        self.lru.clear();
        self.memory_used = match self.memory_used.checked_sub(freed) {
            Some(used) => used,
            None => panic!(
                "memory accounting underflow: freed {} of {} bytes",
                freed, self.memory_used
            ),
        };
        assert_eq!(self.memory_used, 0, "memory accounted to no entry");
    }

    // == Destroy ==
    /// Frees every entry and the cache itself, verifying the accounting.
    ///
    /// # Panics
    /// If any bytes remain accounted after all entries are freed.
    pub fn destroy(mut self) {
        self.clear();
        assert_eq!(self.memory_used, 0, "memory still accounted after destroy");
        debug!("cache destroyed");
    }

    // == Check Invariants ==
    /// Full consistency check of table, tracker, and accounting.
    /// Panics on the first violation found.
    pub fn check_invariants(&self) {
        self.table.check_invariants();
        self.lru.check_invariants();
        assert_eq!(
            self.table.len(),
            self.lru.len(),
            "hash table and LRU tracker diverged"
        );
        let mut sum = 0u64;
        for entry in self.table.entries() {
            assert!(self.lru.contains(entry.key()), "stored key not tracked");
            sum += u64::from(entry.size());
        }
        assert_eq!(sum, self.memory_used, "memory accounting drifted");
        assert!(self.memory_used <= self.memory_budget, "memory budget exceeded");
    }

    /// Runs the full consistency check after each mutation in debug builds.
    fn debug_check(&self) {
        #[cfg(debug_assertions)]
        self.check_invariants();
    }
}

impl<H> fmt::Debug for CacheStore<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("entries", &self.table.len())
            .field("memory_used", &self.memory_used)
            .field("memory_budget", &self.memory_budget)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_store_new() {
        let store = CacheStore::new(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.space_used(), 0);
        assert_eq!(store.memory_budget(), 100);
        assert_eq!(store.bucket_count(), DEFAULT_INITIAL_BUCKETS);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = CacheStore::new(100);

        store.set(b"key1", b"value1").unwrap();
        let value = store.get(b"key1").unwrap();

        assert_eq!(value, b"value1");
        assert_eq!(store.len(), 1);
        assert_eq!(store.space_used(), 6);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = CacheStore::new(100);

        let result = store.get(b"nonexistent");
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[test]
    fn test_store_delete() {
        let mut store = CacheStore::new(100);

        store.set(b"key1", b"value1").unwrap();
        assert!(store.delete(b"key1"));

        assert!(store.is_empty());
        assert_eq!(store.space_used(), 0);
        assert!(matches!(store.get(b"key1"), Err(CacheError::NotFound(_))));
    }

    #[test]
    fn test_store_delete_nonexistent() {
        let mut store = CacheStore::new(100);
        store.set(b"key1", b"v").unwrap();

        assert!(!store.delete(b"nonexistent"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.space_used(), 1);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = CacheStore::new(100);

        store.set(b"key1", b"value1").unwrap();
        store.set(b"key1", b"v2").unwrap();

        let value = store.get(b"key1").unwrap();
        assert_eq!(value, b"v2");
        assert_eq!(store.len(), 1);
        assert_eq!(store.space_used(), 2);
        store.check_invariants();
    }

    #[test]
    fn test_store_overwrite_does_not_evict_itself_needlessly() {
        let mut store = CacheStore::new(10);
        store.set(b"a", &[0; 4]).unwrap();
        store.set(b"b", &[0; 6]).unwrap();

        // 10 - 6 + 6 fits without evicting "a"
        store.set(b"b", &[1; 6]).unwrap();
        assert!(store.contains(b"a"));
        assert_eq!(store.space_used(), 10);
    }

    #[test]
    fn test_store_lru_eviction_by_memory() {
        let mut store = CacheStore::new(10);

        store.set(b"a", &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(store.space_used(), 6);

        store.set(b"b", &[6, 5, 4, 3, 2, 1]).unwrap();

        assert_eq!(store.space_used(), 6);
        assert!(matches!(store.get(b"a"), Err(CacheError::NotFound(_))));
        assert_eq!(store.get(b"b").unwrap(), vec![6, 5, 4, 3, 2, 1]);
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = CacheStore::new(3);

        store.set(b"key1", b"1").unwrap();
        store.set(b"key2", b"2").unwrap();
        store.set(b"key3", b"3").unwrap();

        // Access key1 to make it most recently used
        store.get(b"key1").unwrap();

        // Adding key4 should evict key2 (now oldest)
        store.set(b"key4", b"4").unwrap();

        assert!(store.get(b"key1").is_ok());
        assert!(matches!(store.get(b"key2"), Err(CacheError::NotFound(_))));
    }

    #[test]
    fn test_store_evicts_several_to_fit() {
        let mut store = CacheStore::new(10);
        store.set(b"a", &[0; 3]).unwrap();
        store.set(b"b", &[0; 3]).unwrap();
        store.set(b"c", &[0; 3]).unwrap();

        store.set(b"d", &[0; 8]).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.space_used(), 8);
        assert_eq!(store.stats().evictions, 3);
        store.check_invariants();
    }

    #[test]
    fn test_store_item_too_large_leaves_state() {
        let mut store = CacheStore::new(10);
        store.set(b"a", &[0; 4]).unwrap();

        let result = store.set(b"a", &[0; 11]);
        assert_eq!(
            result,
            Err(CacheError::ItemTooLarge {
                size: 11,
                budget: 10
            })
        );
        assert_eq!(store.get(b"a").unwrap(), vec![0; 4]);
        assert_eq!(store.space_used(), 4);
    }

    #[test]
    fn test_store_value_exactly_budget() {
        let mut store = CacheStore::new(10);
        store.set(b"a", &[0; 3]).unwrap();
        store.set(b"b", &[0; 10]).unwrap();

        assert_eq!(store.space_used(), 10);
        assert!(!store.contains(b"a"));
    }

    #[test]
    fn test_store_zero_budget_accepts_empty_values() {
        let mut store = CacheStore::new(0);
        store.set(b"a", b"").unwrap();
        store.set(b"b", b"").unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.set(b"c", b"x").is_err());
    }

    #[test]
    fn test_store_binary_keys_with_zero_bytes() {
        let mut store = CacheStore::new(100);
        store.set(&[b'a', 0, b'x'], b"1").unwrap();
        store.set(&[b'a', 0, b'y'], b"2").unwrap();

        assert_eq!(store.get(&[b'a', 0, b'x']).unwrap(), b"1");
        assert_eq!(store.get(&[b'a', 0, b'y']).unwrap(), b"2");
        assert!(store.get(b"a").is_err());
    }

    #[test]
    fn test_store_collisions_with_constant_hash() {
        let mut store = CacheStore::with_hasher(100, |_: &[u8]| 0u64);
        store.set(b"x", b"1").unwrap();
        store.set(b"y", b"2").unwrap();
        store.set(b"z", b"3").unwrap();

        assert_eq!(store.get(b"x").unwrap(), b"1");
        assert_eq!(store.get(b"y").unwrap(), b"2");
        assert_eq!(store.get(b"z").unwrap(), b"3");
        assert_eq!(store.stats().collisions, 2);
        store.check_invariants();
    }

    #[test]
    fn test_store_stats() {
        let mut store = CacheStore::new(100);

        store.set(b"key1", b"value1").unwrap();
        store.get(b"key1").unwrap(); // hit
        let _ = store.get(b"nonexistent"); // miss
        assert!(store.contains(b"key1")); // not counted

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.memory_used, 6);
        assert_eq!(stats.memory_budget, 100);
        assert_eq!(stats.occupied_buckets, 1);
    }

    #[test]
    fn test_store_resize_on_growth() {
        let mut store = CacheStore::with_buckets_and_hasher(1000, 4, JenkinsHash);
        for i in 0..50u8 {
            store.set(&[i], &[i]).unwrap();
        }

        assert!(store.bucket_count() > 4);
        assert!(store.stats().resizes >= 1);
        for i in 0..50u8 {
            assert_eq!(store.get(&[i]).unwrap(), vec![i]);
        }
        store.check_invariants();
    }

    #[test]
    fn test_store_observer_sees_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);

        let mut store = CacheStore::with_buckets_and_hasher(4, 2, |k: &[u8]| u64::from(k[0]));
        store.set_observer(move |event: &CacheEvent| sink.lock().unwrap().push(event.clone()));

        store.set(&[0], &[0; 2]).unwrap();
        store.set(&[2], &[0; 2]).unwrap(); // same bucket as [0]
        store.set(&[1], &[0; 2]).unwrap(); // evicts [0]

        let events = events.lock().unwrap();
        assert!(events.contains(&CacheEvent::Collision { bucket: 0 }));
        assert!(events.contains(&CacheEvent::Evicted {
            key: vec![0],
            size: 2
        }));
    }

    #[test]
    fn test_store_clear() {
        let mut store = CacheStore::new(100);
        store.set(b"a", b"1").unwrap();
        store.set(b"b", b"22").unwrap();
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.space_used(), 0);
        store.set(b"c", b"3").unwrap();
        assert_eq!(store.get(b"c").unwrap(), b"3");
        store.check_invariants();
    }

    #[test]
    fn test_store_destroy() {
        let mut store = CacheStore::new(100);
        store.set(b"a", b"1").unwrap();
        store.set(b"b", b"22").unwrap();
        store.delete(b"a");
        store.destroy();
    }

    #[test]
    fn test_store_debug_with_closure_hasher() {
        let mut store = CacheStore::with_hasher(10, |_: &[u8]| 0u64);
        store.set(b"a", b"12").unwrap();

        let rendered = format!("{:?}", store);
        assert!(rendered.contains("entries: 1"));
        assert!(rendered.contains("memory_used: 2"));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "stored key not tracked")]
    fn test_store_detects_diverged_key_sets() {
        let mut store = CacheStore::new(100);
        store.set(b"a", b"1").unwrap();

        // Same sizes, different key sets
        store.lru.record_delete(b"a");
        store.lru.record_insert(b"ghost");

        store.set(b"b", b"2").unwrap();
    }

    #[test]
    fn test_store_from_config() {
        let config = Config {
            memory_budget: 64,
            initial_buckets: 8,
        };
        let store = CacheStore::from_config(&config).unwrap();
        assert_eq!(store.memory_budget(), 64);
        assert_eq!(store.bucket_count(), 8);

        let bad = Config {
            memory_budget: 64,
            initial_buckets: 0,
        };
        assert!(matches!(
            CacheStore::from_config(&bad),
            Err(CacheError::InvalidConfig(_))
        ));
    }
}
