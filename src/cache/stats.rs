//! Cache Statistics Module
//!
//! Tracks cache performance metrics and a snapshot of memory and table state.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals
    pub misses: u64,
    /// Number of entries evicted to stay within the memory budget
    pub evictions: u64,
    /// Number of inserts that landed in an already occupied bucket
    pub collisions: u64,
    /// Number of hash table rehashes
    pub resizes: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Bytes of value data currently stored
    pub memory_used: u64,
    /// Configured memory budget in bytes
    pub memory_budget: u64,
    /// Current hash table size
    pub bucket_count: usize,
    /// Buckets holding at least one entry
    pub occupied_buckets: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Increments the collision counter.
    pub fn record_collision(&mut self) {
        self.collisions += 1;
    }

    /// Increments the resize counter.
    pub fn record_resize(&mut self) {
        self.resizes += 1;
    }
}
