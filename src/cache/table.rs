//! Hash Table Module
//!
//! Separate-chaining hash table over byte keys. Entries are stored once in a
//! slot arena; buckets are [`Chain`]s threaded through that arena, so a
//! rehash only rewrites links and never copies key or value buffers.

use crate::cache::arena::SlotArena;
use crate::cache::chain::{Chain, ChainNode};
use crate::cache::hash::HashPolicy;
use crate::cache::CacheEntry;

/// Occupied-bucket ratio above which the table grows.
pub const MAX_LOAD_FACTOR: f64 = 0.5;

/// Buckets allocated per occupied bucket on growth, for a load factor of 0.1.
const GROWTH_FACTOR: usize = 10;

// == Insert Outcome ==
/// What an insert did to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Bucket the entry landed in
    pub bucket: usize,
    /// Size of the entry this insert replaced, if the key was present
    pub replaced: Option<u32>,
    /// True when the bucket already held a different key
    pub collided: bool,
}

// == Hash Table ==
/// Chained hash table with load-factor driven resizing.
#[derive(Debug)]
pub struct HashTable<H> {
    buckets: Vec<Chain>,
    nodes: SlotArena<ChainNode>,
    /// Buckets holding at least one entry
    occupied: usize,
    hasher: H,
}

impl<H: HashPolicy> HashTable<H> {
    // == Constructor ==
    /// Creates an empty table with `bucket_count` buckets.
    ///
    /// # Panics
    /// If `bucket_count` is zero.
    pub fn with_buckets(bucket_count: usize, hasher: H) -> Self {
        assert!(bucket_count > 0, "bucket count must be greater than 0");
        Self {
            buckets: vec![Chain::default(); bucket_count],
            nodes: SlotArena::new(),
            occupied: 0,
            hasher,
        }
    }

    fn bucket_of(&self, key: &[u8]) -> usize {
        (self.hasher.hash(key) % self.buckets.len() as u64) as usize
    }

    // == Lookup ==
    /// Returns a copy of the value stored under `key`.
    pub fn lookup(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entry(key).map(CacheEntry::copy_value)
    }

    /// Borrows the entry stored under `key`. Crate-internal only.
    pub(crate) fn entry(&self, key: &[u8]) -> Option<&CacheEntry> {
        let chain = &self.buckets[self.bucket_of(key)];
        chain
            .find(&self.nodes, key)
            .map(|id| &self.nodes.node(id).entry)
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.entry(key).is_some()
    }

    // == Insert ==
    /// Stores `value` under `key`, replacing any existing entry for the key.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> InsertOutcome {
        let bucket = self.bucket_of(key);
        let chain = &mut self.buckets[bucket];
        let was_empty = chain.is_empty();

        let replaced = chain.remove(&mut self.nodes, key).map(|old| old.size());
        let collided = !chain.is_empty();
        chain.insert_front(&mut self.nodes, CacheEntry::new(key, value));

        if was_empty {
            self.occupied += 1;
        }

        InsertOutcome {
            bucket,
            replaced,
            collided,
        }
    }

    // == Remove ==
    /// Removes the entry for `key`, returning its value size.
    pub fn remove(&mut self, key: &[u8]) -> Option<u32> {
        let bucket = self.bucket_of(key);
        let chain = &mut self.buckets[bucket];
        let removed = chain.remove(&mut self.nodes, key)?;
        if chain.is_empty() {
            self.occupied -= 1;
        }
        Some(removed.size())
    }

    // == Resize ==
    /// Grows the bucket array when the load factor exceeds [`MAX_LOAD_FACTOR`].
    ///
    /// The new array holds ten buckets per currently occupied bucket. Every
    /// entry is rehashed into it before it replaces the old array.
    /// Returns `(old, new)` bucket counts when a resize happened.
    pub fn resize_if_needed(&mut self) -> Option<(usize, usize)> {
        if self.occupied == 0 || self.load_factor() <= MAX_LOAD_FACTOR {
            return None;
        }

        let old_count = self.buckets.len();
        let new_count = self.occupied * GROWTH_FACTOR;
        let mut buckets = vec![Chain::default(); new_count];
        let mut occupied = 0;

        let ids: Vec<_> = self.nodes.ids().collect();
        for id in ids {
            let hash = self.hasher.hash(self.nodes.node(id).entry.key());
            let chain = &mut buckets[(hash % new_count as u64) as usize];
            if chain.is_empty() {
                occupied += 1;
            }
            chain.link_front(&mut self.nodes, id);
        }

        self.buckets = buckets;
        self.occupied = occupied;
        Some((old_count, new_count))
    }

    // == Clear ==
    /// Frees every entry, keeping the current bucket array.
    /// Returns the total value bytes released.
    pub fn clear(&mut self) -> u64 {
        let mut freed = 0;
        for chain in &mut self.buckets {
            freed += chain.destroy_all(&mut self.nodes);
        }
        debug_assert!(self.nodes.is_empty(), "entries outside any chain");
        self.nodes.clear();
        self.occupied = 0;
        freed
    }

    // == Check Invariants ==
    /// Verifies chain links, bucket placement, and the occupied count.
    /// Panics on any violation.
    pub fn check_invariants(&self) {
        let mut occupied = 0;
        let mut total = 0;
        for (index, chain) in self.buckets.iter().enumerate() {
            chain.check_links(&self.nodes);
            if !chain.is_empty() {
                occupied += 1;
            }
            total += chain.len();
            for (_, entry) in chain.iter(&self.nodes) {
                assert_eq!(
                    self.bucket_of(entry.key()),
                    index,
                    "entry stored in the wrong bucket"
                );
            }
        }
        assert_eq!(occupied, self.occupied, "occupied bucket count drifted");
        assert_eq!(total, self.nodes.len(), "entries outside any chain");
    }
}

// Read-only accessors need no hash policy.
impl<H> HashTable<H> {
    // == Accessors ==
    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn occupied_buckets(&self) -> usize {
        self.occupied
    }

    pub fn load_factor(&self) -> f64 {
        self.occupied as f64 / self.buckets.len() as f64
    }

    /// Iterates over every stored entry in bucket order.
    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry> + '_ {
        self.buckets
            .iter()
            .flat_map(move |chain| chain.iter(&self.nodes).map(|(_, entry)| entry))
    }
}
