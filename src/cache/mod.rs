//! Cache Module
//!
//! Provides a bounded-memory byte cache: a chained hash table with dynamic
//! resizing, an LRU eviction tracker, and the store that keeps both in step
//! with the memory accounting.

mod arena;
mod chain;
mod entry;
mod events;
mod hash;
mod lru;
mod shared;
mod stats;
mod store;
mod table;


// Re-export public types
pub use entry::CacheEntry;
pub use events::{CacheEvent, CacheObserver, NoopObserver};
pub use hash::{HashPolicy, JenkinsHash};
pub use lru::LruTracker;
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use store::CacheStore;
pub use table::{HashTable, InsertOutcome, MAX_LOAD_FACTOR};
