//! Cache Events Module
//!
//! Decision points the cache reports to an injected observer.

// == Cache Event ==
/// A structural decision taken by the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// An entry was evicted to make room for a new value
    Evicted { key: Vec<u8>, size: u32 },
    /// An insert landed in a bucket already holding a different key
    Collision { bucket: usize },
    /// The hash table was rehashed into a larger bucket array
    Resized { from: usize, to: usize },
}

// == Cache Observer ==
/// Receives [`CacheEvent`]s as they happen.
///
/// Closures taking `&CacheEvent` implement this trait.
pub trait CacheObserver: Send {
    fn on_event(&mut self, event: &CacheEvent);
}

impl<F> CacheObserver for F
where
    F: FnMut(&CacheEvent) + Send,
{
    fn on_event(&mut self, event: &CacheEvent) {
        self(event)
    }
}

/// Observer that ignores every event. Installed by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CacheObserver for NoopObserver {
    fn on_event(&mut self, _event: &CacheEvent) {}
}
