//! Shared Cache Module
//!
//! Thread-safe handle around a [`CacheStore`]. Each operation holds one
//! exclusive lock for its whole duration; resizes and the coupled
//! table/tracker updates never interleave.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::{CacheStats, CacheStore, HashPolicy, JenkinsHash};
use crate::error::Result;

// == Shared Cache ==
/// Cloneable, lock-protected cache handle.
pub struct SharedCache<H = JenkinsHash> {
    inner: Arc<Mutex<CacheStore<H>>>,
}

impl<H> Clone for SharedCache<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H> fmt::Debug for SharedCache<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCache")
            .field("inner", &self.inner)
            .finish()
    }
}

impl<H: HashPolicy> SharedCache<H> {
    pub fn new(store: CacheStore<H>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.inner.lock().set(key, value)
    }

    /// Returns an owned copy; no reference into the cache escapes the lock.
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.inner.lock().get(key)
    }

    pub fn delete(&self, key: &[u8]) -> bool {
        self.inner.lock().delete(key)
    }

    pub fn space_used(&self) -> u64 {
        self.inner.lock().space_used()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    /// Runs `f` with exclusive access, for multi-step operations.
    pub fn with_store<R>(&self, f: impl FnOnce(&mut CacheStore<H>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Destroys the cache if this is the last handle; otherwise hands it back.
    pub fn try_destroy(self) -> std::result::Result<(), Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => {
                mutex.into_inner().destroy();
                Ok(())
            }
            Err(inner) => Err(Self { inner }),
        }
    }
}

impl From<CacheStore> for SharedCache {
    fn from(store: CacheStore) -> Self {
        SharedCache::new(store)
    }
}
