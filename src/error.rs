//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Broken internal invariants are not represented here; they panic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key not found in cache; the key is shown as its bytes
    #[error("Key not found: {0:?}")]
    NotFound(Vec<u8>),

    /// Value can never fit, even with every other entry evicted
    #[error("Item of {size} bytes exceeds memory budget of {budget} bytes")]
    ItemTooLarge { size: u64, budget: u64 },

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CacheError {
    /// Builds a `NotFound` error from a raw byte key.
    pub(crate) fn not_found(key: &[u8]) -> Self {
        CacheError::NotFound(key.to_vec())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
