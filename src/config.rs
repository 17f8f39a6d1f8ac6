//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;

use crate::error::{CacheError, Result};

/// Default memory budget in bytes.
pub const DEFAULT_MEMORY_BUDGET: u64 = 65536;

/// Default number of hash buckets allocated at construction.
pub const DEFAULT_INITIAL_BUCKETS: usize = 100;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Upper bound on the summed size of all stored values, in bytes
    pub memory_budget: u64,
    /// Bucket count of the hash table before its first resize
    pub initial_buckets: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MEMORY_BUDGET` - Memory budget in bytes (default: 65536)
    /// - `CACHE_INITIAL_BUCKETS` - Initial bucket count (default: 100)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self {
            memory_budget: env::var("CACHE_MEMORY_BUDGET")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MEMORY_BUDGET),
            initial_buckets: env::var("CACHE_INITIAL_BUCKETS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_INITIAL_BUCKETS),
        }
    }

    /// Checks that the configuration can build a working cache.
    pub fn validate(&self) -> Result<()> {
        if self.initial_buckets == 0 {
            return Err(CacheError::InvalidConfig(
                "initial_buckets must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_budget: DEFAULT_MEMORY_BUDGET,
            initial_buckets: DEFAULT_INITIAL_BUCKETS,
        }
    }
}
