//! Bytecache - A bounded-memory key/value cache
//!
//! Maps byte-string keys to byte-string values, evicting least recently used
//! entries to stay within a memory budget.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheStore, SharedCache};
pub use config::Config;
pub use error::{CacheError, Result};
