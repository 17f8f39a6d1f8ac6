//! Cache Entry Module
//!
//! Defines the owned storage for a single key/value pair.

// == Cache Entry ==
/// Owns the key and value buffers of one cached item.
///
/// Keys compare by length and then bytes; embedded zero bytes are ordinary data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The key bytes
    key: Box<[u8]>,
    /// The stored value
    value: Box<[u8]>,
    /// Size of the value in bytes
    size: u32,
}

impl CacheEntry {
    // == Constructor ==
    /// Copies `key` and `value` into a new entry.
    ///
    /// The caller has already checked that `value` fits in a `u32` length.
    pub fn new(key: &[u8], value: &[u8]) -> Self {
        debug_assert!(value.len() <= u32::MAX as usize);
        Self {
            key: key.into(),
            value: value.into(),
            size: value.len() as u32,
        }
    }

    /// Returns the key bytes.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Returns the stored value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Returns the value size in bytes.
    pub fn size(&self) -> u32 {
        self.size
    }

    // == Matches ==
    /// Exact byte-for-byte key comparison.
    pub fn matches(&self, key: &[u8]) -> bool {
        *self.key == *key
    }

    /// Returns a caller-owned copy of the value.
    pub fn copy_value(&self) -> Vec<u8> {
        self.value.to_vec()
    }
}
