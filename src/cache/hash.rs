//! Hash Policy Module
//!
//! Pluggable mapping from key bytes to a 64-bit hash. The table reduces the
//! hash modulo its bucket count.

// == Hash Policy ==
/// Maps a key to a pseudo-random integer.
///
/// Any `Fn(&[u8]) -> u64` is a policy, so tests can pass closures that force
/// collisions.
pub trait HashPolicy {
    fn hash(&self, key: &[u8]) -> u64;
}

impl<F> HashPolicy for F
where
    F: Fn(&[u8]) -> u64,
{
    fn hash(&self, key: &[u8]) -> u64 {
        self(key)
    }
}

// == Jenkins Hash ==
/// Jenkins one-at-a-time hash over every key byte. The default policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct JenkinsHash;

impl HashPolicy for JenkinsHash {
    fn hash(&self, key: &[u8]) -> u64 {
        let mut hash: u32 = 0;
        for &byte in key {
            hash = hash.wrapping_add(u32::from(byte));
            hash = hash.wrapping_add(hash << 10);
            hash ^= hash >> 6;
        }
        hash = hash.wrapping_add(hash << 3);
        hash ^= hash >> 11;
        hash = hash.wrapping_add(hash << 15);
        u64::from(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jenkins_known_values() {
        // Reference values of the one-at-a-time function.
        assert_eq!(JenkinsHash.hash(b"a"), 0xca2e_9442);
        assert_eq!(
            JenkinsHash.hash(b"The quick brown fox jumps over the lazy dog"),
            0x519e_91f5
        );
    }

    #[test]
    fn test_jenkins_uses_every_byte() {
        // Keys sharing a first byte must not all collide.
        assert_ne!(JenkinsHash.hash(b"ab"), JenkinsHash.hash(b"ac"));
        assert_ne!(JenkinsHash.hash(&[1, 0]), JenkinsHash.hash(&[1]));
    }

    #[test]
    fn test_closure_policy() {
        let constant = |_: &[u8]| 7u64;
        assert_eq!(constant.hash(b"anything"), 7);
    }
}
