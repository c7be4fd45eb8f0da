//! Dan Bernstein's string hash. Used by ChainedHashTable to pick a bucket for
//! a key. Only the raw bytes of the key are fed in, so a key always lands in
//! the same bucket for a given table size.

use std::hash::{BuildHasher, Hasher};

/// Starting value of every DJB2 hash.
const DJB2_SEED: u64 = 5381;

/// Folds bytes in with `h = h * 33 + byte`, wrapping on overflow.
#[derive(Debug, Clone, Copy)]
pub struct Djb2Hasher(u64);

impl Default for Djb2Hasher {
    fn default() -> Self {
        Djb2Hasher(DJB2_SEED)
    }
}

impl Hasher for Djb2Hasher {
    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 = (self.0 << 5).wrapping_add(self.0).wrapping_add(*byte as u64);
        }
    }

    fn finish(&self) -> u64 {
        self.0
    }
}

/// Builds new Djb2Hashers on demand.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildDjb2Hasher;

impl BuildHasher for BuildDjb2Hasher {
    type Hasher = Djb2Hasher;

    fn build_hasher(&self) -> Self::Hasher {
        Djb2Hasher::default()
    }
}

/// Hashes a whole string in one go.
pub fn djb2(key: &str) -> u64 {
    let mut h = BuildDjb2Hasher.build_hasher();
    h.write(key.as_bytes());
    h.finish()
}
