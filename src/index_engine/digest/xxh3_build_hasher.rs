use std::collections::HashSet;
use std::hash::{BuildHasher, Hasher};
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Set of chain node offsets already visited by one traversal.
pub type VisitedOffsets = HashSet<i64, Xxh3BuildHasher>;

/// XXH3-backed `Hasher` for offset-keyed sets.
///
/// Each `write` folds the previous state in as the seed, so multi-part keys
/// still hash every part.
#[derive(Default)]
pub struct Xxh3Hasher {
    state: u64,
}

impl Hasher for Xxh3Hasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.state = xxh3_64_with_seed(bytes, self.state);
    }

    #[inline]
    fn write_i64(&mut self, value: i64) {
        self.write(&value.to_le_bytes());
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }
}

#[derive(Default, Clone, Copy, Debug)]
pub struct Xxh3BuildHasher;

impl BuildHasher for Xxh3BuildHasher {
    type Hasher = Xxh3Hasher;

    fn build_hasher(&self) -> Self::Hasher {
        Xxh3Hasher::default()
    }
}
