/// Computes the djb2 hash of a key.
///
/// `hash = 5381; for each byte c: hash = hash * 33 + c`, with wrapping
/// unsigned 64-bit accumulation and no finalization mixing. This must stay
/// bit-for-bit identical to the hash used when the header table was built,
/// otherwise every lookup lands in the wrong bucket.
///
/// # Parameters
/// - `key`: The raw key bytes (field 0 of a dataset record).
///
/// # Returns
/// - The unreduced 64-bit hash. Use [`bucket_for`] to map it to a slot.
#[inline]
pub fn djb2(key: &[u8]) -> u64 {
    key.iter().fold(5381u64, |hash, &c| {
        (hash << 5).wrapping_add(hash).wrapping_add(c as u64)
    })
}

/// Maps a key to its bucket in a table of `table_size` slots.
#[inline]
pub fn bucket_for(key: &[u8], table_size: usize) -> usize {
    (djb2(key) % table_size as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_hashes_to_seed() {
        assert_eq!(djb2(b""), 5381);
    }

    #[test]
    fn matches_reference_values() {
        // 5381 * 33 + 'a'
        assert_eq!(djb2(b"a"), 177_670);
        // (5381 * 33 + '1') * 33 + '2'
        assert_eq!(djb2(b"12"), (5381 * 33 + 49) * 33 + 50);
    }

    #[test]
    fn long_keys_wrap_instead_of_overflowing() {
        let key = vec![b'9'; 4096];
        let bucket = bucket_for(&key, 65536);
        assert!(bucket < 65536);
    }
}
