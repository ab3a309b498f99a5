use crate::constants::*;
use crate::index_layout::{IndexLayout, read_array};
use crc32fast::Hasher as Crc32FastHasher;

/// Fixed preamble written ahead of the bucket table in the versioned layout.
///
/// ## Layout (little-endian)
/// - `0..4`: magic `"CKIX"`
/// - `4..8`: format version
/// - `8..16`: table size (bucket count)
/// - `16..20`: CRC32 of the encoded table bytes that follow
/// - `20..24`: reserved, zero
///
/// Legacy header files have no preamble at all; they are a bare array of
/// native-endian offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TablePreamble {
    pub version: u32,
    pub table_size: u64,
    pub checksum: u32,
}

impl TablePreamble {
    pub fn new(table_size: u64, checksum: u32) -> Self {
        Self {
            version: HEADER_VERSION,
            table_size,
            checksum,
        }
    }

    /// Returns `true` if `data` starts with the versioned header magic.
    #[inline]
    pub fn has_magic(data: &[u8]) -> bool {
        data.len() >= MAGIC_RANGE.end && data[MAGIC_RANGE] == HEADER_MAGIC
    }

    pub fn serialize(&self) -> [u8; PREAMBLE_SIZE] {
        let mut buf = [0u8; PREAMBLE_SIZE];

        buf[MAGIC_RANGE].copy_from_slice(&HEADER_MAGIC);
        buf[VERSION_RANGE].copy_from_slice(&self.version.to_le_bytes());
        buf[TABLE_SIZE_RANGE].copy_from_slice(&self.table_size.to_le_bytes());
        buf[TABLE_CHECKSUM_RANGE].copy_from_slice(&self.checksum.to_le_bytes());
        buf[RESERVED_RANGE].copy_from_slice(&[0u8; 4]);

        buf
    }

    /// Parses a preamble. Returns `None` if `data` is too short or the magic
    /// does not match; version checks are left to the caller.
    pub fn deserialize(data: &[u8]) -> Option<Self> {
        if data.len() < PREAMBLE_SIZE || !Self::has_magic(data) {
            return None;
        }

        Some(Self {
            version: u32::from_le_bytes(read_array(data, VERSION_RANGE.start)),
            table_size: u64::from_le_bytes(read_array(data, TABLE_SIZE_RANGE.start)),
            checksum: u32::from_le_bytes(read_array(data, TABLE_CHECKSUM_RANGE.start)),
        })
    }
}

/// CRC32 over the encoded bucket table.
#[inline]
pub fn table_checksum(table_bytes: &[u8]) -> u32 {
    let mut hasher = Crc32FastHasher::new();
    hasher.update(table_bytes);
    hasher.finalize()
}

/// Encodes a complete header file (preamble included for the versioned layout).
pub fn encode_table(table: &[i64], layout: IndexLayout) -> Vec<u8> {
    let mut table_bytes = Vec::with_capacity(table.len() * OFFSET_SIZE);
    for &offset in table {
        table_bytes.extend_from_slice(&layout.encode_offset(offset));
    }

    match layout {
        IndexLayout::Legacy => table_bytes,
        IndexLayout::Versioned => {
            let preamble = TablePreamble::new(table.len() as u64, table_checksum(&table_bytes));
            let mut out = Vec::with_capacity(PREAMBLE_SIZE + table_bytes.len());
            out.extend_from_slice(&preamble.serialize());
            out.extend_from_slice(&table_bytes);
            out
        }
    }
}

/// Decodes `count` bucket entries from raw table bytes (preamble already stripped).
///
/// Returns `None` if fewer than `count` whole entries are present.
pub fn decode_table(table_bytes: &[u8], count: usize, layout: IndexLayout) -> Option<Vec<i64>> {
    let needed = count.checked_mul(OFFSET_SIZE)?;
    if table_bytes.len() < needed {
        return None;
    }

    Some(
        table_bytes[..needed]
            .chunks_exact(OFFSET_SIZE)
            .map(|chunk| layout.decode_offset(read_array(chunk, 0)))
            .collect(),
    )
}
