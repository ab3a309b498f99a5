use std::ops::Range;

/// Offset value meaning "no node": an empty bucket or the end of a chain.
pub const SENTINEL_OFFSET: i64 = -1;

/// Bucket count used by the legacy index files.
pub const DEFAULT_TABLE_SIZE: usize = 65536;

/// Every persisted offset is a signed 64-bit integer.
pub const OFFSET_SIZE: usize = 8;

// Chain node structure (fixed 16 bytes, addressed by absolute byte offset)
pub const CHAIN_NODE_SIZE: usize = 16;

pub const DATA_OFFSET_RANGE: Range<usize> = 0..8;
pub const NEXT_NODE_OFFSET_RANGE: Range<usize> = 8..16;

// Versioned header preamble (fixed 24 bytes ahead of the bucket table)
pub const PREAMBLE_SIZE: usize = 24;

pub const HEADER_MAGIC: [u8; 4] = *b"CKIX";
pub const HEADER_VERSION: u32 = 1;

pub const MAGIC_RANGE: Range<usize> = 0..4;
pub const VERSION_RANGE: Range<usize> = 4..8;
pub const TABLE_SIZE_RANGE: Range<usize> = 8..16;
pub const TABLE_CHECKSUM_RANGE: Range<usize> = 16..20;
pub const RESERVED_RANGE: Range<usize> = 20..24;
