use crate::constants::OFFSET_SIZE;
use std::fmt;
use std::str::FromStr;

/// Byte layout shared by a header file and the chain file it points into.
///
/// - `Legacy`: no preamble, offsets stored in **native** byte order. This is
///   the format of existing `header.dat`/`index.dat` files.
/// - `Versioned`: a [`crate::TablePreamble`] precedes the table, and every
///   offset (table and chain nodes) is **little-endian**.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexLayout {
    Legacy,
    Versioned,
}

impl IndexLayout {
    #[inline]
    pub fn encode_offset(self, offset: i64) -> [u8; OFFSET_SIZE] {
        match self {
            Self::Legacy => offset.to_ne_bytes(),
            Self::Versioned => offset.to_le_bytes(),
        }
    }

    #[inline]
    pub fn decode_offset(self, bytes: [u8; OFFSET_SIZE]) -> i64 {
        match self {
            Self::Legacy => i64::from_ne_bytes(bytes),
            Self::Versioned => i64::from_le_bytes(bytes),
        }
    }

    /// Number of bytes that precede the first bucket entry in a header file.
    #[inline]
    pub fn table_start(self) -> usize {
        match self {
            Self::Legacy => 0,
            Self::Versioned => crate::constants::PREAMBLE_SIZE,
        }
    }
}

impl fmt::Display for IndexLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => f.write_str("legacy"),
            Self::Versioned => f.write_str("versioned"),
        }
    }
}

impl FromStr for IndexLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "versioned" | "v1" => Ok(Self::Versioned),
            other => Err(format!("Unknown index layout: {other}")),
        }
    }
}

/// Copies `N` bytes starting at `start` into a fixed array.
///
/// Callers guarantee `data.len() >= start + N`.
#[inline]
pub(crate) fn read_array<const N: usize>(data: &[u8], start: usize) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(&data[start..start + N]);
    buf
}
