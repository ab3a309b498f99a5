//! In-memory bucket table (bucket → first chain node offset)
//! – `table_size` signed 64-bit slots, `-1` marks an empty bucket
//! – loaded once, never mutated, safe to share across threads

use crate::index_engine::config::HeaderFormat;
use crate::index_engine::constants::*;
use crate::index_engine::digest::bucket_for;
use crate::index_engine::error::{IndexError, Result};
use checkout_index_format::{IndexLayout, TablePreamble, decode_table, table_checksum};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct HashIndex {
    table: Box<[i64]>,
    layout: IndexLayout,
}

impl HashIndex {
    /// Loads the bucket table from a header file.
    ///
    /// # Parameters:
    /// - `path`: The header file.
    /// - `table_size`: Expected bucket count. Authoritative for legacy files;
    ///   versioned files carry their own size, and a mismatch is only logged.
    /// - `format`: Layout selection (see [`HeaderFormat`]).
    ///
    /// # Returns:
    /// - `Ok(HashIndex)` with every bucket loaded.
    /// - `Err(IndexError::Configuration)` if the file is missing, shorter than
    ///   the table, carries an unknown version, or fails its checksum.
    pub fn load(path: &Path, table_size: usize, format: HeaderFormat) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|err| {
            IndexError::Configuration(format!(
                "header file '{}' cannot be read: {err}",
                path.display()
            ))
        })?;

        let layout = format.resolve(&bytes);
        let index = match layout {
            IndexLayout::Legacy => Self::decode_legacy(&bytes, table_size)?,
            IndexLayout::Versioned => Self::decode_versioned(&bytes, table_size)?,
        };

        info!(
            header = %path.display(),
            layout = %index.layout,
            table_size = index.table_size(),
            occupied = index.occupied_buckets(),
            "Hash index loaded."
        );

        Ok(index)
    }

    fn decode_legacy(bytes: &[u8], table_size: usize) -> Result<Self> {
        if table_size == 0 {
            return Err(IndexError::Configuration(
                "table size must be greater than zero".to_string(),
            ));
        }

        let table = decode_table(bytes, table_size, IndexLayout::Legacy).ok_or_else(|| {
            IndexError::Configuration(format!(
                "header holds {} bytes, expected at least {} for {} buckets",
                bytes.len(),
                table_size.saturating_mul(OFFSET_SIZE),
                table_size
            ))
        })?;

        let trailing = bytes.len() - table_size * OFFSET_SIZE;
        if trailing > 0 {
            debug!(trailing, "Ignoring trailing bytes after legacy header table.");
        }

        Ok(Self::from_table(table, IndexLayout::Legacy))
    }

    fn decode_versioned(bytes: &[u8], table_size: usize) -> Result<Self> {
        let preamble = TablePreamble::deserialize(bytes).ok_or_else(|| {
            IndexError::Configuration("header is missing the versioned preamble".to_string())
        })?;

        if preamble.version != HEADER_VERSION {
            return Err(IndexError::Configuration(format!(
                "unsupported header version {} (expected {})",
                preamble.version, HEADER_VERSION
            )));
        }

        let stored_size = usize::try_from(preamble.table_size)
            .ok()
            .filter(|&size| size > 0)
            .ok_or_else(|| {
                IndexError::Configuration(format!(
                    "header declares an invalid table size of {}",
                    preamble.table_size
                ))
            })?;

        if stored_size != table_size {
            warn!(
                configured = table_size,
                stored = stored_size,
                "Configured table size differs from the header; using the header's."
            );
        }

        let table_bytes = &bytes[IndexLayout::Versioned.table_start()..];
        let table = decode_table(table_bytes, stored_size, IndexLayout::Versioned).ok_or_else(
            || {
                IndexError::Configuration(format!(
                    "header table truncated: {} bytes for {} buckets",
                    table_bytes.len(),
                    stored_size
                ))
            },
        )?;

        let checksum = table_checksum(&table_bytes[..stored_size * OFFSET_SIZE]);
        if checksum != preamble.checksum {
            return Err(IndexError::Configuration(format!(
                "header checksum mismatch (stored {:#010x}, computed {:#010x})",
                preamble.checksum, checksum
            )));
        }

        Ok(Self::from_table(table, IndexLayout::Versioned))
    }

    /// Wraps an already-decoded table.
    pub fn from_table(table: Vec<i64>, layout: IndexLayout) -> Self {
        Self {
            table: table.into_boxed_slice(),
            layout,
        }
    }

    /// Resolves the chain head for `id`.
    ///
    /// Returns `None` when the bucket holds the sentinel, meaning no record in
    /// the dataset hashes there.
    #[inline]
    pub fn lookup_bucket_head(&self, id: &[u8]) -> Option<i64> {
        let head = self.bucket_head(bucket_for(id, self.table.len()));
        (head != SENTINEL_OFFSET).then_some(head)
    }

    /// Raw table entry for `bucket` (`-1` when empty).
    #[inline]
    pub fn bucket_head(&self, bucket: usize) -> i64 {
        self.table[bucket]
    }

    #[inline]
    pub fn bucket_of(&self, id: &[u8]) -> usize {
        bucket_for(id, self.table.len())
    }

    #[inline]
    pub fn table_size(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn layout(&self) -> IndexLayout {
        self.layout
    }

    pub fn occupied_buckets(&self) -> usize {
        self.table
            .iter()
            .filter(|&&head| head != SENTINEL_OFFSET)
            .count()
    }
}
