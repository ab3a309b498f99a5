use crate::index_engine::constants::*;
use crate::index_engine::digest::{VisitedOffsets, Xxh3BuildHasher};
use crate::index_engine::error::{IndexError, Result};
use checkout_index_format::{ChainNode, IndexLayout};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Read-only view over the collision-chain file.
///
/// The file is memory-mapped for the lifetime of one search. Every node read
/// is bounds-checked against the mapping, so a bad offset surfaces as
/// [`IndexError::CorruptIndex`] rather than a panic or a silent short read.
pub struct ChainStore {
    mmap: Mmap,
    layout: IndexLayout,
}

impl ChainStore {
    /// Maps the chain file read-only.
    ///
    /// # Returns:
    /// - `Err(IndexError::IndexUnavailable)` if the file cannot be opened or mapped.
    pub fn open(path: &Path, layout: IndexLayout) -> Result<Self> {
        let unavailable = |source| IndexError::IndexUnavailable {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(unavailable)?;

        // Index files are never written while a search engine is serving them.
        let mmap = unsafe { Mmap::map(&file) }.map_err(unavailable)?;

        Ok(Self { mmap, layout })
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.mmap.len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Number of whole nodes the file can hold.
    #[inline]
    pub fn node_capacity(&self) -> u64 {
        self.len() / CHAIN_NODE_SIZE as u64
    }

    /// Reads the fixed-size node starting at byte `offset`.
    ///
    /// # Returns:
    /// - `Ok(ChainNode)` if a whole node lies within the file.
    /// - `Err(IndexError::CorruptIndex)` for negative offsets or reads that
    ///   would run past the end of the file.
    pub fn read_node(&self, offset: i64) -> Result<ChainNode> {
        let start = usize::try_from(offset).map_err(|_| {
            IndexError::CorruptIndex(format!("negative chain node offset {offset}"))
        })?;

        let end = start
            .checked_add(CHAIN_NODE_SIZE)
            .filter(|&end| end <= self.mmap.len())
            .ok_or_else(|| {
                IndexError::CorruptIndex(format!(
                    "chain node at offset {offset} exceeds chain file of {} bytes",
                    self.mmap.len()
                ))
            })?;

        let mut raw = [0u8; CHAIN_NODE_SIZE];
        raw.copy_from_slice(&self.mmap[start..end]);
        Ok(ChainNode::deserialize(&raw, self.layout))
    }

    /// Walks the chain starting at `head`.
    ///
    /// # Parameters:
    /// - `head`: First node offset, as stored in the bucket table.
    /// - `max_nodes`: Optional hard limit on the number of nodes visited.
    pub fn walk(&self, head: i64, max_nodes: Option<u64>) -> ChainWalk<'_> {
        ChainWalk {
            store: self,
            cursor: head,
            visited: VisitedOffsets::with_hasher(Xxh3BuildHasher),
            max_nodes,
            halted: false,
        }
    }
}

/// Iterator over `(node_offset, node)` pairs of one bucket chain.
///
/// ## Behavior:
/// - **Starts at the bucket head** and follows `next_node_offset`.
/// - **Stops at the sentinel** (`-1`).
/// - **Never revisits an offset**: a cycle yields one `CorruptIndex` error
///   and ends the iteration.
/// - **Ends after the first error**, so callers can use `?` on each item.
pub struct ChainWalk<'a> {
    store: &'a ChainStore,
    cursor: i64,
    visited: VisitedOffsets,
    max_nodes: Option<u64>,
    halted: bool,
}

impl ChainWalk<'_> {
    /// Number of distinct nodes yielded so far.
    #[inline]
    pub fn nodes_visited(&self) -> usize {
        self.visited.len()
    }

    fn fail(&mut self, err: IndexError) -> Option<Result<(i64, ChainNode)>> {
        self.halted = true;
        Some(Err(err))
    }
}

impl Iterator for ChainWalk<'_> {
    type Item = Result<(i64, ChainNode)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted || self.cursor == SENTINEL_OFFSET {
            return None;
        }

        let offset = self.cursor;

        if let Some(limit) = self.max_nodes {
            if self.visited.len() as u64 >= limit {
                return self.fail(IndexError::CorruptIndex(format!(
                    "chain exceeds the limit of {limit} nodes"
                )));
            }
        }

        if !self.visited.insert(offset) {
            return self.fail(IndexError::CorruptIndex(format!(
                "chain cycles back to node offset {offset}"
            )));
        }

        match self.store.read_node(offset) {
            Ok(node) => {
                self.cursor = node.next_node_offset;
                Some(Ok((offset, node)))
            }
            Err(err) => self.fail(err),
        }
    }
}
