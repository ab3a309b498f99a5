use crate::constants::*;
use crate::index_layout::{IndexLayout, read_array};

/// One link of a bucket's collision chain.
///
/// ## Chain File Layout
///
/// The chain file is a flat array of fixed-size nodes. Nodes are addressed by
/// **absolute byte offset**, both from the header table and from each other.
///
/// - **Offset `N` → `N + 8`**: **Data Offset** (byte offset of a candidate line in the dataset)
/// - **Offset `N + 8` → `N + 16`**: **Next Node Offset** (next node in the bucket, or `-1`)
///
/// **Total Size**: `16` bytes per node.
///
/// ## Notes
/// - Nodes of one bucket are linked but need not be contiguous or ordered.
/// - A node only says a record *might* carry the key; readers must re-check
///   the key against the record itself.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainNode {
    pub data_offset: i64,      // 8 bytes (record start in the dataset)
    pub next_node_offset: i64, // 8 bytes (next node, or SENTINEL_OFFSET)
}

impl ChainNode {
    pub fn new(data_offset: i64, next_node_offset: i64) -> Self {
        Self {
            data_offset,
            next_node_offset,
        }
    }

    /// Whether this node terminates its chain.
    #[inline]
    pub fn is_last(&self) -> bool {
        self.next_node_offset == SENTINEL_OFFSET
    }

    /// Serializes the node into its fixed 16-byte on-disk form.
    #[inline]
    pub fn serialize(&self, layout: IndexLayout) -> [u8; CHAIN_NODE_SIZE] {
        let mut buf = [0u8; CHAIN_NODE_SIZE];

        buf[DATA_OFFSET_RANGE].copy_from_slice(&layout.encode_offset(self.data_offset));
        buf[NEXT_NODE_OFFSET_RANGE].copy_from_slice(&layout.encode_offset(self.next_node_offset));

        buf
    }

    /// Reconstructs a node from exactly [`CHAIN_NODE_SIZE`] bytes.
    #[inline]
    pub fn deserialize(data: &[u8; CHAIN_NODE_SIZE], layout: IndexLayout) -> Self {
        Self {
            data_offset: layout.decode_offset(read_array(data, DATA_OFFSET_RANGE.start)),
            next_node_offset: layout.decode_offset(read_array(data, NEXT_NODE_OFFSET_RANGE.start)),
        }
    }
}
