//! # Checkout Index
//!
//! Point lookups over a large, append-only CSV of library checkouts without
//! scanning the file per query.
//!
//! ## On-disk pieces
//!
//! - **Header file**: a fixed-size table of bucket heads. `djb2(id) % N`
//!   selects a bucket; the entry is the byte offset of the first chain node,
//!   or `-1` when no record hashes there.
//! - **Chain file**: fixed 16-byte nodes `(data_offset, next_node_offset)`
//!   linking every dataset line of a bucket.
//! - **Dataset**: the CSV itself. Field 0 is the key, field 5 the
//!   `MM/DD/YYYY hh:mm:ss` checkout timestamp.
//!
//! ## Lookup
//!
//! [`SearchEngine::search`] resolves the bucket, walks its chain, re-checks
//! each candidate's key (bucket collisions are expected), filters by
//! year/month and copies matching lines verbatim into the response.
//!
//! ## Serving
//!
//! [`RequestServer`] reads `id|year|month` requests from a pluggable
//! [`Transport`] (TCP or a named-pipe pair) and answers one at a time.
//!
//! ```no_run
//! use checkout_index::{IndexConfig, Query, SearchEngine};
//!
//! let engine = SearchEngine::open(&IndexConfig::default()).expect("index should load");
//! let result = engine.search(&Query::new("12345", 2012, 7)).expect("search should run");
//! println!("{}", result.as_text());
//! ```

pub mod index_engine;
pub use index_engine::*;

pub mod request_server;
pub use request_server::*;

pub mod utils;
pub use utils::*;

pub use checkout_index_format::{ChainNode, IndexLayout};
