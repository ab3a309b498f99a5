pub mod constants;

mod error;
pub use error::{IndexError, Result};

mod config;
pub use config::{HeaderFormat, IndexConfig};

pub mod digest;

mod hash_index;
pub use hash_index::HashIndex;

mod chain_store;
pub use chain_store::{ChainStore, ChainWalk};

mod record_store;
pub use record_store::RecordStore;

mod record_fields;
pub use record_fields::{CheckoutDate, RecordFields};

mod query;
pub use query::Query;

mod result_buffer;
pub use result_buffer::ResultBuffer;

mod search_engine;
pub use search_engine::{ResultSet, SearchEngine, SearchStats, found_header, not_found_message};

mod index_builder;
pub use index_builder::{BuildReport, IndexBuilder};
