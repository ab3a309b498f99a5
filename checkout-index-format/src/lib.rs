pub mod constants;

pub mod index_layout;
pub use index_layout::*;

pub mod chain_node;
pub use chain_node::*;

pub mod table_header;
pub use table_header::*;
