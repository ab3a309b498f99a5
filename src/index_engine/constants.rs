pub use checkout_index_format::constants::*;

/// Zero-based column holding the lookup key.
pub const KEY_FIELD_INDEX: usize = 0;

/// Zero-based column holding the `MM/DD/YYYY hh:mm:ss` checkout timestamp.
pub const DATE_FIELD_INDEX: usize = 5;

pub const FIELD_DELIMITER: u8 = b',';

/// Column header emitted ahead of the first matching record.
pub const CSV_COLUMN_HEADER: &str =
    "BibNumber,ItemBarcode,ItemType,Collection,CallNumber,CheckoutDateTime\n";

/// Initial line buffer for dataset reads; doubled until a full line fits.
pub const INITIAL_LINE_BUFFER_SIZE: usize = 256;

/// Initial response buffer capacity.
pub const INITIAL_RESULT_BUFFER_SIZE: usize = 4 * 1024; // 4 KB

/// Terminator byte appended to every response payload.
pub const RESPONSE_TERMINATOR: u8 = 0;

pub const DEFAULT_DATASET_PATH: &str = "Data2005.csv";
pub const DEFAULT_HEADER_PATH: &str = "header.dat";
pub const DEFAULT_CHAIN_PATH: &str = "index.dat";
