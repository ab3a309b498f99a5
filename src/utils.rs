mod format_bytes;
pub use format_bytes::format_bytes;

mod parse_leading_int;
pub use parse_leading_int::{parse_int_lenient, scan_leading_int};

mod parse_size;
pub use parse_size::parse_size;

mod verify_file_existence;
pub use verify_file_existence::verify_file_existence;
