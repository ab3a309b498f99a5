mod djb2;
pub use djb2::*;

mod xxh3_build_hasher;
pub use xxh3_build_hasher::*;
