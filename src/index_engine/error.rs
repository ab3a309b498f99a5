use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, traversing or serving the index.
///
/// Only [`IndexError::Configuration`] is fatal to a serving process; every
/// other variant aborts the current query and leaves the server running.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Missing or malformed header/chain/dataset file at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An index file could not be opened for the current query.
    #[error("index unavailable ({path}): {source}")]
    IndexUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Short read, out-of-range offset or cycle while walking a chain.
    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    /// A dataset offset could not be read. Searches treat this as a non-match.
    #[error("record unreadable at offset {offset}")]
    RecordUnreadable {
        offset: i64,
        #[source]
        source: io::Error,
    },

    /// The result buffer could not grow to hold the response.
    #[error("result buffer could not grow to {requested} bytes")]
    AllocationFailure { requested: usize },

    /// Request or response I/O failed.
    #[error("transport error: {0}")]
    Transport(#[source] io::Error),
}

impl IndexError {
    /// Whether the error should stop a serving process.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
