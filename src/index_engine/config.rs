use crate::index_engine::constants::*;
use crate::index_engine::error::{IndexError, Result};
use crate::utils::verify_file_existence;
use checkout_index_format::{IndexLayout, TablePreamble};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How the header file's layout is determined at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderFormat {
    /// Versioned if the file starts with the header magic, legacy otherwise.
    #[default]
    Auto,
    /// Force a specific layout.
    Fixed(IndexLayout),
}

impl HeaderFormat {
    /// Picks the layout for a header file whose leading bytes are `header_bytes`.
    pub fn resolve(self, header_bytes: &[u8]) -> IndexLayout {
        match self {
            Self::Auto if TablePreamble::has_magic(header_bytes) => IndexLayout::Versioned,
            Self::Auto => IndexLayout::Legacy,
            Self::Fixed(layout) => layout,
        }
    }
}

impl fmt::Display for HeaderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Fixed(layout) => layout.fmt(f),
        }
    }
}

impl FromStr for HeaderFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        s.parse::<IndexLayout>().map(Self::Fixed)
    }
}

/// Startup configuration for the search engine.
///
/// Defaults reproduce the file names and table size the legacy indexer was
/// compiled with, so an existing `header.dat`/`index.dat` pair next to
/// `Data2005.csv` works unchanged.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub dataset_path: PathBuf,
    pub header_path: PathBuf,
    pub chain_path: PathBuf,
    pub table_size: usize,
    pub header_format: HeaderFormat,
    /// Abort a traversal as corrupt after this many nodes.
    pub max_chain_nodes: Option<u64>,
    /// Fail a query whose response would exceed this many bytes.
    pub max_response_size: Option<usize>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            header_path: PathBuf::from(DEFAULT_HEADER_PATH),
            chain_path: PathBuf::from(DEFAULT_CHAIN_PATH),
            table_size: DEFAULT_TABLE_SIZE,
            header_format: HeaderFormat::Auto,
            max_chain_nodes: None,
            max_response_size: None,
        }
    }
}

impl IndexConfig {
    /// Default file names resolved inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            dataset_path: dir.join(DEFAULT_DATASET_PATH),
            header_path: dir.join(DEFAULT_HEADER_PATH),
            chain_path: dir.join(DEFAULT_CHAIN_PATH),
            ..Self::default()
        }
    }

    pub fn with_table_size(mut self, table_size: usize) -> Self {
        self.table_size = table_size;
        self
    }

    /// Checks that the header, chain and dataset files exist.
    pub fn verify(&self) -> Result<()> {
        if self.table_size == 0 {
            return Err(IndexError::Configuration(
                "table size must be greater than zero".to_string(),
            ));
        }

        verify_file_existence("header file", &self.header_path)?;
        verify_file_existence("chain file", &self.chain_path)?;
        verify_file_existence("dataset file", &self.dataset_path)?;
        Ok(())
    }
}
