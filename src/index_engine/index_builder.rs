use crate::index_engine::constants::*;
use crate::index_engine::digest::bucket_for;
use crate::index_engine::error::{IndexError, Result};
use crate::index_engine::RecordFields;
use checkout_index_format::{ChainNode, IndexLayout, encode_table};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Dataset read buffer.
const BUILD_READ_BUFFER_SIZE: usize = 64 * 1024; // 64 KB

/// Summary of one index build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub records_indexed: u64,
    pub lines_skipped: u64,
    pub occupied_buckets: usize,
    pub longest_chain: u32,
    pub header_bytes: u64,
    pub chain_bytes: u64,
}

/// Produces the header/chain file pair a [`crate::SearchEngine`] reads.
///
/// The dataset is scanned once. Each non-empty line gets one chain node,
/// written sequentially to the chain file and *prepended* to its bucket:
/// `node.next = table[h]; table[h] = node_offset`. Chains therefore list a
/// bucket's records from the last line of the dataset back to the first.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    table_size: usize,
    layout: IndexLayout,
    skip_header_row: bool,
}

impl IndexBuilder {
    pub fn new(table_size: usize) -> Self {
        Self {
            table_size,
            layout: IndexLayout::Versioned,
            skip_header_row: false,
        }
    }

    pub fn with_layout(mut self, layout: IndexLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Leaves the first line (the CSV column header) out of the index.
    pub fn skip_header_row(mut self, skip: bool) -> Self {
        self.skip_header_row = skip;
        self
    }

    /// Indexes `dataset`, writing `header` and `chain`.
    ///
    /// # Returns:
    /// - `Ok(BuildReport)` once both files are flushed to disk.
    /// - `Err(IndexError::Configuration)` for a zero table size.
    /// - `Err(IndexError::IndexUnavailable)` if any file cannot be read or written.
    pub fn build(&self, dataset: &Path, header: &Path, chain: &Path) -> Result<BuildReport> {
        if self.table_size == 0 {
            return Err(IndexError::Configuration(
                "table size must be greater than zero".to_string(),
            ));
        }

        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| IndexError::IndexUnavailable { path, source }
        };

        let input = File::open(dataset).map_err(io_err(dataset))?;
        let mut reader = BufReader::with_capacity(BUILD_READ_BUFFER_SIZE, input);
        let mut chain_writer = BufWriter::new(File::create(chain).map_err(io_err(chain))?);

        let mut table = vec![SENTINEL_OFFSET; self.table_size];
        let mut chain_lengths = vec![0u32; self.table_size];
        let mut report = BuildReport::default();

        let mut line = Vec::new();
        let mut line_start: u64 = 0;
        let mut line_number: u64 = 0;

        loop {
            line.clear();
            let read = reader
                .read_until(b'\n', &mut line)
                .map_err(io_err(dataset))?;
            if read == 0 {
                break;
            }

            let offset = line_start;
            line_start += read as u64;
            line_number += 1;

            let content = line.strip_suffix(b"\n").unwrap_or(&line);
            let is_blank = content.is_empty() || content == b"\r";
            if is_blank || (self.skip_header_row && line_number == 1) {
                report.lines_skipped += 1;
                continue;
            }

            let key = RecordFields::split(content).key().unwrap_or_default();
            let bucket = bucket_for(key, self.table_size);

            let node_offset = report.chain_bytes as i64;
            let node = ChainNode::new(offset as i64, table[bucket]);
            chain_writer
                .write_all(&node.serialize(self.layout))
                .map_err(io_err(chain))?;

            table[bucket] = node_offset;
            chain_lengths[bucket] += 1;
            report.chain_bytes += CHAIN_NODE_SIZE as u64;
            report.records_indexed += 1;
        }

        chain_writer.flush().map_err(io_err(chain))?;
        chain_writer
            .get_ref()
            .sync_all()
            .map_err(io_err(chain))?;
        drop(chain_writer);

        let header_bytes = encode_table(&table, self.layout);
        let mut header_file = File::create(header).map_err(io_err(header))?;
        header_file
            .write_all(&header_bytes)
            .map_err(io_err(header))?;
        header_file.sync_all().map_err(io_err(header))?;

        report.header_bytes = header_bytes.len() as u64;
        report.occupied_buckets = chain_lengths.iter().filter(|&&len| len > 0).count();
        report.longest_chain = chain_lengths.iter().copied().max().unwrap_or(0);

        debug!(?report, "Index build finished.");
        info!(
            dataset = %dataset.display(),
            layout = %self.layout,
            records = report.records_indexed,
            buckets = report.occupied_buckets,
            "Index written."
        );

        Ok(report)
    }
}
