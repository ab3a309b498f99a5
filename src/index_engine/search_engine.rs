use crate::index_engine::config::IndexConfig;
use crate::index_engine::constants::*;
use crate::index_engine::error::Result;
use crate::index_engine::{
    ChainStore, HashIndex, Query, RecordFields, RecordStore, ResultBuffer,
};
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Counters gathered while answering one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Chain nodes read.
    pub nodes_visited: u64,
    /// Dataset line reads issued (one per node).
    pub record_reads: u64,
    /// Candidates whose key differed from the query id.
    pub collisions: u64,
    /// Key matches excluded by the date filter or an unparsable date.
    pub date_rejections: u64,
    /// Candidates whose dataset offset yielded no line.
    pub unreadable_records: u64,
    pub elapsed_micros: u128,
}

/// Rendered answer to one query, ready to be framed and sent.
#[derive(Debug, Clone)]
pub struct ResultSet {
    payload: Vec<u8>,
    match_count: usize,
    stats: SearchStats,
}

impl ResultSet {
    /// `true` if at least one record passed every filter.
    #[inline]
    pub fn is_found(&self) -> bool {
        self.match_count > 0
    }

    #[inline]
    pub fn match_count(&self) -> usize {
        self.match_count
    }

    #[inline]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Response text, without any transport terminator.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    pub fn as_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

/// Header line emitted before the first matching record.
pub fn found_header(id: &str) -> String {
    format!("Registros encontrados para el ID '{id}':\n")
}

/// Message returned when no record passes the filters.
pub fn not_found_message(query: &Query) -> String {
    let mut message = format!("ID '{}' no encontrado", query.id);
    if query.has_date_filter() {
        message.push_str(" o no hay registros que coincidan con los filtros de fecha.");
    }
    message
}

/// Point-lookup engine over a header table, a chain file and a dataset.
///
/// The bucket table is loaded once and shared read-only (`Arc`), so one
/// engine can be cloned into any number of threads. Each search opens its
/// own chain mapping and dataset handle and releases them when it returns.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    index: Arc<HashIndex>,
    chain_path: PathBuf,
    dataset_path: PathBuf,
    max_chain_nodes: Option<u64>,
    max_response_size: Option<usize>,
}

impl SearchEngine {
    /// Verifies the configured files and loads the bucket table.
    ///
    /// # Returns:
    /// - `Err(IndexError::Configuration)` if any file is missing or the
    ///   header is malformed. This is the only fatal error for a server.
    pub fn open(config: &IndexConfig) -> Result<Self> {
        config.verify()?;
        let index = HashIndex::load(&config.header_path, config.table_size, config.header_format)?;
        Ok(Self::with_index(Arc::new(index), config))
    }

    /// Builds an engine around an already-loaded table.
    pub fn with_index(index: Arc<HashIndex>, config: &IndexConfig) -> Self {
        Self {
            index,
            chain_path: config.chain_path.clone(),
            dataset_path: config.dataset_path.clone(),
            max_chain_nodes: config.max_chain_nodes,
            max_response_size: config.max_response_size,
        }
    }

    #[inline]
    pub fn index(&self) -> &Arc<HashIndex> {
        &self.index
    }

    /// Answers one query.
    ///
    /// Walks the id's bucket chain, re-checks the key of every candidate
    /// record (bucket collisions are skipped), applies the year/month filter
    /// and appends each passing line verbatim. Results keep chain order.
    ///
    /// # Returns:
    /// - `Ok(ResultSet)`: Either the found block or the not-found message.
    /// - `Err(IndexError::IndexUnavailable | CorruptIndex | AllocationFailure)`:
    ///   The search was abandoned; no partial result is produced.
    pub fn search(&self, query: &Query) -> Result<ResultSet> {
        let started = Instant::now();
        let id = query.id.as_bytes();
        let mut stats = SearchStats::default();

        let Some(head) = self.index.lookup_bucket_head(id) else {
            debug!(id = %query.id, "Bucket is empty.");
            return self.not_found(query, stats, started);
        };

        let chain = ChainStore::open(&self.chain_path, self.index.layout())?;
        let mut records = RecordStore::open(&self.dataset_path)?;
        let mut buffer = ResultBuffer::with_limit(self.max_response_size);
        let mut match_count = 0usize;

        for step in chain.walk(head, self.max_chain_nodes) {
            let (node_offset, node) = step?;
            stats.nodes_visited += 1;

            let line = match records.read_line_at(node.data_offset) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!(node_offset, data_offset = node.data_offset, "No record at offset.");
                    stats.unreadable_records += 1;
                    continue;
                }
                Err(err) => {
                    debug!(node_offset, error = %err, "Skipping unreadable record.");
                    stats.unreadable_records += 1;
                    continue;
                }
            };

            let fields = RecordFields::split(&line);
            if !fields.key_matches(id) {
                stats.collisions += 1;
                continue;
            }

            let passes = fields
                .checkout_date()
                .is_some_and(|date| query.matches_date(&date));
            if !passes {
                stats.date_rejections += 1;
                continue;
            }

            if match_count == 0 {
                buffer.append_str(&found_header(&query.id))?;
                buffer.append_str(CSV_COLUMN_HEADER)?;
            }
            buffer.append(&line)?;
            buffer.append(b"\n")?;
            match_count += 1;
        }

        stats.record_reads = records.reads();

        if match_count == 0 {
            return self.not_found(query, stats, started);
        }

        stats.elapsed_micros = started.elapsed().as_micros();
        debug!(id = %query.id, matches = match_count, ?stats, "Search complete.");

        Ok(ResultSet {
            payload: buffer.into_bytes()?,
            match_count,
            stats,
        })
    }

    fn not_found(&self, query: &Query, mut stats: SearchStats, started: Instant) -> Result<ResultSet> {
        let mut buffer = ResultBuffer::with_limit(self.max_response_size);
        buffer.append_str(&not_found_message(query))?;
        stats.elapsed_micros = started.elapsed().as_micros();

        Ok(ResultSet {
            payload: buffer.into_bytes()?,
            match_count: 0,
            stats,
        })
    }

    /// Answers independent queries, in parallel when the `parallel` feature
    /// is enabled. Results are returned in query order.
    pub fn search_batch(&self, queries: &[Query]) -> Vec<Result<ResultSet>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            queries.par_iter().map(|query| self.search(query)).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            queries.iter().map(|query| self.search(query)).collect()
        }
    }
}
