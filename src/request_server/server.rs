use crate::index_engine::{IndexError, Query, SearchEngine};
use crate::request_server::request::{encode_response, parse_request};
use crate::request_server::shutdown::ShutdownFlag;
use crate::request_server::transport::{Exchange, Transport};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Consecutive accept failures after which `serve` gives up on the transport.
pub const MAX_CONSECUTIVE_ACCEPT_FAILURES: u32 = 8;

const ACCEPT_BACKOFF_START: Duration = Duration::from_millis(10);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Counters for one `serve` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeSummary {
    pub requests_served: u64,
    pub requests_failed: u64,
    pub transport_errors: u64,
    /// `true` if the loop stopped because `accept` kept failing.
    pub transport_failed: bool,
}

/// Outcome of handling one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// A response (found, not-found or error message) was delivered.
    Answered { search_failed: bool },
    /// The client disconnected without sending a request.
    Abandoned,
}

/// Renders a per-query failure as the plain-text message sent back on the
/// response channel. Clients tell it apart from results by content alone.
pub fn failure_message(err: &IndexError) -> String {
    format!("Error: no se pudo completar la búsqueda ({err})")
}

/// Sequential request loop: `WAIT_REQUEST → PARSE → SEARCH → SEND_RESPONSE`.
///
/// Exactly one request is in flight at a time. Query failures are answered
/// with an error message and never stop the loop; transport failures abandon
/// the current client only.
pub struct RequestServer {
    engine: SearchEngine,
    shutdown: ShutdownFlag,
}

impl RequestServer {
    pub fn new(engine: SearchEngine, shutdown: ShutdownFlag) -> Self {
        Self { engine, shutdown }
    }

    #[inline]
    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    #[inline]
    pub fn shutdown_flag(&self) -> &ShutdownFlag {
        &self.shutdown
    }

    /// Parses a raw request, runs the search and returns the terminated
    /// response frame, along with whether the search itself failed.
    pub fn respond(&self, raw_request: &[u8]) -> (Vec<u8>, bool) {
        let query = parse_request(raw_request);
        let (payload, failed) = self.answer(&query);
        (encode_response(&payload), failed)
    }

    fn answer(&self, query: &Query) -> (Vec<u8>, bool) {
        let started = Instant::now();

        match self.engine.search(query) {
            Ok(result) => {
                info!(
                    id = %query.id,
                    year = query.year,
                    month = query.month,
                    matches = result.match_count(),
                    nodes = result.stats().nodes_visited,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Request served."
                );
                (result.into_payload(), false)
            }
            Err(err) => {
                warn!(id = %query.id, error = %err, "Search aborted.");
                (failure_message(&err).into_bytes(), true)
            }
        }
    }

    /// Runs one exchange to completion. The exchange (and every handle it
    /// owns) is released when this returns, on every path.
    pub fn handle_exchange<E: Exchange>(&self, mut exchange: E) -> Result<ExchangeOutcome, IndexError> {
        let Some(raw) = exchange.read_request().map_err(IndexError::Transport)? else {
            return Ok(ExchangeOutcome::Abandoned);
        };

        let (frame, search_failed) = self.respond(&raw);

        exchange
            .write_response(&frame)
            .map_err(IndexError::Transport)?;

        Ok(ExchangeOutcome::Answered { search_failed })
    }

    /// Serves requests until the shutdown flag is raised.
    ///
    /// Failed accepts are retried with an exponential backoff. After
    /// [`MAX_CONSECUTIVE_ACCEPT_FAILURES`] in a row the loop stops and sets
    /// [`ServeSummary::transport_failed`].
    pub fn serve<T: Transport>(&self, transport: &mut T) -> ServeSummary {
        let mut summary = ServeSummary::default();
        let mut consecutive_failures = 0u32;
        let mut backoff = ACCEPT_BACKOFF_START;
        info!(transport = %transport.describe(), "Request server started.");

        while !self.shutdown.is_requested() {
            let accepted = transport.accept();
            if accepted.is_ok() {
                consecutive_failures = 0;
                backoff = ACCEPT_BACKOFF_START;
            }

            let exchange = match accepted {
                Ok(Some(exchange)) => exchange,
                Ok(None) => continue,
                Err(err) => {
                    summary.transport_errors += 1;
                    consecutive_failures += 1;

                    if consecutive_failures >= MAX_CONSECUTIVE_ACCEPT_FAILURES {
                        error!(
                            error = %err,
                            failures = consecutive_failures,
                            "Transport keeps failing; stopping."
                        );
                        summary.transport_failed = true;
                        break;
                    }

                    warn!(
                        error = %err,
                        retry_in_ms = backoff.as_millis() as u64,
                        "Accept failed."
                    );
                    thread::sleep(backoff);
                    backoff = (backoff * 2).min(ACCEPT_BACKOFF_MAX);
                    continue;
                }
            };

            let peer = exchange.peer();
            match self.handle_exchange(exchange) {
                Ok(ExchangeOutcome::Answered { search_failed }) => {
                    summary.requests_served += 1;
                    if search_failed {
                        summary.requests_failed += 1;
                    }
                }
                Ok(ExchangeOutcome::Abandoned) => {
                    warn!(%peer, "Client disconnected before sending a request.");
                }
                Err(err) => {
                    warn!(%peer, error = %err, "Request abandoned.");
                    summary.transport_errors += 1;
                }
            }
        }

        info!(?summary, "Request server stopped.");
        summary
    }
}
