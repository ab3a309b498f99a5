use checkout_index::constants::CSV_COLUMN_HEADER;
use checkout_index::{
    Exchange, ExchangeOutcome, IndexBuilder, IndexConfig, IndexLayout, RequestServer,
    SearchEngine, ShutdownFlag, TcpTransport, Transport, decode_response, found_header,
    tcp_round_trip,
};
use std::fs;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::tempdir;

const LINES: [&str; 3] = [
    "12345,BC001,BOOK,Main,QA1,07/04/2012 10:00:00",
    "555,BC002,DVD,Branch,PN2,01/02/2013 11:00:00",
    "12345,BC003,BOOK,Main,QA2,09/10/2013 12:00:00",
];

fn build_engine(dir: &Path) -> SearchEngine {
    let config = IndexConfig::in_dir(dir).with_table_size(64);
    fs::write(&config.dataset_path, LINES.join("\n") + "\n").expect("Failed to write dataset");
    IndexBuilder::new(64)
        .with_layout(IndexLayout::Versioned)
        .build(&config.dataset_path, &config.header_path, &config.chain_path)
        .expect("Failed to build index");
    SearchEngine::open(&config).expect("Failed to open search engine")
}

/// In-memory exchange used to drive the server without a socket.
struct ScriptedExchange {
    request: Option<Vec<u8>>,
    response: Vec<u8>,
    fail_write: bool,
}

impl Exchange for &mut ScriptedExchange {
    fn read_request(&mut self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.request.take())
    }

    fn write_response(&mut self, frame: &[u8]) -> io::Result<()> {
        if self.fail_write {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "client went away"));
        }
        self.response.extend_from_slice(frame);
        Ok(())
    }

    fn peer(&self) -> String {
        "scripted".to_string()
    }
}

#[test]
fn test_respond_frames_with_nul_terminator() {
    let dir = tempdir().expect("Failed to create temp dir");
    let server = RequestServer::new(build_engine(dir.path()), ShutdownFlag::new());

    let (frame, failed) = server.respond(b"555||\n");
    assert!(!failed);
    assert_eq!(frame.last(), Some(&0));
    assert_eq!(frame.iter().filter(|&&b| b == 0).count(), 1);

    let expected = format!("{}{}{}\n", found_header("555"), CSV_COLUMN_HEADER, LINES[1]);
    assert_eq!(decode_response(&frame), expected.as_bytes());
}

#[test]
fn test_malformed_filters_mean_no_filter() {
    let dir = tempdir().expect("Failed to create temp dir");
    let server = RequestServer::new(build_engine(dir.path()), ShutdownFlag::new());

    let (all, _) = server.respond(b"12345");
    for raw in [&b"12345|abc|xyz"[..], b"12345|-5|0", b"12345||", b"12345|0"] {
        let (frame, _) = server.respond(raw);
        assert_eq!(frame, all, "Request {:?}", String::from_utf8_lossy(raw));
    }

    let (frame, _) = server.respond(b"12345|2013|9");
    let text = String::from_utf8_lossy(decode_response(&frame)).into_owned();
    assert!(text.contains(LINES[2]));
    assert!(!text.contains(LINES[0]));
}

#[test]
fn test_handle_exchange_outcomes() {
    let dir = tempdir().expect("Failed to create temp dir");
    let server = RequestServer::new(build_engine(dir.path()), ShutdownFlag::new());

    let mut answered = ScriptedExchange {
        request: Some(b"999|2012|7".to_vec()),
        response: Vec::new(),
        fail_write: false,
    };
    let outcome = server.handle_exchange(&mut answered).expect("Exchange failed");
    assert_eq!(outcome, ExchangeOutcome::Answered { search_failed: false });
    assert_eq!(
        decode_response(&answered.response),
        "ID '999' no encontrado o no hay registros que coincidan con los filtros de fecha."
            .as_bytes()
    );

    let mut silent = ScriptedExchange {
        request: None,
        response: Vec::new(),
        fail_write: false,
    };
    let outcome = server.handle_exchange(&mut silent).expect("Exchange failed");
    assert_eq!(outcome, ExchangeOutcome::Abandoned);
    assert!(silent.response.is_empty());

    let mut broken = ScriptedExchange {
        request: Some(b"555".to_vec()),
        response: Vec::new(),
        fail_write: true,
    };
    assert!(server.handle_exchange(&mut broken).is_err());
}

#[test]
fn test_search_failure_is_reported_in_band() {
    let dir = tempdir().expect("Failed to create temp dir");
    let engine = build_engine(dir.path());
    let server = RequestServer::new(engine, ShutdownFlag::new());

    // Losing the chain file fails every search on an occupied bucket.
    fs::remove_file(dir.path().join("index.dat")).expect("Failed to remove chain");

    let (frame, failed) = server.respond(b"12345");
    assert!(failed);
    let text = String::from_utf8_lossy(decode_response(&frame)).into_owned();
    assert!(text.starts_with("Error: "), "Got {text:?}");
}

#[test]
fn test_tcp_serve_loop_answers_until_shutdown() {
    let dir = tempdir().expect("Failed to create temp dir");
    let shutdown = ShutdownFlag::new();
    let server = Arc::new(RequestServer::new(build_engine(dir.path()), shutdown.clone()));

    let mut transport = TcpTransport::bind("127.0.0.1:0", Some(Duration::from_secs(2)))
        .expect("Failed to bind");
    let addr = transport.local_addr().expect("No local address");
    assert!(transport.describe().starts_with("tcp://127.0.0.1:"));

    let serving = Arc::clone(&server);
    let handle = thread::spawn(move || serving.serve(&mut transport));

    let first = tcp_round_trip(addr, "12345|2012|7", Some(Duration::from_secs(5)))
        .expect("Round trip failed");
    let expected = format!("{}{}{}\n", found_header("12345"), CSV_COLUMN_HEADER, LINES[0]);
    assert_eq!(first, expected.as_bytes());

    // A newline-terminated request, read to EOF by hand.
    let mut stream = TcpStream::connect(addr).expect("Failed to connect");
    stream.write_all(b"nobody\n").expect("Failed to write");
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).expect("Failed to read");
    assert_eq!(raw, b"ID 'nobody' no encontrado\0");

    // A client that connects and leaves does not stop the loop.
    drop(TcpStream::connect(addr).expect("Failed to connect"));

    let again = tcp_round_trip(addr, "555", Some(Duration::from_secs(5))).expect("Round trip failed");
    assert!(again.starts_with(found_header("555").as_bytes()));

    shutdown.request();
    let summary = handle.join().expect("Server thread panicked");

    assert_eq!(summary.requests_served, 3);
    assert_eq!(summary.requests_failed, 0);
}

#[test]
fn test_oversized_request_is_abandoned() {
    let dir = tempdir().expect("Failed to create temp dir");
    let shutdown = ShutdownFlag::new();
    let server = Arc::new(RequestServer::new(build_engine(dir.path()), shutdown.clone()));

    let mut transport = TcpTransport::bind("127.0.0.1:0", Some(Duration::from_secs(2)))
        .expect("Failed to bind");
    let addr = transport.local_addr().expect("No local address");

    let serving = Arc::clone(&server);
    let handle = thread::spawn(move || serving.serve(&mut transport));

    let huge = "9".repeat(checkout_index::MAX_REQUEST_SIZE + 10);
    // The server drops the connection without a response.
    let result = tcp_round_trip(addr, &huge, Some(Duration::from_secs(5)));
    assert!(result.map(|payload| payload.is_empty()).unwrap_or(true));

    let after = tcp_round_trip(addr, "555", Some(Duration::from_secs(5))).expect("Round trip failed");
    assert!(!after.is_empty());

    shutdown.request();
    let summary = handle.join().expect("Server thread panicked");
    assert_eq!(summary.transport_errors, 1);
    assert_eq!(summary.requests_served, 1);
}

#[cfg(unix)]
#[test]
fn test_fifo_serve_loop() {
    use checkout_index::{FifoTransport, fifo_round_trip};

    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("frontend_input");
    let output = dir.path().join("frontend_output");

    let shutdown = ShutdownFlag::new();
    let server = Arc::new(RequestServer::new(build_engine(dir.path()), shutdown.clone()));
    let mut transport = FifoTransport::create(&input, &output).expect("Failed to create FIFOs");

    let serving = Arc::clone(&server);
    let handle = thread::spawn(move || serving.serve(&mut transport));

    let response = fifo_round_trip(&input, &output, "12345|2013|0").expect("Round trip failed");
    let expected = format!("{}{}{}\n", found_header("12345"), CSV_COLUMN_HEADER, LINES[2]);
    assert_eq!(response, expected.as_bytes());

    // No client is connected; the flag alone must stop the loop.
    shutdown.request();
    let summary = join_within(handle, Duration::from_secs(3));
    assert_eq!(summary.requests_served, 1);
    assert_eq!(summary.transport_errors, 0);
    assert!(!summary.transport_failed);
}

#[cfg(unix)]
#[test]
fn test_fifo_server_stops_when_request_pipe_is_removed() {
    use checkout_index::{FifoTransport, MAX_CONSECUTIVE_ACCEPT_FAILURES, fifo_round_trip};

    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("frontend_input");
    let output = dir.path().join("frontend_output");

    let server = Arc::new(RequestServer::new(build_engine(dir.path()), ShutdownFlag::new()));
    let mut transport = FifoTransport::create(&input, &output)
        .expect("Failed to create FIFOs")
        .with_response_timeout(Some(Duration::from_secs(2)));

    let serving = Arc::clone(&server);
    let handle = thread::spawn(move || serving.serve(&mut transport));

    let response = fifo_round_trip(&input, &output, "555").expect("Round trip failed");
    assert!(response.starts_with(found_header("555").as_bytes()));

    fs::remove_file(&input).expect("Failed to remove request FIFO");

    // Without a shutdown request, only the failure limit can end the loop.
    let summary = join_within(handle, Duration::from_secs(10));
    assert!(summary.transport_failed);
    assert_eq!(summary.requests_served, 1);
    assert_eq!(
        summary.transport_errors,
        u64::from(MAX_CONSECUTIVE_ACCEPT_FAILURES)
    );
}

/// Transport whose `accept` always fails, counting the attempts.
struct BrokenTransport {
    attempts: u32,
}

impl Transport for BrokenTransport {
    type Exchange = &'static mut ScriptedExchange;

    fn accept(&mut self) -> io::Result<Option<Self::Exchange>> {
        self.attempts += 1;
        Err(io::Error::other("too many open files"))
    }

    fn describe(&self) -> String {
        "broken".to_string()
    }
}

#[test]
fn test_repeated_accept_failures_back_off_then_stop() {
    use checkout_index::MAX_CONSECUTIVE_ACCEPT_FAILURES;

    let dir = tempdir().expect("Failed to create temp dir");
    let server = RequestServer::new(build_engine(dir.path()), ShutdownFlag::new());
    let mut transport = BrokenTransport { attempts: 0 };

    let started = Instant::now();
    let summary = server.serve(&mut transport);

    assert!(summary.transport_failed);
    assert_eq!(transport.attempts, MAX_CONSECUTIVE_ACCEPT_FAILURES);
    assert_eq!(
        summary.transport_errors,
        u64::from(MAX_CONSECUTIVE_ACCEPT_FAILURES)
    );
    // Retries sleep between attempts instead of spinning.
    assert!(started.elapsed() >= Duration::from_millis(100));
}

/// Joins a serving thread, failing the test if it is still running after
/// `limit`.
fn join_within<T>(handle: thread::JoinHandle<T>, limit: Duration) -> T {
    let deadline = Instant::now() + limit;
    while !handle.is_finished() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }
    assert!(handle.is_finished(), "Server still running after {limit:?}");
    handle.join().expect("Server thread panicked")
}

#[cfg(unix)]
#[test]
fn test_ensure_fifo_rejects_regular_files() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("not_a_pipe");
    fs::write(&path, b"plain").expect("Failed to write file");

    let err = checkout_index::ensure_fifo(&path).expect_err("Regular file accepted");
    assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);

    let pipe = dir.path().join("pipe");
    checkout_index::ensure_fifo(&pipe).expect("Failed to create FIFO");
    checkout_index::ensure_fifo(&pipe).expect("Existing FIFO rejected");
}
