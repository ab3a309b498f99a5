mod request;
pub use request::{
    FrameScan, MAX_REQUEST_SIZE, REQUEST_DELIMITER, decode_response, encode_response,
    format_request, parse_request, read_frame, scan_frame_chunk,
};

mod transport;
pub use transport::{Exchange, Transport};

mod tcp_transport;
pub use tcp_transport::{TcpExchange, TcpTransport, tcp_round_trip};

#[cfg(unix)]
mod fifo_transport;
#[cfg(unix)]
pub use fifo_transport::{FifoExchange, FifoTransport, ensure_fifo, fifo_round_trip};

mod shutdown;
pub use shutdown::{ShutdownFlag, install_signal_handlers};

mod server_config;
pub use server_config::{ServerConfig, TransportKind};

mod server;
pub use server::{
    ExchangeOutcome, MAX_CONSECUTIVE_ACCEPT_FAILURES, RequestServer, ServeSummary, failure_message,
};

pub const DEFAULT_INPUT_PIPE: &str = "/tmp/frontend_input";
pub const DEFAULT_OUTPUT_PIPE: &str = "/tmp/frontend_output";
pub const DEFAULT_TCP_LISTEN: ([u8; 4], u16) = ([127, 0, 0, 1], 7000);
