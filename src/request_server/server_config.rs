use crate::request_server::DEFAULT_TCP_LISTEN;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which transport binding the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    #[default]
    Tcp,
    Fifo,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("tcp"),
            Self::Fifo => f.write_str("fifo"),
        }
    }
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "fifo" | "pipe" => Ok(Self::Fifo),
            other => Err(format!("Unknown transport: {other} (expected tcp or fifo)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub transport: TransportKind,
    pub listen: SocketAddr,
    pub input_pipe: PathBuf,
    pub output_pipe: PathBuf,
    /// Per-connection read timeout for TCP clients. FIFO clients get the same
    /// bound for opening the response pipe.
    pub read_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::Tcp,
            listen: SocketAddr::from(DEFAULT_TCP_LISTEN),
            input_pipe: PathBuf::from(crate::request_server::DEFAULT_INPUT_PIPE),
            output_pipe: PathBuf::from(crate::request_server::DEFAULT_OUTPUT_PIPE),
            read_timeout: Some(Duration::from_secs(5)),
        }
    }
}
