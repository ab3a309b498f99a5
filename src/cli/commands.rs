use checkout_index::{IndexLayout, TransportKind};
use clap::Subcommand;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve `id|year|month` requests until interrupted
    Serve {
        /// Transport binding: `tcp` or `fifo`
        #[arg(long, value_name = "KIND", default_value = "tcp")]
        transport: TransportKind,

        /// Socket address to listen on (tcp transport)
        #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:7000")]
        listen: SocketAddr,

        /// Request pipe the client writes to (fifo transport)
        #[arg(long, value_name = "PATH", default_value = checkout_index::DEFAULT_INPUT_PIPE)]
        input_pipe: PathBuf,

        /// Response pipe the client reads from (fifo transport)
        #[arg(long, value_name = "PATH", default_value = checkout_index::DEFAULT_OUTPUT_PIPE)]
        output_pipe: PathBuf,

        /// Per-connection read timeout in milliseconds; 0 disables it (tcp transport)
        #[arg(long, value_name = "MS", default_value_t = 5000)]
        read_timeout_ms: u64,
    },

    /// Run a single lookup and print the response
    Search {
        /// The record id (first CSV column)
        id: String,

        /// Only records checked out in this year
        #[arg(short = 'y', long)]
        year: Option<u32>,

        /// Only records checked out in this month (1-12)
        #[arg(short = 'm', long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
    },

    /// Build the header and chain files from the dataset
    Build {
        /// Do not index the first line (the CSV column header)
        #[arg(long)]
        skip_header: bool,

        /// On-disk layout to write: `versioned` or `legacy`
        #[arg(long, value_name = "LAYOUT", default_value = "versioned")]
        format: IndexLayout,
    },

    /// Show the state of the index files
    Info,

    /// Send one request to a running server and print its response
    Query {
        /// The record id (first CSV column)
        id: String,

        /// Only records checked out in this year
        #[arg(short = 'y', long)]
        year: Option<u32>,

        /// Only records checked out in this month (1-12)
        #[arg(short = 'm', long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        /// Transport the server is listening on: `tcp` or `fifo`
        #[arg(long, value_name = "KIND", default_value = "tcp")]
        transport: TransportKind,

        /// Server address (tcp transport)
        #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:7000")]
        server: SocketAddr,

        /// Request pipe (fifo transport)
        #[arg(long, value_name = "PATH", default_value = checkout_index::DEFAULT_INPUT_PIPE)]
        input_pipe: PathBuf,

        /// Response pipe (fifo transport)
        #[arg(long, value_name = "PATH", default_value = checkout_index::DEFAULT_OUTPUT_PIPE)]
        output_pipe: PathBuf,
    },
}
