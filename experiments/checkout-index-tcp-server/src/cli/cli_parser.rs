use crate::cli::HELP_TEMPLATE;
use checkout_index::constants::DEFAULT_TABLE_SIZE;
use checkout_index::parse_size;
use clap::CommandFactory;
use clap::Parser;
use clap::error::ErrorKind;
use std::net::SocketAddr;
use std::path::PathBuf;

/// CLI for starting the Checkout Index TCP server
#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None,
    after_help = HELP_TEMPLATE.replace("%BINARY_NAME%", env!("CARGO_PKG_NAME"))
)]
pub struct Cli {
    /// Directory holding `Data2005.csv`, `header.dat` and `index.dat`.
    #[arg(
        value_name = "index_dir",
        help = "Directory containing the dataset and its header/chain files."
    )]
    pub index_dir: PathBuf,

    /// Address to bind the server to. Defaults to 127.0.0.1 with a random port.
    #[arg(
        long,
        value_name = "ADDR",
        default_value = "127.0.0.1:0",
        help = "Socket address to listen on, e.g. 127.0.0.1:7000"
    )]
    pub listen: SocketAddr,

    /// Bucket count for legacy (headerless) index files.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_TABLE_SIZE)]
    pub table_size: usize,

    /// Fail queries whose response would exceed this size.
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_response_size: Option<usize>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::try_parse().unwrap_or_else(|e| {
            // If it's a missing argument error, show full help instead of short usage
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let mut cmd = Cli::command().override_usage("<index_dir> [OPTIONS]");
                let _ = cmd.print_help();
                println!();
                std::process::exit(1);
            } else {
                e.exit(); // All other errors remain unchanged
            }
        })
    }
}
