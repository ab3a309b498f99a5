mod cli;
use crate::cli::{Cli, execute_command};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Cli::parse_args();

    // Logs go to stderr so `search` output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    execute_command(&args);
}
