use crate::cli::{Commands, HELP_TEMPLATE};
use checkout_index::index_engine::constants::*;
use checkout_index::{HeaderFormat, IndexConfig, parse_size};
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
   // Obtain during build time, not runtime
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None
)]
#[command(
    after_help = HELP_TEMPLATE.replace("%BINARY_NAME%", env!("CARGO_PKG_NAME"))
)]
pub struct Cli {
    #[command(flatten)]
    pub index: IndexArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Locations and limits of the index files, shared by every command.
#[derive(Args, Debug)]
pub struct IndexArgs {
    /// The CSV dataset being indexed.
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_DATASET_PATH)]
    pub dataset: PathBuf,

    /// The bucket table file.
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_HEADER_PATH)]
    pub header: PathBuf,

    /// The collision-chain file.
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_CHAIN_PATH)]
    pub chain: PathBuf,

    /// Bucket count. Versioned headers record their own and override this.
    #[arg(long, global = true, value_name = "N", default_value_t = DEFAULT_TABLE_SIZE)]
    pub table_size: usize,

    /// Header layout: `auto`, `legacy` or `versioned`.
    #[arg(long, global = true, value_name = "FORMAT", default_value = "auto")]
    pub header_format: HeaderFormat,

    /// Treat chains longer than this as corrupt.
    #[arg(long, global = true, value_name = "N")]
    pub max_chain_nodes: Option<u64>,

    /// Fail queries whose response would exceed this size (e.g. `64M`).
    #[arg(long, global = true, value_name = "SIZE", value_parser = parse_size)]
    pub max_response_size: Option<usize>,
}

impl IndexArgs {
    pub fn to_config(&self) -> IndexConfig {
        IndexConfig {
            dataset_path: self.dataset.clone(),
            header_path: self.header.clone(),
            chain_path: self.chain.clone(),
            table_size: self.table_size,
            header_format: self.header_format,
            max_chain_nodes: self.max_chain_nodes,
            max_response_size: self.max_response_size,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::try_parse().unwrap_or_else(|e| {
            // If it's a missing subcommand, show full help instead of short usage
            if e.kind() == ErrorKind::MissingSubcommand
                || e.kind() == ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                std::process::exit(1);
            } else {
                e.exit(); // All other errors remain unchanged
            }
        })
    }
}
