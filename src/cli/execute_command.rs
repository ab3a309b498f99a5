use crate::cli::{Cli, Commands};
use checkout_index::{
    HashIndex, IndexBuilder, IndexConfig, IndexError, Query, RequestServer, SearchEngine,
    ServerConfig, ShutdownFlag, TcpTransport, TransportKind, format_bytes, format_request,
    install_signal_handlers, tcp_round_trip,
};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

/// Executes the parsed command line.
///
/// Every command resolves the index files from the global
/// [`IndexArgs`](crate::cli::IndexArgs). Failures are reported on stderr and end the
/// process with a non-zero status; `search` also exits with `1` when
/// nothing matched, so scripts can branch on the outcome, and with `2` when
/// the search or writing its output fails.
pub fn execute_command(cli: &Cli) {
    let config = cli.index.to_config();

    match &cli.command {
        Commands::Serve {
            transport,
            listen,
            input_pipe,
            output_pipe,
            read_timeout_ms,
        } => {
            let server_config = ServerConfig {
                transport: *transport,
                listen: *listen,
                input_pipe: input_pipe.clone(),
                output_pipe: output_pipe.clone(),
                read_timeout: (*read_timeout_ms > 0).then(|| Duration::from_millis(*read_timeout_ms)),
            };

            if let Err(err) = serve(&config, &server_config) {
                error!(error = %err, "Server failed.");
                eprintln!("Error: {err}");
                std::process::exit(1);
            }
        }

        Commands::Search { id, year, month } => {
            let engine = open_engine(&config);
            let query = Query::new(id.as_str(), year.unwrap_or(0), month.unwrap_or(0));

            match engine.search(&query) {
                Ok(result) => {
                    if let Err(err) = write_stdout(result.as_bytes()) {
                        eprintln!("Error: cannot write results: {err}");
                        std::process::exit(2);
                    }

                    if !result.is_found() {
                        std::process::exit(1);
                    }
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    std::process::exit(2);
                }
            }
        }

        Commands::Build {
            skip_header,
            format,
        } => {
            let report = IndexBuilder::new(config.table_size)
                .with_layout(*format)
                .skip_header_row(*skip_header)
                .build(&config.dataset_path, &config.header_path, &config.chain_path)
                .unwrap_or_else(|err| {
                    eprintln!("Error: {err}");
                    std::process::exit(1);
                });

            println!("\n{:=^50}", " INDEX BUILT ");
            println!("{:<25} {}", "LAYOUT:", format);
            println!("{:<25} {}", "RECORDS INDEXED:", report.records_indexed);
            println!("{:<25} {}", "LINES SKIPPED:", report.lines_skipped);
            println!("{:-<50}", "");
            println!("{:<25} {}", "OCCUPIED BUCKETS:", report.occupied_buckets);
            println!("{:<25} {}", "LONGEST CHAIN:", report.longest_chain);
            println!("{:<25} {}", "HEADER SIZE:", format_bytes(report.header_bytes));
            println!("{:<25} {}", "CHAIN SIZE:", format_bytes(report.chain_bytes));
            println!("{:=<50}", "");
        }

        Commands::Info => {
            if let Err(err) = config.verify() {
                eprintln!("Error: {err}");
                std::process::exit(1);
            }

            let index = HashIndex::load(&config.header_path, config.table_size, config.header_format)
                .unwrap_or_else(|err| {
                    eprintln!("Error: {err}");
                    std::process::exit(1);
                });

            let table_size = index.table_size();
            let occupied = index.occupied_buckets();
            let chain_size = file_size(&config.chain_path);
            let node_count = chain_size / checkout_index::constants::CHAIN_NODE_SIZE as u64;

            println!("\n{:=^50}", " INDEX INFO ");
            println!("{:<25} {:?}", "DATASET FILE:", config.dataset_path);
            println!("{:<25} {:?}", "HEADER FILE:", config.header_path);
            println!("{:<25} {:?}", "CHAIN FILE:", config.chain_path);
            println!("{:-<50}", ""); // Separator

            println!("{:<25} {}", "LAYOUT:", index.layout());
            println!("{:<25} {}", "TABLE SIZE:", table_size);
            println!(
                "{:<25} {} ({:.1}%)",
                "OCCUPIED BUCKETS:",
                occupied,
                occupied as f64 * 100.0 / table_size as f64
            );
            println!("{:<25} {}", "CHAIN NODES:", node_count);
            println!("{:-<50}", "");

            println!(
                "{:<25} {}",
                "DATASET SIZE:",
                format_bytes(file_size(&config.dataset_path))
            );
            println!(
                "{:<25} {}",
                "HEADER SIZE:",
                format_bytes(file_size(&config.header_path))
            );
            println!("{:<25} {}", "CHAIN SIZE:", format_bytes(chain_size));

            println!("{:=<50}", ""); // Footer
        }

        Commands::Query {
            id,
            year,
            month,
            transport,
            server,
            input_pipe,
            output_pipe,
        } => {
            let request = format_request(&Query::new(
                id.as_str(),
                year.unwrap_or(0),
                month.unwrap_or(0),
            ));

            let response = match transport {
                TransportKind::Tcp => {
                    tcp_round_trip(server, &request, Some(Duration::from_secs(30)))
                }
                #[cfg(unix)]
                TransportKind::Fifo => {
                    checkout_index::fifo_round_trip(input_pipe, output_pipe, &request)
                }
                #[cfg(not(unix))]
                TransportKind::Fifo => {
                    let _ = (input_pipe, output_pipe);
                    Err(io::Error::other("the fifo transport requires a unix platform"))
                }
            };

            match response {
                Ok(payload) => {
                    if let Err(err) = write_stdout(&payload) {
                        eprintln!("Error: cannot write results: {err}");
                        std::process::exit(2);
                    }
                }
                Err(err) => {
                    eprintln!("Error: request failed: {err}");
                    std::process::exit(1);
                }
            }
        }
    }
}

fn open_engine(config: &IndexConfig) -> SearchEngine {
    SearchEngine::open(config).unwrap_or_else(|err| {
        eprintln!("Error: {err}");
        std::process::exit(1);
    })
}

/// Writes `payload` to stdout, newline-terminated.
fn write_stdout(payload: &[u8]) -> io::Result<()> {
    let mut stdout_handle = io::stdout().lock();
    stdout_handle.write_all(payload)?;
    if !payload.ends_with(b"\n") {
        stdout_handle.write_all(b"\n")?;
    }
    stdout_handle.flush()
}

fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|meta| meta.len()).unwrap_or(0)
}

/// Loads the index, binds the configured transport and serves until SIGINT
/// or SIGTERM. Returns startup problems, and an error if the loop stopped
/// because the transport kept failing.
fn serve(config: &IndexConfig, server_config: &ServerConfig) -> Result<(), IndexError> {
    let engine = SearchEngine::open(config)?;

    let shutdown = ShutdownFlag::new();
    install_signal_handlers(&shutdown).map_err(IndexError::Transport)?;

    let server = RequestServer::new(engine, shutdown);

    let summary = match server_config.transport {
        TransportKind::Tcp => {
            let mut transport = TcpTransport::bind(server_config.listen, server_config.read_timeout)
                .map_err(IndexError::Transport)?;
            server.serve(&mut transport)
        }

        #[cfg(unix)]
        TransportKind::Fifo => {
            let mut transport = checkout_index::FifoTransport::create(
                &server_config.input_pipe,
                &server_config.output_pipe,
            )
            .map_err(IndexError::Transport)?
            .with_response_timeout(server_config.read_timeout);
            server.serve(&mut transport)
        }

        #[cfg(not(unix))]
        TransportKind::Fifo => {
            return Err(IndexError::Configuration(
                "the fifo transport requires a unix platform".to_string(),
            ));
        }
    };

    info!(
        served = summary.requests_served,
        failed = summary.requests_failed,
        transport_errors = summary.transport_errors,
        "Shutting down."
    );

    if summary.transport_failed {
        return Err(IndexError::Transport(io::Error::other(
            "transport stopped accepting clients",
        )));
    }

    Ok(())
}
