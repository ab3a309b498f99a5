use checkout_index::{
    IndexConfig, MAX_REQUEST_SIZE, RequestServer, SearchEngine, ShutdownFlag, scan_frame_chunk,
};
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task;
use tracing::{info, warn};

mod cli;
use crate::cli::Cli;

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Cli::parse_args();

    tracing_subscriber::fmt().with_env_filter("info").init();

    let mut config = IndexConfig::in_dir(&args.index_dir).with_table_size(args.table_size);
    config.max_response_size = args.max_response_size;

    // The bucket table is loaded once and shared by every connection; each
    // search opens its own chain and dataset handles.
    let engine = SearchEngine::open(&config)
        .map_err(|e| io::Error::other(format!("index open failed: {e}")))?;
    let server = Arc::new(RequestServer::new(engine, ShutdownFlag::new()));
    info!("MAIN: Index loaded.");

    let listener = TcpListener::bind(args.listen).await?;
    let addr = listener.local_addr()?;
    info!(address = %addr, "MAIN: TCP server listening.");

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(pair) => pair,
                    Err(err) => {
                        warn!(error = %err, "Accept failed.");
                        continue;
                    }
                };

                let server = Arc::clone(&server);
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(server, stream).await {
                        warn!(%peer, error = %err, "Request abandoned.");
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("MAIN: Interrupt received, shutting down.");
                server.shutdown_flag().request();
                break;
            }
        }
    }

    Ok(())
}

/// Serves one request on `stream`, then closes it.
async fn handle_connection(server: Arc<RequestServer>, stream: TcpStream) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let Some(raw) = read_frame(&mut reader, MAX_REQUEST_SIZE).await? else {
        return Ok(()); // Client left without asking
    };

    // Searches do blocking file I/O.
    let (frame, _failed) = task::spawn_blocking(move || server.respond(&raw))
        .await
        .map_err(|e| io::Error::other(format!("search task: {e}")))?;

    writer.write_all(&frame).await?;
    writer.shutdown().await
}

/// Async counterpart of [`checkout_index::read_frame`], framed by the same
/// [`scan_frame_chunk`] rule.
async fn read_frame<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    max_len: usize,
) -> io::Result<Option<Vec<u8>>> {
    let mut frame = Vec::new();
    let mut saw_any = false;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(saw_any.then_some(frame));
        }
        saw_any = true;

        let scan = scan_frame_chunk(&mut frame, available, max_len)?;
        reader.consume(scan.consumed);
        if scan.complete {
            return Ok(Some(frame));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn frames_match_the_blocking_reader() {
        let input: &[u8] = b"12345|2012|7\0555||\nlast";
        let mut async_reader = BufReader::new(input);
        let mut blocking_reader = std::io::Cursor::new(input);

        for _ in 0..4 {
            let expected = checkout_index::read_frame(&mut blocking_reader, MAX_REQUEST_SIZE)
                .expect("Blocking read failed");
            let actual = read_frame(&mut async_reader, MAX_REQUEST_SIZE)
                .await
                .expect("Async read failed");
            assert_eq!(actual, expected);
        }
    }

    #[tokio::test]
    async fn oversized_frames_are_rejected() {
        let input = vec![b'9'; MAX_REQUEST_SIZE + 1];
        let mut reader = BufReader::new(input.as_slice());
        let err = read_frame(&mut reader, MAX_REQUEST_SIZE)
            .await
            .expect_err("Oversized frame accepted");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
