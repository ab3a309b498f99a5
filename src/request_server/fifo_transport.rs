//! Named-pipe binding: a request FIFO the client writes to and a response
//! FIFO the client reads from. Each pipe is opened for one request and closed
//! again, matching what the GUI front end expects.

use crate::request_server::request::{MAX_REQUEST_SIZE, read_frame};
use crate::request_server::transport::{Exchange, Transport};
use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::os::fd::AsRawFd;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const FIFO_MODE: libc::mode_t = 0o666;

/// How long one `accept` waits for a client before handing control back.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Retry interval while waiting for the client to open the response pipe.
const RESPONSE_POLL_INTERVAL: Duration = Duration::from_millis(5);

pub struct FifoTransport {
    input: PathBuf,
    output: PathBuf,
    /// Request pipe kept open across polls, so a client that arrives between
    /// two `accept` calls still finds a reader.
    listening: Option<File>,
    response_timeout: Option<Duration>,
}

impl FifoTransport {
    /// Uses the given pipe pair, creating either FIFO if it does not exist.
    ///
    /// Fails if a path exists but is not a FIFO.
    pub fn create(input: &Path, output: &Path) -> io::Result<Self> {
        ensure_fifo(input)?;
        ensure_fifo(output)?;
        Ok(Self {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            listening: None,
            response_timeout: None,
        })
    }

    /// Bounds how long a response waits for the client to open the response
    /// pipe. `None` waits indefinitely.
    pub fn with_response_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.response_timeout = timeout;
        self
    }
}

/// Creates a FIFO at `path` unless one is already there.
pub fn ensure_fifo(path: &Path) -> io::Result<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.file_type().is_fifo() => return Ok(()),
        Ok(_) => {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("'{}' exists and is not a FIFO", path.display()),
            ));
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

    // SAFETY: `c_path` is a valid NUL-terminated string for the duration of the call.
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), FIFO_MODE) };
    if rc != 0 {
        let err = io::Error::last_os_error();
        // Lost a race with another process creating the same FIFO.
        if err.kind() != io::ErrorKind::AlreadyExists {
            return Err(err);
        }
    }

    info!(path = %path.display(), "Created FIFO.");
    Ok(())
}

impl Transport for FifoTransport {
    type Exchange = FifoExchange;

    /// Waits up to one poll interval for a client to write a request.
    ///
    /// The request pipe is opened non-blocking, so the wait never outlives
    /// one poll and the serve loop keeps seeing its shutdown flag.
    fn accept(&mut self) -> io::Result<Option<FifoExchange>> {
        let pipe = match self.listening.take() {
            Some(pipe) => pipe,
            None => OpenOptions::new()
                .read(true)
                .custom_flags(libc::O_NONBLOCK)
                .open(&self.input)?,
        };

        if !wait_readable(&pipe, ACCEPT_POLL_INTERVAL)? {
            // The held descriptor keeps an unlinked FIFO alive; notice removal.
            std::fs::metadata(&self.input)?;
            self.listening = Some(pipe);
            return Ok(None);
        }

        set_blocking(&pipe)?;
        debug!(input = %self.input.display(), "Client opened the request pipe.");

        Ok(Some(FifoExchange {
            request: Some(BufReader::new(pipe)),
            output: self.output.clone(),
            response_timeout: self.response_timeout,
        }))
    }

    fn describe(&self) -> String {
        format!(
            "fifo://{} -> {}",
            self.input.display(),
            self.output.display()
        )
    }
}

pub struct FifoExchange {
    request: Option<BufReader<File>>,
    output: PathBuf,
    response_timeout: Option<Duration>,
}

impl Exchange for FifoExchange {
    fn read_request(&mut self) -> io::Result<Option<Vec<u8>>> {
        // The request pipe is closed as soon as the frame is read.
        match self.request.take() {
            Some(mut reader) => read_frame(&mut reader, MAX_REQUEST_SIZE),
            None => Ok(None),
        }
    }

    fn write_response(&mut self, frame: &[u8]) -> io::Result<()> {
        let mut pipe = open_response_pipe(&self.output, self.response_timeout)?;
        pipe.write_all(frame)?;
        pipe.flush()
    }

    fn peer(&self) -> String {
        "fifo-client".to_string()
    }
}

/// Opens `path` for writing once a reader is present.
///
/// A non-blocking write open fails with `ENXIO` while no process has the
/// FIFO open for reading; that case is retried until `timeout` expires.
fn open_response_pipe(path: &Path, timeout: Option<Duration>) -> io::Result<File> {
    let started = Instant::now();

    loop {
        match OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
        {
            Ok(pipe) => {
                set_blocking(&pipe)?;
                return Ok(pipe);
            }
            Err(err) if err.raw_os_error() == Some(libc::ENXIO) => {
                if timeout.is_some_and(|limit| started.elapsed() >= limit) {
                    return Err(io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("no client opened '{}' for reading", path.display()),
                    ));
                }
                thread::sleep(RESPONSE_POLL_INTERVAL);
            }
            Err(err) => return Err(err),
        }
    }
}

/// Polls `pipe` for input. Returns `true` once a request is waiting or the
/// writer has already hung up, `false` on timeout or an interrupted wait.
fn wait_readable(pipe: &File, timeout: Duration) -> io::Result<bool> {
    let mut poll_fd = libc::pollfd {
        fd: pipe.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    };
    let timeout_ms = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);

    // SAFETY: `poll_fd` is a single valid pollfd and `pipe` outlives the call.
    let rc = unsafe { libc::poll(&mut poll_fd, 1, timeout_ms) };
    if rc < 0 {
        let err = io::Error::last_os_error();
        return match err.kind() {
            io::ErrorKind::Interrupted => Ok(false),
            _ => Err(err),
        };
    }

    Ok(rc > 0 && poll_fd.revents & (libc::POLLIN | libc::POLLHUP | libc::POLLERR) != 0)
}

/// Clears `O_NONBLOCK` so the exchange reads and writes with plain blocking
/// semantics.
fn set_blocking(file: &File) -> io::Result<()> {
    let fd = file.as_raw_fd();

    // SAFETY: `fd` belongs to `file`, which stays open across both calls.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }

    // SAFETY: as above.
    let rc = unsafe { libc::fcntl(fd, libc::F_SETFL, flags & !libc::O_NONBLOCK) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

/// Client side of the FIFO binding: writes one request, reads one response.
pub fn fifo_round_trip(input: &Path, output: &Path, request: &str) -> io::Result<Vec<u8>> {
    use std::io::Read;

    {
        let mut pipe = OpenOptions::new().write(true).open(input)?;
        pipe.write_all(request.as_bytes())?;
        pipe.write_all(&[0])?;
    }

    let mut response = Vec::new();
    File::open(output)?.read_to_end(&mut response)?;
    Ok(crate::request_server::request::decode_response(&response).to_vec())
}
