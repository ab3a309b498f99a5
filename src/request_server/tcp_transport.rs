use crate::request_server::request::{MAX_REQUEST_SIZE, read_frame};
use crate::request_server::transport::{Exchange, Transport};
use std::io::{self, BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// How long a polled `accept` sleeps when no client is waiting.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// TCP binding: one connection per request.
///
/// The client connects, writes `id|year|month` terminated by NUL, newline or
/// a half-close, and reads the NUL-terminated response until EOF.
pub struct TcpTransport {
    listener: TcpListener,
    read_timeout: Option<Duration>,
}

impl TcpTransport {
    /// Binds a non-blocking listener so the serve loop can notice shutdown
    /// between clients.
    pub fn bind<A: ToSocketAddrs>(addr: A, read_timeout: Option<Duration>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        Ok(Self {
            listener,
            read_timeout,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for TcpTransport {
    type Exchange = TcpExchange;

    fn accept(&mut self) -> io::Result<Option<TcpExchange>> {
        match self.listener.accept() {
            Ok((stream, peer)) => {
                // Accepted sockets may inherit the listener's non-blocking mode.
                stream.set_nonblocking(false)?;
                stream.set_read_timeout(self.read_timeout)?;
                debug!(%peer, "Accepted connection.");
                Ok(Some(TcpExchange {
                    reader: BufReader::new(stream),
                    peer,
                }))
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL_INTERVAL);
                Ok(None)
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn describe(&self) -> String {
        match self.listener.local_addr() {
            Ok(addr) => format!("tcp://{addr}"),
            Err(_) => "tcp://<unbound>".to_string(),
        }
    }
}

pub struct TcpExchange {
    reader: BufReader<TcpStream>,
    peer: SocketAddr,
}

impl Exchange for TcpExchange {
    fn read_request(&mut self) -> io::Result<Option<Vec<u8>>> {
        read_frame(&mut self.reader, MAX_REQUEST_SIZE)
    }

    fn write_response(&mut self, frame: &[u8]) -> io::Result<()> {
        let stream = self.reader.get_mut();
        stream.write_all(frame)?;
        stream.flush()?;

        match stream.shutdown(Shutdown::Write) {
            Err(err) if err.kind() != io::ErrorKind::NotConnected => Err(err),
            _ => Ok(()),
        }
    }

    fn peer(&self) -> String {
        self.peer.to_string()
    }
}

/// Sends one request over TCP and returns the response payload without its
/// terminator. This is what the `query` command does.
pub fn tcp_round_trip<A: ToSocketAddrs>(
    addr: A,
    request: &str,
    timeout: Option<Duration>,
) -> io::Result<Vec<u8>> {
    use std::io::Read;

    let mut stream = TcpStream::connect(addr)?;
    stream.set_read_timeout(timeout)?;
    stream.write_all(request.as_bytes())?;
    stream.write_all(&[0])?;
    stream.flush()?;

    let mut response = Vec::new();
    stream.read_to_end(&mut response)?;
    Ok(crate::request_server::request::decode_response(&response).to_vec())
}
