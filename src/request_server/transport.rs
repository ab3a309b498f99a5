use std::io;

/// Source of request/response exchanges.
///
/// A transport hands out one [`Exchange`] per client request. Adapters own
/// whatever handles the exchange needs, and release them when it is dropped,
/// so no connection state outlives its request.
pub trait Transport {
    type Exchange: Exchange;

    /// Waits for the next client.
    ///
    /// # Returns:
    /// - `Ok(Some(exchange))`: A client is ready.
    /// - `Ok(None)`: Nothing arrived yet (poll timeout or interrupted wait);
    ///   the caller should re-check its shutdown flag and call again.
    /// - `Err(std::io::Error)`: The transport failed to accept.
    fn accept(&mut self) -> io::Result<Option<Self::Exchange>>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// One request/response round trip with a single client.
pub trait Exchange {
    /// Reads the raw request frame (terminator stripped).
    ///
    /// Returns `Ok(None)` if the client went away without sending anything.
    fn read_request(&mut self) -> io::Result<Option<Vec<u8>>>;

    /// Sends the complete, already-terminated response frame.
    ///
    /// Large frames may need several underlying writes; implementations must
    /// deliver all of it or fail.
    fn write_response(&mut self, frame: &[u8]) -> io::Result<()>;

    /// Identifies the peer in logs.
    fn peer(&self) -> String;
}
