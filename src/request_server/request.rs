use crate::index_engine::Query;
use crate::index_engine::constants::RESPONSE_TERMINATOR;
use crate::utils::parse_int_lenient;
use std::io::{self, BufRead};

/// Largest accepted request frame, terminator excluded.
pub const MAX_REQUEST_SIZE: usize = 4096;

pub const REQUEST_DELIMITER: char = '|';

/// Parses an `id|year|month` request into a [`Query`].
///
/// - Fields are positional; a missing or empty year/month means no filter.
/// - Year and month are parsed leniently (`atoi`): text that does not start
///   with a number, and any value `<= 0`, also mean no filter. A malformed
///   filter is never an error.
/// - Everything from the first NUL byte on is ignored, as are trailing
///   `\r`/`\n` bytes.
pub fn parse_request(raw: &[u8]) -> Query {
    let raw = raw
        .iter()
        .position(|&b| b == 0)
        .map_or(raw, |nul| &raw[..nul]);

    let text = String::from_utf8_lossy(raw);
    let text = text.trim_end_matches(['\r', '\n']);

    let mut parts = text.splitn(3, REQUEST_DELIMITER);
    let id = parts.next().unwrap_or_default();
    let year = parts.next().map_or(0, parse_filter);
    let month = parts.next().map_or(0, parse_filter);

    Query::new(id, year, month)
}

fn parse_filter(field: &str) -> u32 {
    u32::try_from(parse_int_lenient(field)).unwrap_or(0)
}

/// Formats a query back into its wire form (without terminator).
pub fn format_request(query: &Query) -> String {
    let filter = |value: u32| {
        if value == 0 {
            String::new()
        } else {
            value.to_string()
        }
    };

    format!(
        "{}{REQUEST_DELIMITER}{}{REQUEST_DELIMITER}{}",
        query.id,
        filter(query.year),
        filter(query.month)
    )
}

/// Progress of a request frame after one buffered chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameScan {
    /// Bytes of the chunk to consume, terminator included.
    pub consumed: usize,
    /// `true` once the terminator has been seen.
    pub complete: bool,
}

/// Appends the part of `available` that belongs to the current frame.
///
/// This is the framing rule shared by blocking and async readers: the frame
/// ends at the first NUL or `\n`, and may not grow past `max_len` bytes.
pub fn scan_frame_chunk(
    frame: &mut Vec<u8>,
    available: &[u8],
    max_len: usize,
) -> io::Result<FrameScan> {
    let terminator = available.iter().position(|&b| b == 0 || b == b'\n');
    let take = terminator.unwrap_or(available.len());

    if frame.len() + take > max_len {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("request exceeds {max_len} bytes"),
        ));
    }

    frame.extend_from_slice(&available[..take]);

    Ok(match terminator {
        Some(pos) => FrameScan {
            consumed: pos + 1,
            complete: true,
        },
        None => FrameScan {
            consumed: take,
            complete: false,
        },
    })
}

/// Reads one request frame: bytes up to the first NUL or `\n`, or to EOF.
///
/// # Returns:
/// - `Ok(Some(frame))` without its terminator.
/// - `Ok(None)` if the peer closed the stream before sending anything.
/// - `Err(InvalidData)` if the frame exceeds `max_len` bytes.
pub fn read_frame<R: BufRead>(reader: &mut R, max_len: usize) -> io::Result<Option<Vec<u8>>> {
    let mut frame = Vec::new();
    let mut saw_any = false;

    loop {
        let available = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };

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

/// Appends the response terminator to a rendered payload.
pub fn encode_response(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload.len() + 1);
    frame.extend_from_slice(payload);
    frame.push(RESPONSE_TERMINATOR);
    frame
}

/// Splits a response frame at its terminator. Returns the whole input if no
/// terminator is present.
pub fn decode_response(frame: &[u8]) -> &[u8] {
    frame
        .iter()
        .position(|&b| b == RESPONSE_TERMINATOR)
        .map_or(frame, |end| &frame[..end])
}
