use crate::index_engine::constants::INITIAL_LINE_BUFFER_SIZE;
use crate::index_engine::error::{IndexError, Result};
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

/// Positioned line reader over the append-only dataset.
///
/// Lines have no maximum length: the read buffer starts at
/// [`INITIAL_LINE_BUFFER_SIZE`] bytes and doubles until the newline is found
/// or the file ends.
pub struct RecordStore {
    file: File,
    len: u64,
    reads: u64,
}

impl RecordStore {
    /// Opens the dataset read-only.
    pub fn open(path: &Path) -> Result<Self> {
        let unavailable = |source| IndexError::IndexUnavailable {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(unavailable)?;
        let len = file.metadata().map_err(unavailable)?.len();

        Ok(Self { file, len, reads: 0 })
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of `read_line_at` calls made against this store.
    #[inline]
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Reads the line that starts at byte `offset`.
    ///
    /// The trailing `\n` is stripped; everything else (including a `\r`) is
    /// returned verbatim. A final line without a newline is returned as-is.
    ///
    /// # Returns:
    /// - `Ok(Some(line))`: A line is present (possibly empty).
    /// - `Ok(None)`: `offset` is negative or at/after end of file.
    /// - `Err(IndexError::RecordUnreadable)`: The read itself failed.
    pub fn read_line_at(&mut self, offset: i64) -> Result<Option<Vec<u8>>> {
        self.reads += 1;

        let start = match u64::try_from(offset) {
            Ok(start) if start < self.len => start,
            _ => return Ok(None),
        };

        let unreadable = |source| IndexError::RecordUnreadable { offset, source };

        self.file
            .seek(SeekFrom::Start(start))
            .map_err(unreadable)?;

        let mut buf = vec![0u8; INITIAL_LINE_BUFFER_SIZE];
        let mut filled = 0;

        loop {
            if filled == buf.len() {
                buf.resize(buf.len() * 2, 0);
            }

            let n = match self.file.read(&mut buf[filled..]) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(unreadable(err)),
            };

            if n == 0 {
                break; // End of file
            }

            if let Some(pos) = buf[filled..filled + n].iter().position(|&b| b == b'\n') {
                buf.truncate(filled + pos);
                return Ok(Some(buf));
            }

            filled += n;
        }

        if filled == 0 {
            return Ok(None);
        }

        buf.truncate(filled);
        Ok(Some(buf))
    }
}
