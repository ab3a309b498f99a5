use crate::index_engine::constants::INITIAL_RESULT_BUFFER_SIZE;
use crate::index_engine::error::{IndexError, Result};
use tracing::warn;

/// Growable byte accumulator for one response.
///
/// ## Behavior:
/// - **Never truncates**: when an append does not fit, capacity grows to at
///   least double, and always to at least the length the append requires.
/// - **Optional ceiling**: with a limit set, growth past it is treated the
///   same as an allocation failure.
/// - **Sticky failure**: once growth fails, every later call returns
///   [`IndexError::AllocationFailure`] and [`Self::into_bytes`] refuses to
///   hand out the partial contents.
#[derive(Debug)]
pub struct ResultBuffer {
    bytes: Vec<u8>,
    limit: Option<usize>,
    failed_at: Option<usize>,
}

impl Default for ResultBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultBuffer {
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    /// Creates a buffer that refuses to grow past `limit` bytes.
    pub fn with_limit(limit: Option<usize>) -> Self {
        let initial = limit.map_or(INITIAL_RESULT_BUFFER_SIZE, |limit| {
            limit.min(INITIAL_RESULT_BUFFER_SIZE)
        });

        let mut bytes = Vec::new();
        let failed_at = bytes.try_reserve_exact(initial).err().map(|_| initial);

        Self {
            bytes,
            limit,
            failed_at,
        }
    }

    /// Appends `data`, growing the buffer if required.
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        if let Some(requested) = self.failed_at {
            return Err(IndexError::AllocationFailure { requested });
        }

        self.reserve_for(data.len())?;
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    #[inline]
    pub fn append_str(&mut self, text: &str) -> Result<()> {
        self.append(text.as_bytes())
    }

    fn reserve_for(&mut self, additional: usize) -> Result<()> {
        let len = self.bytes.len();
        let capacity = self.bytes.capacity();

        let Some(required) = len.checked_add(additional) else {
            return self.fail(usize::MAX);
        };

        if required <= capacity {
            return Ok(());
        }

        let mut target = capacity.saturating_mul(2).max(required);

        if let Some(limit) = self.limit {
            if required > limit {
                return self.fail(required);
            }
            target = target.min(limit);
        }

        if self.bytes.try_reserve_exact(target - len).is_err() {
            return self.fail(target);
        }

        Ok(())
    }

    fn fail(&mut self, requested: usize) -> Result<()> {
        warn!(
            requested,
            held = self.bytes.len(),
            "Result buffer cannot grow; abandoning response."
        );
        self.failed_at = Some(requested);
        self.bytes = Vec::new();
        Err(IndexError::AllocationFailure { requested })
    }

    /// Drops the contents while keeping the capacity.
    pub fn clear(&mut self) {
        if self.failed_at.is_none() {
            self.bytes.clear();
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        self.failed_at.is_some()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the buffer, returning its contents unless it has failed.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self.failed_at {
            Some(requested) => Err(IndexError::AllocationFailure { requested }),
            None => Ok(self.bytes),
        }
    }
}
