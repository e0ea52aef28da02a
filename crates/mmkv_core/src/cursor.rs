//! Sequential, buffered read cursor over a byte source.
//!
//! The cursor is the only scan state: it is created at the start of a scan,
//! owned exclusively by it, and only ever moves forward. Bytes are pulled from
//! the source in fixed-size chunks so that decoding varints byte-by-byte does
//! not turn into one source read per byte.

use crate::error::{CoreError, CoreResult};
use mmkv_codec::ByteStream;
use mmkv_storage::ByteSource;

/// A forward-only cursor over a [`ByteSource`].
pub struct ByteCursor<'a> {
    /// Source being read.
    source: &'a dyn ByteSource,
    /// Total size of the source.
    size: u64,
    /// Absolute offset of the next unread byte.
    offset: u64,
    /// Chunk read from the source; `buffer[buffer_pos..]` is unread.
    buffer: Vec<u8>,
    /// Current position within the buffer.
    buffer_pos: usize,
    /// Preferred chunk size for refills.
    chunk_size: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor positioned at `start`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source size cannot be determined.
    pub fn new(source: &'a dyn ByteSource, start: u64, chunk_size: usize) -> CoreResult<Self> {
        let size = source.size()?;
        Ok(Self {
            source,
            size,
            offset: start.min(size),
            buffer: Vec::new(),
            buffer_pos: 0,
            chunk_size: chunk_size.max(1),
        })
    }

    /// Absolute offset of the next unread byte.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.offset
    }

    /// Number of bytes left in the source.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.size - self.offset
    }

    /// Returns `true` once every byte of the source has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.offset >= self.size
    }

    /// Refills the buffer from the current offset.
    ///
    /// Only called once the buffered bytes are used up. Returns `false` at
    /// end of source.
    fn refill(&mut self) -> CoreResult<bool> {
        let remaining = self.remaining();
        if remaining == 0 {
            return Ok(false);
        }
        let len = remaining.min(self.chunk_size as u64) as usize;
        self.buffer = self.source.read_at(self.offset, len)?;
        self.buffer_pos = 0;
        Ok(!self.buffer.is_empty())
    }

    /// Reads exactly `len` bytes.
    ///
    /// Returns `Ok(None)` without consuming anything if fewer than `len`
    /// bytes remain, which the scanner treats as a truncated record.
    pub fn read_exact(&mut self, len: usize) -> CoreResult<Option<Vec<u8>>> {
        if (len as u64) > self.remaining() {
            return Ok(None);
        }

        let mut out = Vec::with_capacity(len);
        let buffered = (self.buffer.len() - self.buffer_pos).min(len);
        out.extend_from_slice(&self.buffer[self.buffer_pos..self.buffer_pos + buffered]);
        self.buffer_pos += buffered;
        self.offset += buffered as u64;

        let rest = len - buffered;
        if rest == 0 {
            return Ok(Some(out));
        }

        if rest >= self.chunk_size {
            // Large values bypass the buffer entirely.
            out.extend(self.source.read_at(self.offset, rest)?);
        } else {
            if !self.refill()? {
                return Ok(None);
            }
            out.extend_from_slice(&self.buffer[..rest]);
            self.buffer_pos = rest;
        }
        self.offset += rest as u64;

        Ok(Some(out))
    }
}

impl ByteStream for ByteCursor<'_> {
    type Error = CoreError;

    fn next_byte(&mut self) -> CoreResult<Option<u8>> {
        if self.buffer_pos >= self.buffer.len() && !self.refill()? {
            return Ok(None);
        }
        let byte = self.buffer[self.buffer_pos];
        self.buffer_pos += 1;
        self.offset += 1;
        Ok(Some(byte))
    }
}

impl std::fmt::Debug for ByteCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteCursor")
            .field("size", &self.size)
            .field("offset", &self.offset)
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}
