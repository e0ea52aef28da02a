//! Base-128 varint decoder.
//!
//! Varints are read one byte at a time from any [`ByteStream`]. The
//! accumulated bits are then truncated to the requested [`Width`] and
//! reinterpreted as unsigned or two's-complement signed. This is raw
//! truncation, not protobuf zigzag: the log stores native integers through
//! the varint encoding directly, so a negative `int32` arrives as a 10-byte
//! sign-extended varint.

use crate::error::{CodecError, CodecResult};

/// A sequential source of bytes that varints can be decoded from.
///
/// `Ok(None)` means the source is exhausted. Implementations whose reads can
/// fail for other reasons (file I/O) surface those through `Self::Error`.
pub trait ByteStream {
    /// Error produced by the stream. Must be able to carry codec failures.
    type Error: From<CodecError>;

    /// Returns the next byte, or `None` once the stream is exhausted.
    fn next_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

/// Integer width a varint is truncated to after decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    /// 32-bit (`int32` / `uint32`, and all lengths in the log).
    Bits32,
    /// 64-bit (`int64` / `uint64`).
    Bits64,
}

impl Width {
    /// Number of bits in this width.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits32 => 32,
            Self::Bits64 => 64,
        }
    }
}

/// A decoded varint together with the number of bytes it occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Varint<T> {
    /// The decoded value, truncated to the requested width.
    pub value: T,
    /// Number of bytes consumed from the stream.
    pub consumed: usize,
}

/// Cursor over an in-memory byte slice.
#[derive(Debug, Clone)]
pub struct SliceReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    /// Create a new reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Number of bytes consumed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Check if all bytes have been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Get remaining bytes.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}

impl ByteStream for SliceReader<'_> {
    type Error = CodecError;

    #[inline]
    fn next_byte(&mut self) -> CodecResult<Option<u8>> {
        let byte = self.data.get(self.pos).copied();
        if byte.is_some() {
            self.pos += 1;
        }
        Ok(byte)
    }
}

/// Accumulates varint payload bits until a byte without the continuation bit.
///
/// Bits beyond the 64th are discarded; no supported width can see them.
fn decode_raw<S: ByteStream + ?Sized>(stream: &mut S) -> Result<Varint<u64>, S::Error> {
    let mut result = 0u64;
    let mut shift = 0u32;
    let mut consumed = 0usize;

    loop {
        let byte = stream
            .next_byte()?
            .ok_or(CodecError::UnexpectedEndOfStream)?;
        consumed += 1;

        if shift < 64 {
            result |= u64::from(byte & 0x7f) << shift;
        }
        shift = shift.saturating_add(7);

        if byte & 0x80 == 0 {
            return Ok(Varint {
                value: result,
                consumed,
            });
        }
    }
}

/// Decode a varint and reinterpret it as an unsigned integer of `width` bits.
///
/// # Errors
///
/// Returns [`CodecError::UnexpectedEndOfStream`] (converted into the
/// stream's error type) if the stream ends before the varint does.
pub fn decode_unsigned<S: ByteStream + ?Sized>(
    stream: &mut S,
    width: Width,
) -> Result<Varint<u64>, S::Error> {
    let raw = decode_raw(stream)?;
    let value = match width {
        Width::Bits32 => u64::from(raw.value as u32),
        Width::Bits64 => raw.value,
    };
    Ok(Varint {
        value,
        consumed: raw.consumed,
    })
}

/// Decode a varint and reinterpret it as a two's-complement integer of
/// `width` bits.
///
/// # Errors
///
/// Same as [`decode_unsigned`].
#[allow(clippy::cast_possible_wrap)]
pub fn decode_signed<S: ByteStream + ?Sized>(
    stream: &mut S,
    width: Width,
) -> Result<Varint<i64>, S::Error> {
    let raw = decode_raw(stream)?;
    let value = match width {
        Width::Bits32 => i64::from(raw.value as u32 as i32),
        Width::Bits64 => raw.value as i64,
    };
    Ok(Varint {
        value,
        consumed: raw.consumed,
    })
}

/// Decode an unsigned 32-bit varint. Every length field in the log uses this.
///
/// # Errors
///
/// Same as [`decode_unsigned`].
pub fn decode_u32<S: ByteStream + ?Sized>(stream: &mut S) -> Result<Varint<u32>, S::Error> {
    let Varint { value, consumed } = decode_unsigned(stream, Width::Bits32)?;
    Ok(Varint {
        value: value as u32,
        consumed,
    })
}
