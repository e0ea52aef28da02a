//! Typed value decoders.
//!
//! The log carries no type tags: a value is an opaque blob whose meaning is
//! fixed by the getter the application used. Callers therefore pick the
//! decoder, either by calling one of the `as_*` functions directly or by
//! passing a [`ValueKind`] to [`decode_as`].

use crate::blob::IntoBlob;
use crate::decoder::{decode_signed, decode_u32, decode_unsigned, SliceReader, Width};
use crate::error::{CodecError, CodecResult};
use std::fmt;

/// The closed set of types a blob can be decoded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `0x00` / `0x01`.
    Bool,
    /// Signed 32-bit varint.
    Int32,
    /// Signed 64-bit varint.
    Int64,
    /// Unsigned 32-bit varint.
    UInt32,
    /// Unsigned 64-bit varint.
    UInt64,
    /// 4-byte little-endian IEEE-754 single.
    Float32,
    /// 8-byte little-endian IEEE-754 double.
    Float64,
    /// Length-wrapped UTF-8 string.
    String,
    /// Length-wrapped raw bytes.
    Bytes,
}

impl ValueKind {
    /// All kinds, in declaration order.
    pub const ALL: [ValueKind; 9] = [
        ValueKind::Bool,
        ValueKind::Int32,
        ValueKind::Int64,
        ValueKind::UInt32,
        ValueKind::UInt64,
        ValueKind::Float32,
        ValueKind::Float64,
        ValueKind::String,
        ValueKind::Bytes,
    ];

    /// Lowercase name, as used by the viewer's type selector.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float",
            Self::Float64 => "double",
            Self::String => "string",
            Self::Bytes => "bytes",
        }
    }

    /// Looks a kind up by its [`ValueKind::name`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A blob decoded as one of the [`ValueKind`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// Single-precision float.
    Float32(f32),
    /// Double-precision float.
    Float64(f64),
    /// UTF-8 string.
    String(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl Value {
    /// The kind this value was decoded as.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Int32(_) => ValueKind::Int32,
            Self::Int64(_) => ValueKind::Int64,
            Self::UInt32(_) => ValueKind::UInt32,
            Self::UInt64(_) => ValueKind::UInt64,
            Self::Float32(_) => ValueKind::Float32,
            Self::Float64(_) => ValueKind::Float64,
            Self::String(_) => ValueKind::String,
            Self::Bytes(_) => ValueKind::Bytes,
        }
    }
}

/// Decode `blob` as the given kind.
///
/// # Errors
///
/// Returns the error of the selected decoder.
pub fn decode_as<'a>(kind: ValueKind, blob: impl IntoBlob<'a>) -> CodecResult<Value> {
    let blob = blob.into_blob()?;
    let blob: &[u8] = &blob;
    Ok(match kind {
        ValueKind::Bool => Value::Bool(as_bool(blob)?),
        ValueKind::Int32 => Value::Int32(as_int32(blob)?),
        ValueKind::Int64 => Value::Int64(as_int64(blob)?),
        ValueKind::UInt32 => Value::UInt32(as_uint32(blob)?),
        ValueKind::UInt64 => Value::UInt64(as_uint64(blob)?),
        ValueKind::Float32 => Value::Float32(as_float32(blob)?),
        ValueKind::Float64 => Value::Float64(as_float64(blob)?),
        ValueKind::String => Value::String(as_string(blob)?),
        ValueKind::Bytes => Value::Bytes(as_bytes(blob)?),
    })
}

/// Decode a boolean: `0x01` is true, `0x00` is false.
///
/// # Errors
///
/// Any other blob yields [`CodecError::UnrecognizedBool`].
pub fn as_bool<'a>(blob: impl IntoBlob<'a>) -> CodecResult<bool> {
    let blob = blob.into_blob()?;
    match &*blob {
        [0x01] => Ok(true),
        [0x00] => Ok(false),
        other => Err(CodecError::unrecognized_bool(other)),
    }
}

/// Decode a signed 32-bit integer. Trailing bytes are ignored.
///
/// # Errors
///
/// Returns [`CodecError::UnexpectedEndOfStream`] for an empty or truncated varint.
#[allow(clippy::cast_possible_truncation)]
pub fn as_int32<'a>(blob: impl IntoBlob<'a>) -> CodecResult<i32> {
    let blob = blob.into_blob()?;
    let varint = decode_signed(&mut SliceReader::new(&blob), Width::Bits32)?;
    Ok(varint.value as i32)
}

/// Decode a signed 64-bit integer. Trailing bytes are ignored.
///
/// # Errors
///
/// Same as [`as_int32`].
pub fn as_int64<'a>(blob: impl IntoBlob<'a>) -> CodecResult<i64> {
    let blob = blob.into_blob()?;
    Ok(decode_signed(&mut SliceReader::new(&blob), Width::Bits64)?.value)
}

/// Decode an unsigned 32-bit integer. Trailing bytes are ignored.
///
/// # Errors
///
/// Same as [`as_int32`].
pub fn as_uint32<'a>(blob: impl IntoBlob<'a>) -> CodecResult<u32> {
    let blob = blob.into_blob()?;
    Ok(decode_u32(&mut SliceReader::new(&blob))?.value)
}

/// Decode an unsigned 64-bit integer. Trailing bytes are ignored.
///
/// # Errors
///
/// Same as [`as_int32`].
pub fn as_uint64<'a>(blob: impl IntoBlob<'a>) -> CodecResult<u64> {
    let blob = blob.into_blob()?;
    Ok(decode_unsigned(&mut SliceReader::new(&blob), Width::Bits64)?.value)
}

/// Decode a little-endian IEEE-754 single.
///
/// # Errors
///
/// Returns [`CodecError::InvalidLength`] unless the blob is exactly 4 bytes.
pub fn as_float32<'a>(blob: impl IntoBlob<'a>) -> CodecResult<f32> {
    let blob = blob.into_blob()?;
    let bytes: [u8; 4] = (&*blob).try_into().map_err(|_| CodecError::InvalidLength {
        expected: 4,
        actual: blob.len(),
    })?;
    Ok(f32::from_le_bytes(bytes))
}

/// Decode a little-endian IEEE-754 double.
///
/// # Errors
///
/// Returns [`CodecError::InvalidLength`] unless the blob is exactly 8 bytes.
pub fn as_float64<'a>(blob: impl IntoBlob<'a>) -> CodecResult<f64> {
    let blob = blob.into_blob()?;
    let bytes: [u8; 8] = (&*blob).try_into().map_err(|_| CodecError::InvalidLength {
        expected: 8,
        actual: blob.len(),
    })?;
    Ok(f64::from_le_bytes(bytes))
}

/// Decode a length-wrapped UTF-8 string.
///
/// # Errors
///
/// Returns [`CodecError::WrapperOverrun`] if the wrapper claims more bytes
/// than the blob holds, or [`CodecError::InvalidUtf8`] for a bad payload.
pub fn as_string<'a>(blob: impl IntoBlob<'a>) -> CodecResult<String> {
    let blob = blob.into_blob()?;
    let payload = unwrap_length(&blob)?;
    std::str::from_utf8(payload)
        .map(str::to_owned)
        .map_err(|_| CodecError::InvalidUtf8)
}

/// Decode length-wrapped raw bytes.
///
/// # Errors
///
/// Returns [`CodecError::WrapperOverrun`] if the wrapper claims more bytes
/// than the blob holds.
pub fn as_bytes<'a>(blob: impl IntoBlob<'a>) -> CodecResult<Vec<u8>> {
    let blob = blob.into_blob()?;
    unwrap_length(&blob).map(<[u8]>::to_vec)
}

/// Strips the redundant `<length varint>` wrapper and returns the payload.
///
/// Bytes after the declared payload are ignored.
fn unwrap_length(blob: &[u8]) -> CodecResult<&[u8]> {
    let wrapper = decode_u32(&mut SliceReader::new(blob))?;
    let claimed = wrapper.consumed as u64 + u64::from(wrapper.value);
    if claimed > blob.len() as u64 {
        return Err(CodecError::WrapperOverrun {
            claimed,
            available: blob.len(),
        });
    }
    let start = wrapper.consumed;
    Ok(&blob[start..start + wrapper.value as usize])
}
