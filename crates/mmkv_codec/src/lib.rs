//! # MMKV Codec
//!
//! Varint and typed-value decoding for MMKV log files.
//!
//! MMKV stores every value as an opaque, protobuf-style blob with no type
//! tag. This crate provides:
//! - A base-128 varint decoder with exact 32/64-bit truncation semantics
//! - Typed decoders (`as_bool`, `as_int32`, ..., `as_string`) that
//!   reinterpret a blob the way the matching MMKV getter would
//! - Transparent acceptance of blobs as raw bytes or hex strings
//! - An encoder for building fixtures
//!
//! ## Usage
//!
//! ```
//! use mmkv_codec::{as_int32, as_string, decode_as, Value, ValueKind};
//!
//! assert_eq!(as_int32(&[0xdc, 0x22]).unwrap(), 4444);
//! assert_eq!(as_string("0a73746576656e2070616b").unwrap(), "steven pak");
//! assert_eq!(decode_as(ValueKind::Bool, "01").unwrap(), Value::Bool(true));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod blob;
mod decoder;
mod encoder;
mod error;
mod value;

pub use blob::{decode_hex, IntoBlob};
pub use decoder::{decode_signed, decode_u32, decode_unsigned, ByteStream, SliceReader, Varint, Width};
pub use encoder::{encode_signed, encode_unsigned, encode_value, VarintEncoder};
pub use error::{CodecError, CodecResult};
pub use value::{
    as_bool, as_bytes, as_float32, as_float64, as_int32, as_int64, as_string, as_uint32,
    as_uint64, decode_as, Value, ValueKind,
};
