//! Varint and value-blob encoder.
//!
//! The decoder never needs this; it exists so fixtures and property tests can
//! produce byte-exact blobs in the layout the log library writes.

use crate::value::Value;

/// Encode a typed value into the blob layout stored in the log.
///
/// - booleans are a single `0x00` / `0x01` byte
/// - integers are plain varints (negative values sign-extended to 10 bytes)
/// - floats are fixed-width little-endian
/// - strings and bytes carry a leading length varint
pub fn encode_value(value: &Value) -> Vec<u8> {
    let mut encoder = VarintEncoder::new();
    encoder.encode(value);
    encoder.into_bytes()
}

/// Encode `value` as a base-128 varint.
pub fn encode_unsigned(value: u64) -> Vec<u8> {
    let mut encoder = VarintEncoder::with_capacity(10);
    encoder.write_unsigned(value);
    encoder.into_bytes()
}

/// Encode `value` as a sign-extended base-128 varint.
///
/// Negative values always take 10 bytes, whatever their declared width.
pub fn encode_signed(value: i64) -> Vec<u8> {
    let mut encoder = VarintEncoder::with_capacity(10);
    encoder.write_signed(value);
    encoder.into_bytes()
}

/// Buffered varint writer.
#[derive(Debug, Default)]
pub struct VarintEncoder {
    buffer: Vec<u8>,
}

impl VarintEncoder {
    /// Create a new encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new encoder with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Encode a typed value.
    pub fn encode(&mut self, value: &Value) {
        match value {
            Value::Bool(b) => self.buffer.push(u8::from(*b)),
            Value::Int32(n) => self.write_signed(i64::from(*n)),
            Value::Int64(n) => self.write_signed(*n),
            Value::UInt32(n) => self.write_unsigned(u64::from(*n)),
            Value::UInt64(n) => self.write_unsigned(*n),
            Value::Float32(f) => self.buffer.extend_from_slice(&f.to_le_bytes()),
            Value::Float64(f) => self.buffer.extend_from_slice(&f.to_le_bytes()),
            Value::String(s) => self.write_length_delimited(s.as_bytes()),
            Value::Bytes(b) => self.write_length_delimited(b),
        }
    }

    /// Append an unsigned varint.
    pub fn write_unsigned(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buffer.push(byte);
                return;
            }
            self.buffer.push(byte | 0x80);
        }
    }

    /// Append a signed varint using 64-bit sign extension.
    #[allow(clippy::cast_sign_loss)]
    pub fn write_signed(&mut self, value: i64) {
        self.write_unsigned(value as u64);
    }

    /// Append a length varint followed by `payload`.
    pub fn write_length_delimited(&mut self, payload: &[u8]) {
        self.write_unsigned(payload.len() as u64);
        self.buffer.extend_from_slice(payload);
    }

    /// Consume this encoder and return the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Get a reference to the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}
