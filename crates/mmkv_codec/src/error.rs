//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding varints or typed values.
///
/// None of these are fatal to a scan: the log scanner treats
/// [`CodecError::UnexpectedEndOfStream`] as the end of valid records, and
/// the typed value decoders report the rest to the caller per read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The source ran out of bytes in the middle of (or before) a varint.
    #[error("unexpected end of stream while decoding varint")]
    UnexpectedEndOfStream,

    /// Invalid UTF-8 string.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// A boolean blob was neither `0x00` nor `0x01`.
    #[error("unrecognized boolean encoding: {found}")]
    UnrecognizedBool {
        /// Hex rendering of the offending blob.
        found: String,
    },

    /// A fixed-width value had the wrong number of bytes.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Number of bytes the type requires.
        expected: usize,
        /// Number of bytes supplied.
        actual: usize,
    },

    /// The internal length wrapper claims more bytes than the blob holds.
    #[error("length wrapper overruns blob: needs {claimed} bytes, blob has {available}")]
    WrapperOverrun {
        /// Bytes required by the wrapper (prefix plus payload).
        claimed: u64,
        /// Bytes actually present in the blob.
        available: usize,
    },

    /// A blob supplied as a hex string could not be parsed.
    #[error("invalid hex input: {message}")]
    InvalidHex {
        /// Description of the parse failure.
        message: String,
    },
}

impl CodecError {
    /// Create an unrecognized boolean error from the offending bytes.
    pub fn unrecognized_bool(bytes: &[u8]) -> Self {
        Self::UnrecognizedBool {
            found: if bytes.is_empty() {
                "<empty>".to_string()
            } else {
                hex::encode(bytes)
            },
        }
    }

    /// Create an invalid hex error.
    pub fn invalid_hex(message: impl Into<String>) -> Self {
        Self::InvalidHex {
            message: message.into(),
        }
    }

    /// Returns `true` if this error means the input simply ran out.
    #[must_use]
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::UnexpectedEndOfStream)
    }
}

impl From<hex::FromHexError> for CodecError {
    fn from(err: hex::FromHexError) -> Self {
        Self::invalid_hex(err.to_string())
    }
}
