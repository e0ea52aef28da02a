//! Error types for the MMKV parser.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while opening, decrypting, or scanning a log.
///
/// End-of-data conditions during a scan are not errors: they end the scan
/// with a [`crate::StopReason`]. Only real read failures and fatal
/// initialization problems are reported here.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Byte source error.
    #[error("storage error: {0}")]
    Storage(#[from] mmkv_storage::StorageError),

    /// Varint or value codec error.
    #[error("codec error: {0}")]
    Codec(#[from] mmkv_codec::CodecError),

    /// The source is too short to hold the 4-byte size header.
    #[error("not an MMKV log: header needs 4 bytes, source has {len}")]
    HeaderTooShort {
        /// Number of bytes actually available.
        len: u64,
    },

    /// Decryption was requested but no metadata source was supplied.
    #[error("decryption requires the companion metadata (.crc) file")]
    MetadataMissing,

    /// The metadata source is too short to contain the IV.
    #[error("metadata too short: need {required} bytes, got {len}")]
    MetadataTooShort {
        /// Number of bytes actually available.
        len: u64,
        /// Minimum number of bytes required.
        required: usize,
    },

    /// Encryption support is compiled out.
    #[error("encryption feature not enabled")]
    EncryptionNotEnabled,

    /// Decryption failed.
    #[error("decryption failed: {message}")]
    DecryptionFailed {
        /// Description of the failure.
        message: String,
    },
}

impl CoreError {
    /// Creates an encryption not enabled error.
    pub fn encryption_not_enabled() -> Self {
        Self::EncryptionNotEnabled
    }

    /// Creates a decryption failed error.
    pub fn decryption_failed(message: impl Into<String>) -> Self {
        Self::DecryptionFailed {
            message: message.into(),
        }
    }

    /// Returns `true` if this error only means the input ran out.
    #[must_use]
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::Codec(e) if e.is_end_of_stream())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmkv_codec::CodecError;

    #[test]
    fn end_of_stream_detection() {
        assert!(CoreError::from(CodecError::UnexpectedEndOfStream).is_end_of_stream());
        assert!(!CoreError::from(CodecError::InvalidUtf8).is_end_of_stream());
        assert!(!CoreError::MetadataMissing.is_end_of_stream());
    }

    #[test]
    fn messages() {
        assert_eq!(
            CoreError::HeaderTooShort { len: 2 }.to_string(),
            "not an MMKV log: header needs 4 bytes, source has 2"
        );
        assert_eq!(
            CoreError::decryption_failed("bad key length").to_string(),
            "decryption failed: bad key length"
        );
    }
}
