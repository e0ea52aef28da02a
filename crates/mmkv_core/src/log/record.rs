//! Log header and record types.

use crate::error::{CoreError, CoreResult};
use bytes::Bytes;
use mmkv_storage::ByteSource;

/// Size of the plaintext size header at the start of every log.
pub const HEADER_LEN: usize = 4;

/// The fixed header at the start of a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogHeader {
    declared_size: u32,
}

impl LogHeader {
    /// Creates a header with the given declared size.
    #[must_use]
    pub const fn new(declared_size: u32) -> Self {
        Self { declared_size }
    }

    /// Reads the header from the first 4 bytes of `source`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::HeaderTooShort`] if the source holds fewer than
    /// 4 bytes.
    pub fn read(source: &dyn ByteSource) -> CoreResult<Self> {
        let len = source.size()?;
        if len < HEADER_LEN as u64 {
            return Err(CoreError::HeaderTooShort { len });
        }
        let bytes = source.read_at(0, HEADER_LEN)?;
        Ok(Self::from_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Decodes a header from its little-endian encoding.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; HEADER_LEN]) -> Self {
        Self::new(u32::from_le_bytes(bytes))
    }

    /// Number of bytes after the header that the log considers valid.
    ///
    /// Zero is a known quirk of freshly created logs.
    #[must_use]
    pub const fn declared_size(&self) -> u32 {
        self.declared_size
    }

    /// Absolute offset one past the last declared byte.
    #[must_use]
    pub const fn end_offset(&self) -> u64 {
        HEADER_LEN as u64 + self.declared_size as u64
    }
}

/// A record read from the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    /// A key was written.
    Put {
        /// Absolute offset of the record.
        offset: u64,
        /// The key.
        key: String,
        /// The value blob, still carrying any internal length wrapper.
        value: Bytes,
    },

    /// A key was removed (zero-length value).
    Remove {
        /// Absolute offset of the record.
        offset: u64,
        /// The key.
        key: String,
    },
}

impl LogRecord {
    /// Returns the key this record refers to.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Put { key, .. } | Self::Remove { key, .. } => key,
        }
    }

    /// Returns the absolute offset of this record.
    #[must_use]
    pub fn offset(&self) -> u64 {
        match self {
            Self::Put { offset, .. } | Self::Remove { offset, .. } => *offset,
        }
    }

    /// Returns `true` if this is a tombstone.
    #[must_use]
    pub fn is_remove(&self) -> bool {
        matches!(self, Self::Remove { .. })
    }
}
