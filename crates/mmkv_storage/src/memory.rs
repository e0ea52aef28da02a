//! In-memory byte source.

use crate::backend::ByteSource;
use crate::error::{StorageError, StorageResult};
use bytes::Bytes;

/// A byte source backed by an owned buffer.
///
/// This source is suitable for:
/// - Unit and integration tests
/// - Logs handed over as hex strings by the browser viewer, once decoded
/// - Plaintext reconstructed from an encrypted log
///
/// # Example
///
/// ```rust
/// use mmkv_storage::{ByteSource, InMemorySource};
///
/// let source = InMemorySource::new(vec![0x0b, 0, 0, 0, 0xff, 0xff, 0xff, 0x07]);
/// assert_eq!(source.size().unwrap(), 8);
/// assert_eq!(source.read_at(0, 4).unwrap(), vec![0x0b, 0, 0, 0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    data: Bytes,
}

impl InMemorySource {
    /// Creates a source over the given bytes.
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

impl ByteSource for InMemorySource {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let size = self.data.len() as u64;
        let end = offset.saturating_add(len as u64);

        if offset > size || end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        let start = offset as usize;
        Ok(self.data[start..start + len].to_vec())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.data.len() as u64)
    }

    fn read_all(&self) -> StorageResult<Vec<u8>> {
        Ok(self.data.to_vec())
    }
}
