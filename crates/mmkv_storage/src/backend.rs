//! Byte source trait definition.

use crate::error::StorageResult;

/// A read-only source of log or metadata bytes.
///
/// Sources are **opaque byte stores**: they know nothing about the MMKV
/// layout. The parser owns all format interpretation and reads through a
/// sequential cursor built on top of [`ByteSource::read_at`].
///
/// # Invariants
///
/// - `size` is fixed for the lifetime of the source
/// - `read_at` returns exactly `len` bytes or an error, never a short read
/// - Sources must be `Send + Sync` so a parser can move between threads
///
/// # Implementors
///
/// - [`super::InMemorySource`] - owned buffers
/// - [`super::FileSource`] - files on disk
pub trait ByteSource: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The read would extend beyond the end of the source
    /// - An I/O error occurs
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Returns the total size of the source in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Reads the whole source into memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    fn read_all(&self) -> StorageResult<Vec<u8>> {
        let size = self.size()?;
        let len = usize::try_from(size).map_err(|_| crate::StorageError::TooLarge { size })?;
        self.read_at(0, len)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for Box<T> {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        (**self).read_at(offset, len)
    }

    fn size(&self) -> StorageResult<u64> {
        (**self).size()
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &T {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        (**self).read_at(offset, len)
    }

    fn size(&self) -> StorageResult<u64> {
        (**self).size()
    }
}
