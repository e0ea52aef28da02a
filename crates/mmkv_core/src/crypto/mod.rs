//! Decryption of encrypted MMKV logs.
//!
//! Encrypted logs keep the 4-byte size header in the clear. Everything after
//! it, including the opaque prefix varint, is AES-128 in CFB mode. The IV
//! lives in the companion metadata (`.crc`) file at bytes `12..28`.
//! Decryption must be enabled via the `encryption` feature.
//!
//! ## Key Handling
//!
//! - The caller's secret is truncated or zero-padded to 16 bytes
//! - Keys and IVs are zeroized on drop
//!
//! ## Usage
//!
//! ```ignore
//! use mmkv_core::crypto::decrypt_log;
//!
//! let plaintext = decrypt_log(&log_source, &metadata, b"my secret")?;
//! ```

/// Size of the AES-128 key in bytes.
pub const KEY_SIZE: usize = 16;
/// Size of the CFB initialization vector in bytes.
pub const IV_SIZE: usize = 16;
/// Offset of the IV within the metadata file.
pub const IV_OFFSET: usize = 12;
/// Minimum metadata length needed to recover the IV.
pub const METADATA_MIN_LEN: usize = IV_OFFSET + IV_SIZE;

#[cfg(feature = "encryption")]
mod cipher;

#[cfg(feature = "encryption")]
pub use cipher::*;

/// Module contents when encryption feature is disabled.
#[cfg(not(feature = "encryption"))]
mod stub {
    use crate::error::{CoreError, CoreResult};
    use mmkv_storage::ByteSource;

    /// Cipher context (stub when encryption disabled).
    #[derive(Debug)]
    pub struct CipherContext {
        _private: (),
    }

    impl CipherContext {
        /// Always returns an error when encryption is disabled.
        pub fn new(_secret: &[u8], _metadata: &[u8]) -> CoreResult<Self> {
            Err(CoreError::encryption_not_enabled())
        }

        /// Always returns an error when encryption is disabled.
        pub fn decrypt_in_place(self, _data: &mut [u8]) -> CoreResult<()> {
            Err(CoreError::encryption_not_enabled())
        }
    }

    /// Always returns an error when encryption is disabled.
    pub fn decrypt_log(
        _source: &dyn ByteSource,
        _metadata: &[u8],
        _secret: &[u8],
    ) -> CoreResult<Vec<u8>> {
        Err(CoreError::encryption_not_enabled())
    }
}

#[cfg(not(feature = "encryption"))]
pub use stub::*;
