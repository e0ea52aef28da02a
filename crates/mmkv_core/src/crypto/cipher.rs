//! AES-128-CFB log decryption.

use super::{IV_OFFSET, IV_SIZE, KEY_SIZE, METADATA_MIN_LEN};
use crate::error::{CoreError, CoreResult};
use crate::log::HEADER_LEN;
use aes::Aes128;
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
use mmkv_storage::ByteSource;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

type Aes128CfbDec = cfb_mode::Decryptor<Aes128>;

/// Normalizes a secret to exactly [`KEY_SIZE`] bytes.
///
/// Longer secrets are truncated; shorter ones are right-padded with zeros.
#[must_use]
pub fn normalize_key(secret: &[u8]) -> [u8; KEY_SIZE] {
    let mut key = [0u8; KEY_SIZE];
    let len = secret.len().min(KEY_SIZE);
    key[..len].copy_from_slice(&secret[..len]);
    key
}

/// Extracts the IV from the metadata file contents.
///
/// # Errors
///
/// Returns an error if `metadata` is shorter than [`METADATA_MIN_LEN`].
pub fn iv_from_metadata(metadata: &[u8]) -> CoreResult<[u8; IV_SIZE]> {
    let Some(bytes) = metadata.get(IV_OFFSET..METADATA_MIN_LEN) else {
        return Err(CoreError::MetadataTooShort {
            len: metadata.len() as u64,
            required: METADATA_MIN_LEN,
        });
    };
    let mut iv = [0u8; IV_SIZE];
    iv.copy_from_slice(bytes);
    Ok(iv)
}

/// Key and IV for decrypting one log.
///
/// Both are zeroized when the context is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CipherContext {
    key: [u8; KEY_SIZE],
    iv: [u8; IV_SIZE],
}

impl CipherContext {
    /// Builds a context from a caller secret and the metadata file contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata is too short to hold the IV.
    pub fn new(secret: &[u8], metadata: &[u8]) -> CoreResult<Self> {
        Ok(Self {
            key: normalize_key(secret),
            iv: iv_from_metadata(metadata)?,
        })
    }

    /// The IV recovered from the metadata.
    #[must_use]
    pub fn iv(&self) -> &[u8; IV_SIZE] {
        &self.iv
    }

    /// Decrypts `data` in place as one CFB stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the cipher rejects the key or IV.
    pub fn decrypt_in_place(self, data: &mut [u8]) -> CoreResult<()> {
        let cipher = Aes128CfbDec::new_from_slices(&self.key, &self.iv)
            .map_err(|e| CoreError::decryption_failed(e.to_string()))?;
        cipher.decrypt(data);
        Ok(())
    }
}

impl std::fmt::Debug for CipherContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherContext")
            .field("key", &"[REDACTED]")
            .field("iv", &"[REDACTED]")
            .finish()
    }
}

/// Decrypts a whole log into a plaintext buffer.
///
/// The 4-byte size header is copied through untouched and the rest of the
/// source is decrypted, so the result can be scanned like a plaintext log.
///
/// # Errors
///
/// Returns an error if the metadata is too short, the log is shorter than
/// its header, or the source cannot be read.
pub fn decrypt_log(source: &dyn ByteSource, metadata: &[u8], secret: &[u8]) -> CoreResult<Vec<u8>> {
    let context = CipherContext::new(secret, metadata)?;

    let mut data = source.read_all()?;
    if data.len() < HEADER_LEN {
        return Err(CoreError::HeaderTooShort {
            len: data.len() as u64,
        });
    }

    let body_len = data.len() - HEADER_LEN;
    context.decrypt_in_place(&mut data[HEADER_LEN..])?;
    debug!(body_len, "decrypted log body");
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmkv_storage::InMemorySource;

    const KEY: &[u8; 16] = b"0123456789abcdef";
    const IV: [u8; 16] = [7u8; 16];

    fn metadata_with_iv(iv: &[u8; 16]) -> Vec<u8> {
        let mut metadata = vec![0xaa; METADATA_MIN_LEN];
        metadata[IV_OFFSET..METADATA_MIN_LEN].copy_from_slice(iv);
        metadata
    }

    fn encrypt(body: &[u8]) -> Vec<u8> {
        let mut buf = body.to_vec();
        cfb_mode::Encryptor::<Aes128>::new_from_slices(KEY, &IV)
            .unwrap()
            .encrypt(&mut buf);
        buf
    }

    #[test]
    fn key_normalization() {
        assert_eq!(&normalize_key(b"0123456789abcdefXYZ"), KEY);
        let short = normalize_key(b"abc");
        assert_eq!(&short[..3], b"abc");
        assert!(short[3..].iter().all(|&b| b == 0));
        assert_eq!(normalize_key(b""), [0u8; KEY_SIZE]);
    }

    #[test]
    fn iv_extraction() {
        let metadata = metadata_with_iv(&IV);
        assert_eq!(iv_from_metadata(&metadata).unwrap(), IV);

        let err = iv_from_metadata(&metadata[..27]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::MetadataTooShort {
                len: 27,
                required: 28
            }
        ));
    }

    #[test]
    fn decrypt_preserves_header() {
        let body = b"\xff\xff\xff\x07\x03key\x02\xdc\x22".to_vec();
        let mut log = vec![0x0b, 0, 0, 0];
        log.extend(encrypt(&body));

        let source = InMemorySource::new(log);
        let plain = decrypt_log(&source, &metadata_with_iv(&IV), KEY).unwrap();
        assert_eq!(&plain[..4], &[0x0b, 0, 0, 0]);
        assert_eq!(&plain[4..], &body[..]);
    }

    #[test]
    fn wrong_key_yields_different_bytes() {
        let body = vec![0u8; 32];
        let mut log = vec![0, 0, 0, 0];
        log.extend(encrypt(&body));

        let source = InMemorySource::new(log);
        let plain = decrypt_log(&source, &metadata_with_iv(&IV), b"wrong").unwrap();
        assert_ne!(&plain[4..], &body[..]);
    }

    #[test]
    fn short_log_is_rejected() {
        let source = InMemorySource::new(vec![1, 2]);
        let err = decrypt_log(&source, &metadata_with_iv(&IV), KEY).unwrap_err();
        assert!(matches!(err, CoreError::HeaderTooShort { len: 2 }));
    }

    #[test]
    fn debug_redacts_key() {
        let context = CipherContext::new(KEY, &metadata_with_iv(&IV)).unwrap();
        let debug = format!("{context:?}");
        assert!(debug.contains("REDACTED"));
        assert_eq!(context.iv(), &IV);
    }
}
