//! Log and metadata builders and on-disk fixtures.
//!
//! Provides convenience types for assembling MMKV logs byte by byte and
//! writing them, with their `.crc` companions, into temporary directories.

use aes::Aes128;
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
use mmkv_codec::{encode_unsigned, encode_value, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Opaque varint MMKV writes right after the size header.
pub const DEFAULT_PREFIX: [u8; 4] = [0xff, 0xff, 0xff, 0x07];

/// Page size MMKV pads its files to.
pub const PAGE_SIZE: usize = 4096;

/// Assembles an MMKV log.
///
/// By default the header holds the exact body length (prefix plus records)
/// and no padding is added.
///
/// # Example
///
/// ```rust
/// use mmkv_testkit::LogBuilder;
///
/// let log = LogBuilder::new().put("key", &[0xdc, 0x22]).build();
/// assert_eq!(hex::encode(&log), "0b000000ffffff07036b657902dc22");
/// ```
#[derive(Debug, Clone)]
pub struct LogBuilder {
    prefix: Vec<u8>,
    body: Vec<u8>,
    declared_size: Option<u32>,
    pad_to_page: bool,
}

impl Default for LogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LogBuilder {
    /// Creates a builder with the usual `ff ff ff 07` prefix.
    pub fn new() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_vec(),
            body: Vec::new(),
            declared_size: None,
            pad_to_page: false,
        }
    }

    /// Replaces the opaque prefix varint.
    pub fn prefix(mut self, prefix: &[u8]) -> Self {
        self.prefix = prefix.to_vec();
        self
    }

    /// Overrides the size written to the header.
    pub fn declared_size(mut self, size: u32) -> Self {
        self.declared_size = Some(size);
        self
    }

    /// Zero-pads the log to a multiple of [`PAGE_SIZE`].
    pub fn pad_to_page(mut self) -> Self {
        self.pad_to_page = true;
        self
    }

    /// Appends a record with a raw value blob.
    pub fn put(mut self, key: &str, value: &[u8]) -> Self {
        self.body.extend(encode_unsigned(key.len() as u64));
        self.body.extend_from_slice(key.as_bytes());
        self.body.extend(encode_unsigned(value.len() as u64));
        self.body.extend_from_slice(value);
        self
    }

    /// Appends a record holding an encoded typed value.
    pub fn put_value(self, key: &str, value: &Value) -> Self {
        let blob = encode_value(value);
        self.put(key, &blob)
    }

    /// Appends a tombstone for `key`.
    pub fn remove(mut self, key: &str) -> Self {
        self.body.extend(encode_unsigned(key.len() as u64));
        self.body.extend_from_slice(key.as_bytes());
        self.body.push(0);
        self
    }

    /// Appends raw bytes, for malformed records.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(bytes);
        self
    }

    /// Appends an explicit end marker (a zero key length).
    pub fn end_marker(mut self) -> Self {
        self.body.push(0);
        self
    }

    /// Length of prefix plus records, the size the header holds by default.
    pub fn body_len(&self) -> usize {
        self.prefix.len() + self.body.len()
    }

    /// Builds the log bytes.
    pub fn build(&self) -> Vec<u8> {
        let size = self
            .declared_size
            .unwrap_or_else(|| u32::try_from(self.body_len()).expect("log body too large"));

        let mut log = Vec::with_capacity(4 + self.body_len());
        log.extend_from_slice(&size.to_le_bytes());
        log.extend_from_slice(&self.prefix);
        log.extend_from_slice(&self.body);

        if self.pad_to_page {
            let padded = log.len().div_ceil(PAGE_SIZE).max(1) * PAGE_SIZE;
            log.resize(padded, 0);
        }
        log
    }

    /// Builds the log as a hex string.
    pub fn build_hex(&self) -> String {
        hex::encode(self.build())
    }
}

/// Assembles a companion metadata (`.crc`) file.
#[derive(Debug, Clone)]
pub struct MetadataBuilder {
    bytes: Vec<u8>,
}

impl Default for MetadataBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataBuilder {
    /// Offset of the IV.
    pub const IV_OFFSET: usize = 12;
    /// Smallest valid metadata file.
    pub const MIN_LEN: usize = 28;

    /// Creates a zeroed 28-byte metadata file.
    pub fn new() -> Self {
        Self {
            bytes: vec![0u8; Self::MIN_LEN],
        }
    }

    /// Sets the IV at bytes `12..28`.
    pub fn iv(mut self, iv: &[u8; 16]) -> Self {
        self.bytes[Self::IV_OFFSET..Self::MIN_LEN].copy_from_slice(iv);
        self
    }

    /// Sets the CRC digest at bytes `0..4`.
    pub fn crc(mut self, crc: u32) -> Self {
        self.bytes[..4].copy_from_slice(&crc.to_le_bytes());
        self
    }

    /// Extends the file with trailing zeros to `len` bytes.
    pub fn padded_to(mut self, len: usize) -> Self {
        if len > self.bytes.len() {
            self.bytes.resize(len, 0);
        }
        self
    }

    /// Builds the metadata bytes.
    pub fn build(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

/// Encrypts a plaintext log the way MMKV does.
///
/// The 4-byte header stays in the clear and the rest is encrypted with
/// AES-128-CFB under `key` (truncated or zero-padded to 16 bytes) and `iv`.
pub fn encrypt_log(plaintext: &[u8], key: &[u8], iv: &[u8; 16]) -> Vec<u8> {
    let mut normalized = [0u8; 16];
    let len = key.len().min(16);
    normalized[..len].copy_from_slice(&key[..len]);

    let mut out = plaintext.to_vec();
    if out.len() > 4 {
        cfb_mode::Encryptor::<Aes128>::new_from_slices(&normalized, iv)
            .expect("valid key and iv length")
            .encrypt(&mut out[4..]);
    }
    out
}

/// A log (and optional metadata) written to a temporary directory.
///
/// The directory is removed when this value is dropped.
pub struct TestLogFiles {
    dir: TempDir,
    log_path: PathBuf,
}

impl TestLogFiles {
    /// Writes `log` as `<dir>/<name>`, and `metadata` as `<dir>/<name>.crc`.
    pub fn write(name: &str, log: &[u8], metadata: Option<&[u8]>) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let log_path = dir.path().join(name);
        std::fs::write(&log_path, log).expect("Failed to write log file");

        if let Some(metadata) = metadata {
            let crc_path = dir.path().join(format!("{name}.crc"));
            std::fs::write(crc_path, metadata).expect("Failed to write metadata file");
        }

        Self { dir, log_path }
    }

    /// Path of the log file.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Path where the metadata file is (or would be) written.
    pub fn metadata_path(&self) -> PathBuf {
        let mut name = self.log_path.as_os_str().to_owned();
        name.push(".crc");
        PathBuf::from(name)
    }

    /// The temporary directory.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Ready-made logs reproducing files MMKV itself writes.
pub mod scenarios {
    use super::*;

    /// One record of every supported type.
    #[allow(clippy::approx_constant)]
    pub fn all_types_log() -> LogBuilder {
        LogBuilder::new()
            .put_value("int32_pkey", &Value::Int32(i32::MAX))
            .put_value("int32_nkey", &Value::Int32(i32::MIN))
            .put_value("int64_pkey", &Value::Int64(i64::MAX))
            .put_value("int64_nkey", &Value::Int64(i64::MIN))
            .put_value("bool_true_key", &Value::Bool(true))
            .put_value("bool_false_key", &Value::Bool(false))
            .put_value("string_key", &Value::String("steven pak".into()))
            .put_value("bytes_key", &Value::Bytes(b"some bytes".to_vec()))
            .put_value("float_key", &Value::Float64(3.14))
            .pad_to_page()
    }

    /// `int_key` written 1, 10, 100, 1000.
    pub fn int_updates_log() -> LogBuilder {
        [1, 10, 100, 1000]
            .into_iter()
            .fold(LogBuilder::new(), |log, n| {
                log.put_value("int_key", &Value::Int32(n))
            })
            .pad_to_page()
    }

    /// Six writes, a removal and two more writes of the same key.
    pub fn remove_and_rewrite_log() -> LogBuilder {
        let mut log = LogBuilder::new();
        for n in 1..=6 {
            log = log.put_value("key", &Value::Int32(n));
        }
        log.remove("key")
            .put_value("key", &Value::Int32(7))
            .put_value("key", &Value::Int32(8))
            .pad_to_page()
    }

    /// The same history after MMKV compacted it: only the last two writes.
    pub fn compacted_rewrite_log() -> LogBuilder {
        LogBuilder::new()
            .put_value("key", &Value::Int32(7))
            .put_value("key", &Value::Int32(8))
            .pad_to_page()
    }
}
