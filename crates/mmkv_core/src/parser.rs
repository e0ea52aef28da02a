//! The public entry point: an opened MMKV log.

use crate::config::ScanConfig;
use crate::crypto::{self, METADATA_MIN_LEN};
use crate::error::{CoreError, CoreResult};
use crate::log::{LogHeader, LogScanner, StopReason};
use crate::map::{DecodedMap, MapBuilder};
use bytes::Bytes;
use mmkv_codec::decode_hex;
use mmkv_storage::{ByteSource, FileSource, InMemorySource};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Suffix of the companion metadata file next to a log.
pub const METADATA_SUFFIX: &str = ".crc";

/// An opened MMKV log, optionally paired with its metadata file.
///
/// Opening reads and validates the 4-byte header; everything else is
/// deferred until [`MmkvParser::decode_into_map`] or
/// [`MmkvParser::decrypt_and_reconstruct`] is called. Each of those builds
/// its own cursor, so calling them repeatedly yields identical results.
///
/// # Example
///
/// ```no_run
/// use mmkv_core::MmkvParser;
/// use mmkv_codec::as_int32;
///
/// let parser = MmkvParser::open_path("mmkv.default")?;
/// let map = parser.decode_into_map()?;
/// if let Some(latest) = map.latest("int_key") {
///     println!("int_key = {}", as_int32(latest)?);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct MmkvParser {
    source: Box<dyn ByteSource>,
    metadata: Option<Box<dyn ByteSource>>,
    header: LogHeader,
    config: ScanConfig,
}

impl MmkvParser {
    /// Opens a log with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is shorter than the 4-byte header or
    /// cannot be read.
    pub fn open(
        source: impl ByteSource + 'static,
        metadata: Option<Box<dyn ByteSource>>,
    ) -> CoreResult<Self> {
        Self::open_with_config(source, metadata, ScanConfig::default())
    }

    /// Opens a log with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is shorter than the 4-byte header or
    /// cannot be read.
    pub fn open_with_config(
        source: impl ByteSource + 'static,
        metadata: Option<Box<dyn ByteSource>>,
        config: ScanConfig,
    ) -> CoreResult<Self> {
        Self::from_boxed(Box::new(source), metadata, config)
    }

    fn from_boxed(
        source: Box<dyn ByteSource>,
        metadata: Option<Box<dyn ByteSource>>,
        config: ScanConfig,
    ) -> CoreResult<Self> {
        let header = LogHeader::read(&*source)?;
        info!(
            declared_size = header.declared_size(),
            source_size = source.size()?,
            has_metadata = metadata.is_some(),
            "opened MMKV log"
        );
        Ok(Self {
            source,
            metadata,
            header,
            config,
        })
    }

    /// Opens a log file, picking up `<path>.crc` as metadata if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be opened or is too short, or if
    /// the metadata file exists but cannot be opened.
    pub fn open_path(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let source = FileSource::open(path)?;
        let metadata_path = metadata_path_for(path);
        let metadata = FileSource::open_if_exists(&metadata_path)?;
        debug!(
            path = %metadata_path.display(),
            found = metadata.is_some(),
            "metadata lookup"
        );
        Self::open(source, metadata.map(|m| Box::new(m) as Box<dyn ByteSource>))
    }

    /// Opens a log file with an explicitly named metadata file.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be opened or the log is too
    /// short.
    pub fn open_path_with_metadata(
        log: impl AsRef<Path>,
        metadata: impl AsRef<Path>,
    ) -> CoreResult<Self> {
        let source = FileSource::open(log.as_ref())?;
        let metadata = FileSource::open(metadata.as_ref())?;
        Self::open(source, Some(Box::new(metadata)))
    }

    /// Opens a log held in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the log is shorter than the 4-byte header.
    pub fn from_bytes(log: impl Into<Bytes>, metadata: Option<&[u8]>) -> CoreResult<Self> {
        let metadata = metadata
            .map(|m| Box::new(InMemorySource::new(Bytes::copy_from_slice(m))) as Box<dyn ByteSource>);
        Self::open(InMemorySource::new(log), metadata)
    }

    /// Opens a log given as a hex string.
    ///
    /// # Errors
    ///
    /// Returns an error if either string is not valid hex or the log is
    /// shorter than the 4-byte header.
    pub fn from_hex(log_hex: &str, metadata_hex: Option<&str>) -> CoreResult<Self> {
        let source = InMemorySource::new(decode_hex(log_hex)?);
        let metadata = metadata_hex
            .map(decode_hex)
            .transpose()?
            .map(|m| Box::new(InMemorySource::new(m)) as Box<dyn ByteSource>);
        Self::open(source, metadata)
    }

    /// The header read at open time.
    #[must_use]
    pub fn header(&self) -> LogHeader {
        self.header
    }

    /// The declared size from the header.
    #[must_use]
    pub fn declared_size(&self) -> u32 {
        self.header.declared_size()
    }

    /// The scan configuration.
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Returns `true` if a metadata source is attached.
    #[must_use]
    pub fn has_metadata(&self) -> bool {
        self.metadata.is_some()
    }

    /// Starts a fresh record scan over the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the source size cannot be determined.
    pub fn records(&self) -> CoreResult<LogScanner<'_>> {
        LogScanner::new(&*self.source, self.header, &self.config)
    }

    /// Scans the whole log into a map of key to value history.
    ///
    /// Malformed or truncated input ends the scan early and the map holds
    /// everything read up to that point; see [`crate::ScanSummary`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the underlying source fails to read.
    pub fn decode_into_map(&self) -> CoreResult<DecodedMap> {
        let mut scanner = self.records()?;
        let mut builder = MapBuilder::new(self.config.tombstone_policy);
        for record in &mut scanner {
            builder.apply(record?);
        }
        let stop_reason = scanner.stop_reason().unwrap_or(StopReason::SourceExhausted);
        let map = builder.finish(scanner.bytes_scanned(), stop_reason);
        info!(
            keys = map.len(),
            records = map.summary().records,
            tombstones = map.summary().tombstones,
            %stop_reason,
            "decoded MMKV log"
        );
        Ok(map)
    }

    /// Decrypts the log, returning a plaintext log buffer.
    ///
    /// The 4-byte header is kept as is; the rest is decrypted with the key
    /// derived from `secret` and the IV from the metadata source.
    ///
    /// # Errors
    ///
    /// Returns an error if no metadata is attached, the metadata is shorter
    /// than 28 bytes, or the encryption feature is disabled.
    pub fn decrypt_and_reconstruct(&self, secret: impl AsRef<[u8]>) -> CoreResult<Bytes> {
        let metadata = self.read_metadata()?;
        debug!("decrypting MMKV log");
        let plaintext = crypto::decrypt_log(&*self.source, &metadata, secret.as_ref())?;
        Ok(Bytes::from(plaintext))
    }

    /// Decrypts the log and reopens it as a plaintext parser.
    ///
    /// The returned parser keeps this parser's configuration and has no
    /// metadata attached.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as
    /// [`MmkvParser::decrypt_and_reconstruct`].
    pub fn into_decrypted(self, secret: impl AsRef<[u8]>) -> CoreResult<Self> {
        let plaintext = self.decrypt_and_reconstruct(secret)?;
        Self::from_boxed(Box::new(InMemorySource::new(plaintext)), None, self.config)
    }

    fn read_metadata(&self) -> CoreResult<Vec<u8>> {
        let metadata = self.metadata.as_ref().ok_or(CoreError::MetadataMissing)?;
        let len = metadata.size()?;
        if len < METADATA_MIN_LEN as u64 {
            return Err(CoreError::MetadataTooShort {
                len,
                required: METADATA_MIN_LEN,
            });
        }
        Ok(metadata.read_at(0, METADATA_MIN_LEN)?)
    }
}

impl fmt::Debug for MmkvParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MmkvParser")
            .field("header", &self.header)
            .field("has_metadata", &self.metadata.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Returns the companion metadata path for a log path (`<path>.crc`).
#[must_use]
pub fn metadata_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(METADATA_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmkv_codec::CodecError;

    #[test]
    fn header_is_read_at_open() {
        let parser = MmkvParser::from_hex("0b000000ffffff07036b657902dc22", None).unwrap();
        assert_eq!(parser.declared_size(), 11);
        assert!(!parser.has_metadata());
    }

    #[test]
    fn short_header_is_fatal() {
        let err = MmkvParser::from_bytes(vec![1u8, 2, 3], None).unwrap_err();
        assert!(matches!(err, CoreError::HeaderTooShort { len: 3 }));
    }

    #[test]
    fn bad_hex_is_fatal() {
        let err = MmkvParser::from_hex("0b00zz", None).unwrap_err();
        assert!(matches!(err, CoreError::Codec(CodecError::InvalidHex { .. })));

        let err = MmkvParser::from_hex("0b000000", Some("123")).unwrap_err();
        assert!(matches!(err, CoreError::Codec(CodecError::InvalidHex { .. })));
    }

    #[test]
    fn decode_is_repeatable() {
        let parser = MmkvParser::from_hex("0b000000ffffff07036b657902dc22", None).unwrap();
        let first = parser.decode_into_map().unwrap();
        let second = parser.decode_into_map().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.summary().stop_reason, StopReason::DeclaredSizeReached);
        assert_eq!(first.summary().bytes_scanned, 11);
    }

    #[test]
    fn decrypt_without_metadata() {
        let parser = MmkvParser::from_hex("00000000", None).unwrap();
        let err = parser.decrypt_and_reconstruct(b"key").unwrap_err();
        assert!(matches!(err, CoreError::MetadataMissing));
    }

    #[test]
    fn decrypt_with_short_metadata() {
        let parser = MmkvParser::from_bytes(vec![0u8; 8], Some(&[0u8; 27][..])).unwrap();
        let err = parser.decrypt_and_reconstruct(b"key").unwrap_err();
        assert!(matches!(
            err,
            CoreError::MetadataTooShort {
                len: 27,
                required: 28
            }
        ));
    }

    #[test]
    fn metadata_path() {
        assert_eq!(
            metadata_path_for(Path::new("/data/mmkv.default")),
            PathBuf::from("/data/mmkv.default.crc")
        );
    }
}
