//! Streaming log record scanner.

use super::record::{LogHeader, LogRecord, HEADER_LEN};
use crate::config::ScanConfig;
use crate::cursor::ByteCursor;
use crate::error::{CoreError, CoreResult};
use bytes::Bytes;
use mmkv_codec::{decode_u32, decode_unsigned, Width};
use mmkv_storage::ByteSource;
use std::fmt;
use tracing::{debug, trace, warn};

/// Why a scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The cursor reached the declared size.
    DeclaredSizeReached,
    /// A record with a zero key length (usually the trailing padding).
    EndMarker,
    /// The source ended where a record would start.
    SourceExhausted,
    /// A record ran past the end of the source.
    Truncated,
    /// A key was not valid UTF-8.
    InvalidKey,
    /// A key or value length exceeded the configured maximum.
    LengthLimit,
    /// The byte source failed; the error was returned to the caller.
    ReadError,
}

impl StopReason {
    /// Returns `true` for the stops a well-formed log ends with.
    #[must_use]
    pub const fn is_clean(self) -> bool {
        matches!(
            self,
            Self::DeclaredSizeReached | Self::EndMarker | Self::SourceExhausted
        )
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::DeclaredSizeReached => "declared size reached",
            Self::EndMarker => "end marker",
            Self::SourceExhausted => "source exhausted",
            Self::Truncated => "truncated record",
            Self::InvalidKey => "invalid UTF-8 key",
            Self::LengthLimit => "length limit exceeded",
            Self::ReadError => "read error",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    ReadGarbagePrefix,
    ScanRecords,
    Done(StopReason),
}

/// A streaming iterator over the records of a plaintext log.
///
/// The header has already been read by the time a scanner exists; the
/// scanner starts by skipping the opaque varint that follows it and then
/// yields one [`LogRecord`] per record until a stop condition is hit.
///
/// # Error Handling
///
/// Malformed or truncated input ends iteration (`None`) and is reported by
/// [`LogScanner::stop_reason`]. Only byte source failures are yielded as
/// `Err`, after which iteration also ends.
///
/// # Example
///
/// ```ignore
/// let mut scanner = LogScanner::new(&source, header, &config)?;
/// for result in &mut scanner {
///     let record = result?;
///     // ...
/// }
/// println!("stopped: {:?}", scanner.stop_reason());
/// ```
pub struct LogScanner<'a> {
    cursor: ByteCursor<'a>,
    header: LogHeader,
    config: &'a ScanConfig,
    state: ScanState,
}

impl<'a> LogScanner<'a> {
    /// Creates a scanner positioned just after the 4-byte header.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::HeaderTooShort`] if the source holds fewer than
    /// 4 bytes, or an error if its size cannot be determined.
    pub fn new(
        source: &'a dyn ByteSource,
        header: LogHeader,
        config: &'a ScanConfig,
    ) -> CoreResult<Self> {
        let len = source.size()?;
        if len < HEADER_LEN as u64 {
            return Err(CoreError::HeaderTooShort { len });
        }
        let cursor = ByteCursor::new(source, HEADER_LEN as u64, config.read_buffer_size)?;
        Ok(Self {
            cursor,
            header,
            config,
            state: ScanState::ReadGarbagePrefix,
        })
    }

    /// The reason the scan stopped, once it has.
    #[must_use]
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self.state {
            ScanState::Done(reason) => Some(reason),
            _ => None,
        }
    }

    /// Number of bytes consumed after the header.
    #[must_use]
    pub fn bytes_scanned(&self) -> u64 {
        self.cursor.position().saturating_sub(HEADER_LEN as u64)
    }

    /// The header this scanner was created with.
    #[must_use]
    pub fn header(&self) -> LogHeader {
        self.header
    }

    fn finish(&mut self, reason: StopReason) -> CoreResult<Option<LogRecord>> {
        let offset = self.cursor.position();
        if reason.is_clean() {
            debug!(%reason, offset, "log scan finished");
        } else {
            warn!(%reason, offset, "log scan stopped early; remaining bytes ignored");
        }
        self.state = ScanState::Done(reason);
        Ok(None)
    }

    fn within_declared_size(&self) -> bool {
        let declared = u64::from(self.header.declared_size());
        if declared == 0 && self.config.zero_size_unbounded {
            return true;
        }
        self.bytes_scanned() < declared
    }

    /// Reads a 32-bit length varint; `None` means the source ran out.
    fn read_length(&mut self) -> CoreResult<Option<u32>> {
        match decode_u32(&mut self.cursor) {
            Ok(varint) => Ok(Some(varint.value)),
            Err(e) if e.is_end_of_stream() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn skip_garbage_prefix(&mut self) -> CoreResult<bool> {
        match decode_unsigned(&mut self.cursor, Width::Bits64) {
            Ok(varint) => {
                trace!(
                    value = varint.value,
                    consumed = varint.consumed,
                    "skipped opaque prefix varint"
                );
                Ok(true)
            }
            Err(e) if e.is_end_of_stream() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn read_record(&mut self) -> CoreResult<Option<LogRecord>> {
        if !self.within_declared_size() {
            return self.finish(StopReason::DeclaredSizeReached);
        }
        let offset = self.cursor.position();

        let Some(key_len) = self.read_length()? else {
            return self.finish(StopReason::SourceExhausted);
        };
        if key_len == 0 {
            return self.finish(StopReason::EndMarker);
        }
        if key_len > self.config.max_key_len {
            return self.finish(StopReason::LengthLimit);
        }

        let Some(key_bytes) = self.cursor.read_exact(key_len as usize)? else {
            return self.finish(StopReason::Truncated);
        };
        let Ok(key) = String::from_utf8(key_bytes) else {
            return self.finish(StopReason::InvalidKey);
        };

        let Some(value_len) = self.read_length()? else {
            return self.finish(StopReason::Truncated);
        };
        if value_len == 0 {
            trace!(%key, offset, "tombstone");
            return Ok(Some(LogRecord::Remove { offset, key }));
        }
        if value_len > self.config.max_value_len {
            return self.finish(StopReason::LengthLimit);
        }

        let Some(value) = self.cursor.read_exact(value_len as usize)? else {
            return self.finish(StopReason::Truncated);
        };
        trace!(%key, offset, len = value_len, "record");
        Ok(Some(LogRecord::Put {
            offset,
            key,
            value: Bytes::from(value),
        }))
    }

    fn read_next_record(&mut self) -> CoreResult<Option<LogRecord>> {
        loop {
            match self.state {
                ScanState::ReadGarbagePrefix => {
                    if !self.skip_garbage_prefix()? {
                        return self.finish(StopReason::SourceExhausted);
                    }
                    self.state = ScanState::ScanRecords;
                }
                ScanState::ScanRecords => return self.read_record(),
                ScanState::Done(_) => return Ok(None),
            }
        }
    }
}

impl Iterator for LogScanner<'_> {
    type Item = CoreResult<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.state = ScanState::Done(StopReason::ReadError);
                Some(Err(e))
            }
        }
    }
}

impl fmt::Debug for LogScanner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogScanner")
            .field("header", &self.header)
            .field("cursor", &self.cursor)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmkv_storage::InMemorySource;

    fn scan(bytes: Vec<u8>, config: &ScanConfig) -> (Vec<LogRecord>, Option<StopReason>) {
        let source = InMemorySource::new(bytes);
        let header = LogHeader::read(&source).unwrap();
        let mut scanner = LogScanner::new(&source, header, config).unwrap();
        let records = scanner.by_ref().collect::<CoreResult<Vec<_>>>().unwrap();
        (records, scanner.stop_reason())
    }

    #[test]
    fn single_record_stops_at_declared_size() {
        // size 11: prefix ff ff ff 07, "key" -> dc 22, then padding
        let mut log = hex::decode("0b000000ffffff07036b657902dc22").unwrap();
        log.resize(64, 0);
        let (records, stop) = scan(log, &ScanConfig::default());

        assert_eq!(
            records,
            vec![LogRecord::Put {
                offset: 8,
                key: "key".to_string(),
                value: Bytes::from_static(&[0xdc, 0x22]),
            }]
        );
        assert_eq!(stop, Some(StopReason::DeclaredSizeReached));
    }

    #[test]
    fn zero_key_length_is_end_marker() {
        let mut log = hex::decode("00000000ffffff07036b657902dc22").unwrap();
        log.resize(64, 0);
        let (records, stop) = scan(log, &ScanConfig::default());
        assert_eq!(records.len(), 1);
        assert_eq!(stop, Some(StopReason::EndMarker));
    }

    #[test]
    fn zero_size_bounded_reads_nothing() {
        let log = hex::decode("00000000ffffff07036b657902dc22").unwrap();
        let config = ScanConfig::new().zero_size_unbounded(false);
        let (records, stop) = scan(log, &config);
        assert!(records.is_empty());
        assert_eq!(stop, Some(StopReason::DeclaredSizeReached));
    }

    #[test]
    fn tombstone_record() {
        let log = hex::decode("0c000000ffffff07036b657900").unwrap();
        let (records, stop) = scan(log, &ScanConfig::default());
        assert_eq!(
            records,
            vec![LogRecord::Remove {
                offset: 8,
                key: "key".to_string()
            }]
        );
        assert_eq!(stop, Some(StopReason::SourceExhausted));
    }

    #[test]
    fn truncated_value_is_dropped() {
        // value claims 5 bytes, 2 present
        let log = hex::decode("00000000ffffff07036b657905dc22").unwrap();
        let (records, stop) = scan(log, &ScanConfig::default());
        assert!(records.is_empty());
        assert_eq!(stop, Some(StopReason::Truncated));
    }

    #[test]
    fn truncated_key_is_dropped() {
        let log = hex::decode("00000000ffffff07096b6579").unwrap();
        let (records, stop) = scan(log, &ScanConfig::default());
        assert!(records.is_empty());
        assert_eq!(stop, Some(StopReason::Truncated));
    }

    #[test]
    fn invalid_utf8_key_keeps_earlier_records() {
        let log = hex::decode("00000000ffffff07036b657902dc2202fffe0101").unwrap();
        let (records, stop) = scan(log, &ScanConfig::default());
        assert_eq!(records.len(), 1);
        assert_eq!(stop, Some(StopReason::InvalidKey));
    }

    #[test]
    fn length_limit() {
        let log = hex::decode("00000000ffffff07036b657902dc22").unwrap();
        let config = ScanConfig::new().max_key_len(2);
        let (records, stop) = scan(log, &config);
        assert!(records.is_empty());
        assert_eq!(stop, Some(StopReason::LengthLimit));
    }

    #[test]
    fn header_only_log_is_empty() {
        let (records, stop) = scan(vec![0, 0, 0, 0], &ScanConfig::default());
        assert!(records.is_empty());
        assert_eq!(stop, Some(StopReason::SourceExhausted));
    }

    #[test]
    fn small_read_buffer_gives_same_records() {
        let mut log = hex::decode("14000000ffffff07036b657902dc22036b657901").unwrap();
        log.extend_from_slice(&[0x2a]);
        let (large, _) = scan(log.clone(), &ScanConfig::default());
        let (small, _) = scan(log, &ScanConfig::new().read_buffer_size(1));
        assert_eq!(large, small);
        assert_eq!(large.len(), 2);
    }

    #[test]
    fn source_shorter_than_header_is_rejected() {
        let source = InMemorySource::new(vec![5, 0]);
        let config = ScanConfig::default();
        let result = LogScanner::new(&source, LogHeader::new(5), &config);
        assert!(matches!(result, Err(CoreError::HeaderTooShort { len: 2 })));
    }

    #[test]
    fn iteration_is_fused_after_stop() {
        let source = InMemorySource::new(vec![0, 0, 0, 0]);
        let config = ScanConfig::default();
        let header = LogHeader::read(&source).unwrap();
        let mut scanner = LogScanner::new(&source, header, &config).unwrap();
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
        assert_eq!(scanner.bytes_scanned(), 0);
    }
}
