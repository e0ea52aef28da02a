//! MMKV log layout and record scanning.
//!
//! ## Log Format
//!
//! ```text
//! | declared size (4, LE u32) | opaque varint | record | record | ... | zero padding |
//! record = | key_len (varint) | key (UTF-8) | value_len (varint) | value |
//! ```
//!
//! The declared size counts the bytes after the 4-byte header, opaque varint
//! included. The file itself is padded with zeros to a 4096-byte boundary.
//!
//! ## Stop Policy
//!
//! The log is append-only and is never validated by its writer, so the
//! scanner is lenient. Every one of these ends the scan cleanly and keeps
//! what was read so far:
//!
//! - **Declared size reached**: the normal end of a log
//! - **End marker**: a record with `key_len == 0` (the zero padding)
//! - **Source exhausted**: the source ends where a record would start
//! - **Truncated record**: a key, value or length runs past the end
//! - **Invalid key**: the key bytes are not UTF-8
//! - **Length limit**: a length exceeds the configured maximum
//!
//! Only real read failures from the byte source are reported as errors.
//!
//! ## Removal
//!
//! A record with `value_len == 0` is a tombstone left by a removal. How it
//! affects earlier values is decided by [`crate::TombstonePolicy`].

mod record;
mod scanner;

pub use record::{LogHeader, LogRecord, HEADER_LEN};
pub use scanner::{LogScanner, StopReason};
