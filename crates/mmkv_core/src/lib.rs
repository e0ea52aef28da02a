//! # MMKV Core
//!
//! Reads MMKV key-value log files.
//!
//! This crate provides:
//! - Header parsing and a streaming record scanner
//! - Reconstruction of every key's value history (most recent first)
//! - AES-128-CFB decryption of encrypted logs (`encryption` feature)
//!
//! Values come out as raw blobs; decode them with the `as_*` functions from
//! [`mmkv_codec`], which this crate re-exports.
//!
//! ## Usage
//!
//! ```
//! use mmkv_core::{as_int32, MmkvParser};
//!
//! let parser = MmkvParser::from_hex("0b000000ffffff07036b657902dc22", None)?;
//! assert_eq!(parser.declared_size(), 11);
//!
//! let map = parser.decode_into_map()?;
//! assert_eq!(as_int32(map.latest("key").unwrap())?, 4444);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod cursor;
mod error;
mod map;
mod parser;

pub mod crypto;
pub mod log;

pub use config::{ScanConfig, TombstonePolicy};
pub use cursor::ByteCursor;
pub use error::{CoreError, CoreResult};
pub use log::{LogHeader, LogRecord, LogScanner, StopReason};
pub use map::{DecodedMap, Iter, MapBuilder, ScanSummary};
pub use parser::{metadata_path_for, MmkvParser, METADATA_SUFFIX};

pub use mmkv_codec::{
    as_bool, as_bytes, as_float32, as_float64, as_int32, as_int64, as_string, as_uint32,
    as_uint64, decode_as, CodecError, IntoBlob, Value, ValueKind,
};
pub use mmkv_storage::{ByteSource, FileSource, InMemorySource, StorageError};
