//! # MMKV Testkit
//!
//! Test utilities for the MMKV parser.
//!
//! This crate provides:
//! - Builders for log and metadata files
//! - AES-128-CFB encryption of logs for round-trip tests
//! - Temporary on-disk fixtures with `.crc` companions
//! - Property-based test generators using proptest
//! - Shared test vectors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mmkv_testkit::prelude::*;
//!
//! #[test]
//! fn test_single_record() {
//!     let log = LogBuilder::new().put("key", &[0xdc, 0x22]).build();
//!     let parser = MmkvParser::from_bytes(log, None).unwrap();
//!     // ... assertions
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use vectors::*;
