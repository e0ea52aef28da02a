//! # MMKV Storage
//!
//! Read-only byte sources for the MMKV log parser.
//!
//! Sources are **opaque byte stores** - they do not interpret the data they
//! hold. The parser reads log and companion metadata bytes through the
//! [`ByteSource`] trait and owns all format interpretation.
//!
//! ## Available Sources
//!
//! - [`InMemorySource`] - Owned buffers
//! - [`FileSource`] - Files on disk, opened read-only
//!
//! ## Example
//!
//! ```rust
//! use mmkv_storage::{ByteSource, InMemorySource};
//!
//! let source = InMemorySource::new(b"hello world".to_vec());
//! let data = source.read_at(6, 5).unwrap();
//! assert_eq!(&data, b"world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::ByteSource;
pub use error::{StorageError, StorageResult};
pub use file::FileSource;
pub use memory::InMemorySource;
