//! Integration tests for file-backed logs and metadata discovery.

use mmkv_core::{metadata_path_for, CoreError, MmkvParser, StorageError};
use mmkv_testkit::prelude::*;

#[test]
fn test_open_path_without_metadata() {
    let log = scenarios::int_updates_log().build();
    let files = TestLogFiles::write("mmkv.default", &log, None);

    let parser = MmkvParser::open_path(files.log_path()).unwrap();
    assert!(!parser.has_metadata());

    let from_file = parser.decode_into_map().unwrap();
    let from_memory = MmkvParser::from_bytes(log, None)
        .unwrap()
        .decode_into_map()
        .unwrap();
    assert_eq!(from_file, from_memory);
}

#[test]
fn test_open_path_discovers_crc() {
    let log = scenarios::all_types_log().build();
    let metadata = MetadataBuilder::new().iv(&[3u8; 16]).build();
    let files = TestLogFiles::write("mmkv.default", &log, Some(metadata.as_slice()));

    assert_eq!(metadata_path_for(files.log_path()), files.metadata_path());

    let parser = MmkvParser::open_path(files.log_path()).unwrap();
    assert!(parser.has_metadata());
    assert_eq!(parser.decode_into_map().unwrap().len(), 9);
}

#[test]
fn test_open_path_with_named_metadata() {
    let log = scenarios::int_updates_log().build();
    let metadata = MetadataBuilder::new().build();
    let files = TestLogFiles::write("settings", &log, None);
    let metadata_path = files.dir().join("elsewhere.crc");
    std::fs::write(&metadata_path, metadata).unwrap();

    let parser = MmkvParser::open_path_with_metadata(files.log_path(), &metadata_path).unwrap();
    assert!(parser.has_metadata());
}

#[test]
fn test_missing_log_file() {
    let files = TestLogFiles::write("present", &[0, 0, 0, 0], None);
    let err = MmkvParser::open_path(files.dir().join("absent")).unwrap_err();
    assert!(matches!(err, CoreError::Storage(StorageError::Io(_))));
}

#[test]
fn test_truncated_file_header() {
    let files = TestLogFiles::write("short", &[0x0b, 0x00], None);
    let err = MmkvParser::open_path(files.log_path()).unwrap_err();
    assert!(matches!(err, CoreError::HeaderTooShort { len: 2 }));
}

#[test]
fn test_repeated_decode_from_file() {
    let log = scenarios::remove_and_rewrite_log().build();
    let files = TestLogFiles::write("mmkv.default", &log, None);

    let first = MmkvParser::open_path(files.log_path())
        .unwrap()
        .decode_into_map()
        .unwrap();
    let second = MmkvParser::open_path(files.log_path())
        .unwrap()
        .decode_into_map()
        .unwrap();
    assert_eq!(first, second);
}
