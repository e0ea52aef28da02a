//! Integration tests for log scanning and map reconstruction.

use mmkv_core::{
    as_bool, as_bytes, as_float64, as_int32, as_int64, as_string, CoreError, DecodedMap,
    InMemorySource, MmkvParser, ScanConfig, StopReason, TombstonePolicy, Value, ValueKind,
};
use mmkv_testkit::prelude::*;
use proptest::prelude::*;
use std::collections::BTreeMap;

fn decode(log: Vec<u8>) -> DecodedMap {
    MmkvParser::from_bytes(log, None).unwrap().decode_into_map().unwrap()
}

fn decode_with(log: Vec<u8>, config: ScanConfig) -> DecodedMap {
    MmkvParser::open_with_config(InMemorySource::new(log), None, config)
        .unwrap()
        .decode_into_map()
        .unwrap()
}

fn history_hex(map: &DecodedMap, key: &str) -> Vec<String> {
    map.get(key)
        .unwrap_or_default()
        .iter()
        .map(hex::encode)
        .collect()
}

#[test]
fn test_log_vectors() {
    for vector in log_vectors() {
        let parser = MmkvParser::from_hex(&vector.log_hex, None).unwrap();
        assert_eq!(parser.declared_size(), vector.declared_size, "{}", vector.id);

        let map = parser.decode_into_map().unwrap();
        assert_eq!(map.len(), vector.expected.len(), "{}", vector.id);
        for expected in &vector.expected {
            assert_eq!(
                history_hex(&map, &expected.key),
                expected.values_hex,
                "{}: {}",
                vector.id,
                expected.key
            );
        }
    }
}

#[test]
#[allow(clippy::approx_constant)]
fn test_all_types_decode() {
    let map = decode(scenarios::all_types_log().build());

    assert_eq!(as_int32(map.latest("int32_pkey").unwrap()).unwrap(), i32::MAX);
    assert_eq!(as_int32(map.latest("int32_nkey").unwrap()).unwrap(), i32::MIN);
    assert_eq!(as_int64(map.latest("int64_pkey").unwrap()).unwrap(), i64::MAX);
    assert_eq!(as_int64(map.latest("int64_nkey").unwrap()).unwrap(), i64::MIN);
    assert!(as_bool(map.latest("bool_true_key").unwrap()).unwrap());
    assert!(!as_bool(map.latest("bool_false_key").unwrap()).unwrap());
    assert_eq!(
        as_string(map.latest("string_key").unwrap()).unwrap(),
        "steven pak"
    );
    assert_eq!(
        as_bytes(map.latest("bytes_key").unwrap()).unwrap(),
        b"some bytes"
    );
    assert_eq!(as_float64(map.latest("float_key").unwrap()).unwrap(), 3.14);
    assert_eq!(
        map.get_as("int32_pkey", ValueKind::Int32).unwrap().unwrap(),
        Value::Int32(i32::MAX)
    );
    assert_eq!(map.summary().stop_reason, StopReason::DeclaredSizeReached);
}

#[test]
fn test_int_updates_newest_first() {
    let map = decode(scenarios::int_updates_log().build());
    let values: Vec<i32> = map
        .get("int_key")
        .unwrap()
        .iter()
        .map(|blob| as_int32(blob).unwrap())
        .collect();
    assert_eq!(values, vec![1000, 100, 10, 1]);
}

fn int_history(map: &DecodedMap, key: &str) -> Vec<i32> {
    map.get(key)
        .unwrap_or_default()
        .iter()
        .map(|blob| as_int32(blob).unwrap())
        .collect()
}

#[test]
fn test_compacted_log_after_removal() {
    let map = decode(scenarios::compacted_rewrite_log().build());
    assert_eq!(int_history(&map, "key"), vec![8, 7]);
}

#[test]
fn test_clear_history_policy() {
    let config = ScanConfig::new().tombstone_policy(TombstonePolicy::ClearHistory);
    let map = decode_with(scenarios::remove_and_rewrite_log().build(), config);
    assert_eq!(int_history(&map, "key"), vec![8, 7]);
    assert_eq!(map.summary().tombstones, 1);
}

#[test]
fn test_keep_history_policy() {
    let map = decode(scenarios::remove_and_rewrite_log().build());
    assert_eq!(int_history(&map, "key"), vec![8, 7, 6, 5, 4, 3, 2, 1]);
    assert_eq!(map.summary().records, 8);
}

#[test]
fn test_removed_key_without_rewrite() {
    let log = LogBuilder::new().put("key", &[0xdc, 0x22]).remove("key").build();

    assert_eq!(history_hex(&decode(log.clone()), "key"), vec!["dc22"]);

    let config = ScanConfig::new().tombstone_policy(TombstonePolicy::ClearHistory);
    assert!(!decode_with(log, config).contains_key("key"));
}

#[test]
fn test_zero_declared_size_scans_to_end_marker() {
    let log = LogBuilder::new()
        .put("a", &[1])
        .put("b", &[2])
        .declared_size(0)
        .pad_to_page()
        .build();

    let map = decode(log.clone());
    assert_eq!(map.len(), 2);
    assert_eq!(map.summary().stop_reason, StopReason::EndMarker);

    let bounded = decode_with(log, ScanConfig::new().zero_size_unbounded(false));
    assert!(bounded.is_empty());
    assert_eq!(bounded.summary().stop_reason, StopReason::DeclaredSizeReached);
}

#[test]
fn test_declared_size_bounds_the_scan() {
    // the header only covers the first record; the second is stale data
    let first = LogBuilder::new().put("a", &[1]);
    let size = first.body_len() as u32;
    let log = first.put("b", &[2]).declared_size(size).build();

    let map = decode(log);
    assert!(map.contains_key("a"));
    assert!(!map.contains_key("b"));
}

#[test]
fn test_truncated_record_keeps_earlier_records() {
    let log = LogBuilder::new()
        .put("a", &[1])
        .raw(&[0x03, b'k', b'e'])
        .declared_size(0)
        .build();

    let map = decode(log);
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a"]);
    assert_eq!(map.summary().stop_reason, StopReason::Truncated);
}

#[test]
fn test_truncated_value_not_inserted() {
    let log = LogBuilder::new()
        .put("a", &[1])
        .raw(&[0x01, b'b', 0x05, 0xaa])
        .declared_size(0)
        .build();

    let map = decode(log);
    assert!(!map.contains_key("b"));
    assert_eq!(map.summary().stop_reason, StopReason::Truncated);
}

#[test]
fn test_invalid_utf8_key_stops_scan() {
    let log = LogBuilder::new()
        .put("a", &[1])
        .raw(&[0x02, 0xff, 0xfe, 0x01, 0x01])
        .put("c", &[3])
        .declared_size(0)
        .build();

    let map = decode(log);
    assert_eq!(map.len(), 1);
    assert_eq!(map.summary().stop_reason, StopReason::InvalidKey);
}

#[test]
fn test_value_length_limit() {
    let log = LogBuilder::new().put("a", &[1]).put("big", &[0u8; 100]).build();
    let map = decode_with(log, ScanConfig::new().max_value_len(64));
    assert_eq!(map.len(), 1);
    assert_eq!(map.summary().stop_reason, StopReason::LengthLimit);
}

#[test]
fn test_long_key_accepted_by_default() {
    let key = "k".repeat(70_000);
    let map = decode(LogBuilder::new().put(&key, &[1]).put("b", &[2]).build());
    assert!(map.contains_key(&key));
    assert!(map.contains_key("b"));
    assert_eq!(map.summary().stop_reason, StopReason::DeclaredSizeReached);
}

#[test]
fn test_header_only_log() {
    let map = decode(vec![0, 0, 0, 0]);
    assert!(map.is_empty());
    assert_eq!(map.summary().stop_reason, StopReason::SourceExhausted);
}

#[test]
fn test_short_header_is_fatal() {
    assert!(matches!(
        MmkvParser::from_bytes(Vec::<u8>::new(), None),
        Err(CoreError::HeaderTooShort { len: 0 })
    ));
}

#[test]
fn test_idempotent_decode() {
    let log = scenarios::all_types_log().build();
    let first = decode(log.clone());
    let second = decode(log);
    assert_eq!(first, second);
}

#[test]
fn test_small_read_buffer() {
    let log = scenarios::all_types_log().build();
    let small = decode_with(log.clone(), ScanConfig::new().read_buffer_size(3));
    assert_eq!(small, decode(log));
}

#[test]
fn test_hex_and_bytes_agree() {
    let log = scenarios::int_updates_log();
    let from_hex = MmkvParser::from_hex(&log.build_hex(), None)
        .unwrap()
        .decode_into_map()
        .unwrap();
    assert_eq!(from_hex, decode(log.build()));
}

#[test]
fn test_record_stream() {
    let log = LogBuilder::new().put("a", &[1]).remove("a").build();
    let parser = MmkvParser::from_bytes(log, None).unwrap();
    let records: Vec<_> = parser
        .records()
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].key(), "a");
    assert_eq!(records[0].offset(), 8);
    assert!(records[1].is_remove());
}

fn model(ops: &[LogOp], policy: TombstonePolicy) -> BTreeMap<String, Vec<Vec<u8>>> {
    let mut map: BTreeMap<String, Vec<Vec<u8>>> = BTreeMap::new();
    for op in ops {
        match op {
            LogOp::Put(key, value) => map.entry(key.clone()).or_default().insert(0, value.clone()),
            LogOp::Remove(key) => {
                if policy == TombstonePolicy::ClearHistory {
                    map.remove(key);
                }
            }
        }
    }
    map
}

fn as_plain(map: DecodedMap) -> BTreeMap<String, Vec<Vec<u8>>> {
    map.into_inner()
        .into_iter()
        .map(|(key, history)| (key, history.iter().map(|b| b.to_vec()).collect()))
        .collect()
}

proptest! {
    #[test]
    fn keep_history_matches_model(ops in ops_strategy(24)) {
        let map = decode(build_log(&ops));
        prop_assert_eq!(as_plain(map), model(&ops, TombstonePolicy::KeepHistory));
    }

    #[test]
    fn clear_history_matches_model(ops in ops_strategy(24)) {
        let config = ScanConfig::new().tombstone_policy(TombstonePolicy::ClearHistory);
        let map = decode_with(build_log(&ops), config);
        prop_assert_eq!(as_plain(map), model(&ops, TombstonePolicy::ClearHistory));
    }

    #[test]
    fn typed_values_survive_the_log(value in value_strategy()) {
        let map = decode(LogBuilder::new().put_value("typed", &value).build());
        let decoded = map.get_as("typed", value.kind()).unwrap().unwrap();
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn scan_never_panics(bytes in arbitrary_log_bytes()) {
        let parser = MmkvParser::from_bytes(bytes, None).unwrap();
        let map = parser.decode_into_map();
        prop_assert!(map.is_ok());
    }
}
