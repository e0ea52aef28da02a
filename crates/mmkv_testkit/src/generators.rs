//! Property-based test generators using proptest.
//!
//! Provides strategies for generating well-formed log operations and the
//! logs built from them, plus arbitrary bytes for robustness tests.

use crate::fixtures::LogBuilder;
use mmkv_codec::Value;
use proptest::prelude::*;

/// One write or removal, in the order it appears in a log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOp {
    /// A value blob written for a key.
    Put(String, Vec<u8>),
    /// A removal of a key.
    Remove(String),
}

/// Strategy for generating keys from a small alphabet, so keys repeat.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-d]{1,3}").expect("Invalid regex")
}

/// Strategy for generating non-empty value blobs.
pub fn blob_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..64)
}

/// Strategy for generating typed values.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::Int32),
        any::<i64>().prop_map(Value::Int64),
        any::<u32>().prop_map(Value::UInt32),
        any::<u64>().prop_map(Value::UInt64),
        ".{0,32}".prop_map(Value::String),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(Value::Bytes),
    ]
}

/// Strategy for generating a single log operation.
pub fn op_strategy() -> impl Strategy<Value = LogOp> {
    prop_oneof![
        4 => (key_strategy(), blob_strategy()).prop_map(|(k, v)| LogOp::Put(k, v)),
        1 => key_strategy().prop_map(LogOp::Remove),
    ]
}

/// Strategy for generating operation sequences.
pub fn ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<LogOp>> {
    prop::collection::vec(op_strategy(), 0..max_len)
}

/// Appends a sequence of operations to a fresh builder.
pub fn log_builder(ops: &[LogOp]) -> LogBuilder {
    ops.iter().fold(LogBuilder::new(), |log, op| match op {
        LogOp::Put(key, value) => log.put(key, value),
        LogOp::Remove(key) => log.remove(key),
    })
}

/// Builds a page-padded log from a sequence of operations.
pub fn build_log(ops: &[LogOp]) -> Vec<u8> {
    log_builder(ops).pad_to_page().build()
}

/// Strategy for generating arbitrary bytes that may or may not be a log.
pub fn arbitrary_log_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 4..256),
        // a valid log with garbage appended or its tail cut off
        (ops_strategy(8), prop::collection::vec(any::<u8>(), 0..32), any::<bool>()).prop_map(
            |(ops, garbage, cut)| {
                let mut bytes = log_builder(&ops).raw(&garbage).build();
                if cut && bytes.len() > 5 {
                    bytes.truncate(bytes.len() - garbage.len().min(bytes.len() - 5) - 1);
                }
                bytes
            }
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_keys_are_short(key in key_strategy()) {
            prop_assert!(!key.is_empty() && key.len() <= 3);
        }

        #[test]
        fn built_logs_are_page_aligned(ops in ops_strategy(16)) {
            let log = build_log(&ops);
            prop_assert_eq!(log.len() % crate::fixtures::PAGE_SIZE, 0);
        }

        #[test]
        fn arbitrary_bytes_have_a_header(bytes in arbitrary_log_bytes()) {
            prop_assert!(bytes.len() >= 4);
        }
    }
}
