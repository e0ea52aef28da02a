//! Shared test vectors for the MMKV parser.
//!
//! These vectors reproduce files written by MMKV itself and are
//! serde-serializable so the browser viewer can check itself against them.

use crate::fixtures::scenarios;
use mmkv_codec::Value;
use serde::{Deserialize, Serialize};

/// A whole log and the map it must decode to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// The log file (hex-encoded).
    pub log_hex: String,
    /// Expected declared size from the header.
    pub declared_size: u32,
    /// Expected map: each key with its blobs, most recent first.
    pub expected: Vec<ExpectedKey>,
}

/// One key of an expected map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedKey {
    /// The key.
    pub key: String,
    /// Value blobs (hex-encoded), most recent first.
    pub values_hex: Vec<String>,
}

/// A single blob and what a typed decoder must make of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Decoder name (`ValueKind::name`).
    pub kind: String,
    /// The blob (hex-encoded).
    pub blob_hex: String,
    /// Expected value as rendered by [`render_value`].
    pub expected: Option<String>,
    /// Fragment of the expected error message (if this should fail).
    pub expected_error: Option<String>,
}

fn expected(key: &str, values_hex: &[&str]) -> ExpectedKey {
    ExpectedKey {
        key: key.into(),
        values_hex: values_hex.iter().map(|v| (*v).to_string()).collect(),
    }
}

/// Renders a decoded value the way [`ValueVector::expected`] spells it.
///
/// Byte values render as hex.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Int32(n) => n.to_string(),
        Value::Int64(n) => n.to_string(),
        Value::UInt32(n) => n.to_string(),
        Value::UInt64(n) => n.to_string(),
        Value::Float32(f) => f.to_string(),
        Value::Float64(f) => f.to_string(),
        Value::String(s) => s.clone(),
        Value::Bytes(b) => hex::encode(b),
    }
}

/// Whole-log vectors.
pub fn log_vectors() -> Vec<LogVector> {
    vec![
        LogVector {
            id: "int32_keypair".into(),
            description: "Single int32 write of 4444".into(),
            log_hex: "0b000000ffffff07036b657902dc22".into(),
            declared_size: 11,
            expected: vec![expected("key", &["dc22"])],
        },
        LogVector {
            id: "int32_keypair_with_remove".into(),
            description: "int32 write followed by a removal".into(),
            log_hex: "10000000ffffff07036b657902dc22036b657900".into(),
            declared_size: 16,
            expected: vec![expected("key", &["dc22"])],
        },
        LogVector {
            id: "all_types".into(),
            description: "One key of every supported type".into(),
            log_hex: scenarios::all_types_log().build_hex(),
            declared_size: u32::try_from(scenarios::all_types_log().body_len())
                .expect("small log"),
            expected: vec![
                expected("bool_false_key", &["00"]),
                expected("bool_true_key", &["01"]),
                expected("bytes_key", &["0a736f6d65206279746573"]),
                expected("float_key", &["1f85eb51b81e0940"]),
                expected("int32_nkey", &["80808080f8ffffffff01"]),
                expected("int32_pkey", &["ffffffff07"]),
                expected("int64_nkey", &["80808080808080808001"]),
                expected("int64_pkey", &["ffffffffffffffff7f"]),
                expected("string_key", &["0a73746576656e2070616b"]),
            ],
        },
        LogVector {
            id: "int_updates".into(),
            description: "int_key written 1, 10, 100, 1000".into(),
            log_hex: scenarios::int_updates_log().build_hex(),
            declared_size: u32::try_from(scenarios::int_updates_log().body_len())
                .expect("small log"),
            expected: vec![expected("int_key", &["e807", "64", "0a", "01"])],
        },
        LogVector {
            id: "string_updates".into(),
            description: "string_key rewritten with multi-byte UTF-8".into(),
            log_hex: concat!(
                "48000000ffffff07",
                "0a737472696e675f6b6579070673746576656e",
                "0a737472696e675f6b65790302c398",
                "0a737472696e675f6b65790504f0a09c8e",
                "0a737472696e675f6b65790504f09f9881",
            )
            .into(),
            declared_size: 72,
            expected: vec![expected(
                "string_key",
                &["04f09f9881", "04f0a09c8e", "02c398", "0673746576656e"],
            )],
        },
        LogVector {
            id: "float_updates".into(),
            description: "float_key written four times".into(),
            log_hex: concat!(
                "50000000ffffff07",
                "09666c6f61745f6b6579081f85eb51b81e0940",
                "09666c6f61745f6b65790854e3a59bc4200940",
                "09666c6f61745f6b657908363cbd5296210940",
                "09666c6f61745f6b6579086f9eea909b210940",
            )
            .into(),
            declared_size: 80,
            expected: vec![expected(
                "float_key",
                &[
                    "6f9eea909b210940",
                    "363cbd5296210940",
                    "54e3a59bc4200940",
                    "1f85eb51b81e0940",
                ],
            )],
        },
    ]
}

fn value(kind: &str, blob_hex: &str, expected: &str) -> ValueVector {
    ValueVector {
        id: format!("{kind}_{blob_hex}"),
        kind: kind.into(),
        blob_hex: blob_hex.into(),
        expected: Some(expected.into()),
        expected_error: None,
    }
}

fn failing(kind: &str, blob_hex: &str, error: &str) -> ValueVector {
    ValueVector {
        id: format!("{kind}_{blob_hex}_fails"),
        kind: kind.into(),
        blob_hex: blob_hex.into(),
        expected: None,
        expected_error: Some(error.into()),
    }
}

/// Typed decoder vectors.
pub fn value_vectors() -> Vec<ValueVector> {
    vec![
        value("int32", "ffffffff07", "2147483647"),
        value("int32", "80808080f8ffffffff01", "-2147483648"),
        value("int32", "dc22", "4444"),
        value("int64", "ffffffffffffffff7f", "9223372036854775807"),
        value("int64", "80808080808080808001", "-9223372036854775808"),
        value("uint32", "ffffffff0f", "4294967295"),
        value("uint64", "ffffffffffffffffff01", "18446744073709551615"),
        value("bool", "01", "true"),
        value("bool", "00", "false"),
        value("double", "1f85eb51b81e0940", "3.14"),
        value("float", "0000c03f", "1.5"),
        value("string", "0a73746576656e2070616b", "steven pak"),
        value("string", "02c398", "\u{d8}"),
        value("string", "04f09f9881", "\u{1f601}"),
        value("string", "00", ""),
        value("bytes", "0a736f6d65206279746573", "736f6d65206279746573"),
        failing("bool", "02", "unrecognized boolean"),
        failing("double", "1f85", "invalid length"),
        failing("string", "0a7374", "overruns"),
        failing("string", "02fffe", "UTF-8"),
        failing("int32", "80", "end of stream"),
    ]
}

/// Generate all test vectors as JSON for the viewer.
pub fn all_vectors_json() -> String {
    let vectors = AllTestVectors {
        logs: log_vectors(),
        values: value_vectors(),
    };

    serde_json::to_string_pretty(&vectors).expect("Failed to serialize vectors")
}

/// Every vector set, as serialized by [`all_vectors_json`].
#[derive(Debug, Serialize, Deserialize)]
pub struct AllTestVectors {
    /// Whole-log vectors.
    pub logs: Vec<LogVector>,
    /// Typed decoder vectors.
    pub values: Vec<ValueVector>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmkv_codec::{decode_as, ValueKind};

    #[test]
    fn test_value_vectors() {
        for vector in value_vectors() {
            let kind = ValueKind::from_name(&vector.kind).expect("known kind");
            let result = decode_as(kind, vector.blob_hex.as_str());
            match (&vector.expected, &vector.expected_error) {
                (Some(expected), None) => {
                    let value = result.unwrap_or_else(|e| panic!("{}: {e}", vector.id));
                    assert_eq!(&render_value(&value), expected, "vector {}", vector.id);
                }
                (None, Some(fragment)) => {
                    let err = result.expect_err(&vector.id).to_string();
                    assert!(err.contains(fragment.as_str()), "{}: {err}", vector.id);
                }
                _ => panic!("vector {} must expect a value or an error", vector.id),
            }
        }
    }

    #[test]
    fn test_log_vectors_are_valid_hex() {
        for vector in log_vectors() {
            let log = hex::decode(&vector.log_hex).expect("valid hex");
            let size = u32::from_le_bytes([log[0], log[1], log[2], log[3]]);
            assert_eq!(size, vector.declared_size, "vector {}", vector.id);
        }
    }

    #[test]
    fn test_all_vectors_json() {
        let json = all_vectors_json();
        let parsed: AllTestVectors = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.logs.len(), log_vectors().len());
        assert_eq!(parsed.values.len(), value_vectors().len());
    }
}
