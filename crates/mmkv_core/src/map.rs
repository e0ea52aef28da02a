//! Reconstruction of the key-to-history map from scanned records.

use crate::config::TombstonePolicy;
use crate::log::{LogRecord, StopReason};
use bytes::Bytes;
use mmkv_codec::{decode_as, CodecResult, Value, ValueKind};
use std::collections::btree_map::{self, BTreeMap};

/// Counters collected while scanning a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    /// Number of value records applied.
    pub records: u64,
    /// Number of tombstone records seen.
    pub tombstones: u64,
    /// Bytes consumed after the 4-byte header.
    pub bytes_scanned: u64,
    /// Why the scan ended.
    pub stop_reason: StopReason,
}

/// Accumulates records into a [`DecodedMap`].
///
/// Values are appended in log order and reversed once in [`MapBuilder::finish`],
/// so each history ends up most-recent-first without shifting on every insert.
#[derive(Debug)]
pub struct MapBuilder {
    entries: BTreeMap<String, Vec<Bytes>>,
    policy: TombstonePolicy,
    records: u64,
    tombstones: u64,
}

impl MapBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new(policy: TombstonePolicy) -> Self {
        Self {
            entries: BTreeMap::new(),
            policy,
            records: 0,
            tombstones: 0,
        }
    }

    /// Applies a single record.
    pub fn apply(&mut self, record: LogRecord) {
        match record {
            LogRecord::Put { key, value, .. } => {
                self.records += 1;
                self.entries.entry(key).or_default().push(value);
            }
            LogRecord::Remove { key, .. } => {
                self.tombstones += 1;
                if self.policy == TombstonePolicy::ClearHistory {
                    self.entries.remove(&key);
                }
            }
        }
    }

    /// Finishes the map.
    #[must_use]
    pub fn finish(mut self, bytes_scanned: u64, stop_reason: StopReason) -> DecodedMap {
        for history in self.entries.values_mut() {
            history.reverse();
        }
        DecodedMap {
            entries: self.entries,
            summary: ScanSummary {
                records: self.records,
                tombstones: self.tombstones,
                bytes_scanned,
                stop_reason,
            },
        }
    }
}

/// Every key in a log mapped to its raw value blobs, most recent first.
///
/// Values are untyped; decode them with [`DecodedMap::get_as`] or the
/// `as_*` functions from `mmkv_codec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMap {
    entries: BTreeMap<String, Vec<Bytes>>,
    summary: ScanSummary,
}

impl DecodedMap {
    /// All recorded values for `key`, most recent first.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[Bytes]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// The most recent value for `key`.
    #[must_use]
    pub fn latest(&self, key: &str) -> Option<&Bytes> {
        self.entries.get(key).and_then(|history| history.first())
    }

    /// Decodes the most recent value for `key` as `kind`.
    ///
    /// Returns `None` if the key is absent.
    pub fn get_as(&self, key: &str, kind: ValueKind) -> Option<CodecResult<Value>> {
        self.latest(key).map(|blob| decode_as(kind, blob))
    }

    /// Returns `true` if `key` has at least one value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over keys and their histories in key order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no key has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Scan counters for the log this map was built from.
    #[must_use]
    pub fn summary(&self) -> &ScanSummary {
        &self.summary
    }

    /// Consumes the map, returning the underlying key-to-history map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, Vec<Bytes>> {
        self.entries
    }
}

/// Iterator over `(key, history)` pairs of a [`DecodedMap`].
#[derive(Debug)]
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, String, Vec<Bytes>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a [Bytes]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(key, history)| (key.as_str(), history.as_slice()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a DecodedMap {
    type Item = (&'a str, &'a [Bytes]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
