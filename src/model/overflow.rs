use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Bound;
use crate::core::types::RowId;

/// f64 key with a total order, so it can live in an ordered map.
/// Build and mutation paths only ever hand us finite keys, where
/// total_cmp agrees with the numeric order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverflowKey(pub f64);

impl Eq for OverflowKey {}

impl Ord for OverflowKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for OverflowKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Side structure for keys that arrive after the model was trained.
/// Buckets are kept in ascending key order so range scans can walk
/// forward from a lower bound.
#[derive(Debug, Clone, Default)]
pub struct OverflowMap {
    buckets: BTreeMap<OverflowKey, Vec<RowId>>,
}

impl OverflowMap {
    pub fn new() -> Self {
        OverflowMap {
            buckets: BTreeMap::new(),
        }
    }

    /// Append a row id to the key's bucket. Duplicate (key, row_id)
    /// pairs are dropped silently.
    pub fn insert(&mut self, key: f64, row_id: RowId) {
        let bucket = self.buckets.entry(OverflowKey(key)).or_default();
        if !bucket.contains(&row_id) {
            bucket.push(row_id);
        }
    }

    /// Remove the first matching row id; the bucket is erased once empty.
    pub fn delete(&mut self, key: f64, row_id: RowId) {
        if let Some(bucket) = self.buckets.get_mut(&OverflowKey(key)) {
            if let Some(pos) = bucket.iter().position(|r| *r == row_id) {
                bucket.remove(pos);
            }
            if bucket.is_empty() {
                self.buckets.remove(&OverflowKey(key));
            }
        }
    }

    /// Number of distinct keys held.
    pub fn key_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// All buckets in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &[RowId])> {
        self.buckets.iter().map(|(k, v)| (k.0, v.as_slice()))
    }

    /// Buckets with key >= `low`, ascending.
    pub fn iter_from(&self, low: f64) -> impl Iterator<Item = (f64, &[RowId])> {
        self.buckets
            .range((Bound::Included(OverflowKey(low)), Bound::Unbounded))
            .map(|(k, v)| (k.0, v.as_slice()))
    }

    /// Buckets with key in [low, high], ascending.
    pub fn iter_between(&self, low: f64, high: f64) -> impl Iterator<Item = (f64, &[RowId])> {
        self.buckets
            .range(OverflowKey(low)..=OverflowKey(high))
            .map(|(k, v)| (k.0, v.as_slice()))
    }

    /// Flatten to (key, row ids) pairs, for snapshots and dumps.
    pub fn to_pairs(&self) -> Vec<(f64, Vec<RowId>)> {
        self.buckets.iter().map(|(k, v)| (k.0, v.clone())).collect()
    }

    pub fn from_pairs(pairs: Vec<(f64, Vec<RowId>)>) -> Self {
        let mut map = OverflowMap::new();
        for (key, rows) in pairs {
            for row_id in rows {
                map.insert(key, row_id);
            }
        }
        map
    }
}
