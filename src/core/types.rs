use serde::{Serialize, Deserialize};
use std::cmp::Ordering;

/// Opaque 64-bit row identifier from the host column store.
/// The index passes these through unchanged and never interprets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId(pub i64);

impl RowId {
    pub fn new(id: i64) -> Self {
        RowId(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for RowId {
    fn from(id: i64) -> Self {
        RowId(id)
    }
}

/// One trained entry: a key and the row it points at.
/// Ordered lexicographically by (key, row_id); keys are always finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub key: f64,
    pub row_id: RowId,
}

impl Entry {
    pub fn new(key: f64, row_id: RowId) -> Self {
        Entry { key, row_id }
    }
}

impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then_with(|| self.row_id.cmp(&other.row_id))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A (key, position) sample the regression models train on.
/// `position` is the entry's index in the sorted base array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingPair {
    pub key: f64,
    pub position: usize,
}

impl TrainingPair {
    pub fn new(key: f64, position: usize) -> Self {
        TrainingPair { key, position }
    }
}

/// A query-time constant as delivered by the host's filter extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
}

impl Value {
    /// Convert to key space. Only the numeric variants have a key
    /// representation; everything else is rejected at the scan boundary.
    pub fn as_key(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}
