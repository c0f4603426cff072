use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use crate::core::types::RowId;

/// Read-only snapshot of an index for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexInfo {
    pub name: String,
    pub model: String,
    pub total_rows: usize,
    pub min_error: i64,
    pub max_error: i64,
    pub overflow_keys: usize,
    pub built: bool,
    pub built_at: Option<DateTime<Utc>>,
}

/// Variant-specific parameter dump of a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelDump {
    Linear {
        slope: f64,
        intercept: f64,
    },
    Poly {
        degree: usize,
        coeffs: Vec<f64>,
    },
    TwoLayer {
        root_slope: f64,
        root_intercept: f64,
        segments: usize,
        leaves: Vec<LeafDump>,
    },
}

/// Parameters of one two-layer leaf model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeafDump {
    pub slope: f64,
    pub intercept: f64,
    pub start: usize,      // Starting position of the segment
}

/// One trained entry with its model prediction, for the model-stats dump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidualRecord {
    pub key: f64,
    pub row_id: RowId,
    pub predicted: i64,
    pub min_error: i64,
    pub max_error: i64,
}
