pub mod overflow;
pub mod linear;
pub mod poly;
pub mod two_layer;

use serde::{Serialize, Deserialize};
use crate::core::config::ModelKind;
use crate::core::stats::ModelDump;
use crate::core::types::{RowId, TrainingPair};
use crate::model::linear::LinearModel;
use crate::model::overflow::OverflowMap;
use crate::model::poly::PolyModel;
use crate::model::two_layer::TwoLayerModel;

/// A position-regression model plus its overflow side structure.
///
/// Implementations share a contract, not state: train once on sorted
/// (key, position) pairs, predict a position for any key, and report the
/// signed residual envelope observed during training. `predict` may fall
/// outside [0, total_rows); callers clamp through `search_bounds`.
pub trait Model: Send + Sync {
    /// Fit parameters and compute the error envelope. Called exactly once.
    fn train(&mut self, pairs: &[TrainingPair]);

    /// Position estimate for a key, as a signed value.
    fn predict(&self, key: f64) -> i64;

    /// Smallest observed residual (truth - prediction) on the training set.
    fn min_error(&self) -> i64;

    /// Largest observed residual on the training set.
    fn max_error(&self) -> i64;

    fn overflow(&self) -> &OverflowMap;

    fn overflow_mut(&mut self) -> &mut OverflowMap;

    fn kind(&self) -> ModelKind;

    /// Variant-specific parameter dump for introspection.
    fn dump(&self) -> ModelDump;

    /// Trained parameters for the snapshot format (overflow is captured
    /// separately by the index).
    fn state(&self) -> ModelState;

    /// Half-open scan window [lo, hi) that contains the true position of
    /// every key seen in training. The upper end is exclusive, hence the
    /// + 1 past the largest residual.
    fn search_bounds(&self, key: f64, total_rows: usize) -> (usize, usize) {
        let p = self.predict(key);
        let lo = clamp_position(p.saturating_add(self.min_error()), total_rows);
        let hi = clamp_position(
            p.saturating_add(self.max_error()).saturating_add(1),
            total_rows,
        );
        (lo, hi.max(lo))
    }

    fn insert_overflow(&mut self, key: f64, row_id: RowId) {
        self.overflow_mut().insert(key, row_id);
    }

    fn delete_overflow(&mut self, key: f64, row_id: RowId) {
        self.overflow_mut().delete(key, row_id);
    }
}

/// Clamp a signed position into [0, total_rows].
pub(crate) fn clamp_position(value: i64, total_rows: usize) -> usize {
    if value < 0 {
        0
    } else {
        (value as usize).min(total_rows)
    }
}

/// Instantiate an untrained model of the requested kind.
pub fn create_model(kind: ModelKind) -> Box<dyn Model> {
    match kind {
        ModelKind::Linear => Box::new(LinearModel::new()),
        ModelKind::Poly => Box::new(PolyModel::new()),
        ModelKind::TwoLayer => Box::new(TwoLayerModel::new()),
    }
}

/// Trained parameters of a model, as stored in an index snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelState {
    Linear {
        slope: f64,
        intercept: f64,
        min_error: i64,
        max_error: i64,
    },
    Poly {
        coeffs: Vec<f64>,
        min_error: i64,
        max_error: i64,
    },
    TwoLayer {
        root_slope: f64,
        root_intercept: f64,
        segments: usize,
        leaf_slopes: Vec<f64>,
        leaf_intercepts: Vec<f64>,
        segment_bounds: Vec<usize>,
        min_error: i64,
        max_error: i64,
    },
}

/// Rebuild a model from snapshot state without retraining.
pub fn restore_model(state: ModelState, overflow: OverflowMap) -> Box<dyn Model> {
    match state {
        ModelState::Linear { .. } => Box::new(LinearModel::from_state(state, overflow)),
        ModelState::Poly { .. } => Box::new(PolyModel::from_state(state, overflow)),
        ModelState::TwoLayer { .. } => Box::new(TwoLayerModel::from_state(state, overflow)),
    }
}
