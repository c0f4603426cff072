use tracing::debug;
use crate::core::config::ModelKind;
use crate::core::stats::{LeafDump, ModelDump};
use crate::core::types::TrainingPair;
use crate::model::overflow::OverflowMap;
use crate::model::{Model, ModelState};
use crate::regression::linear::fit_simple_linear;

/// Two-stage piecewise model: a root line routes a key to one of
/// K = ⌊√N⌋ equal-width segments, each carrying its own linear leaf fit.
/// The root is trained against scaled targets (position·K/N) so its
/// output is already a segment number.
pub struct TwoLayerModel {
    pub root_slope: f64,
    pub root_intercept: f64,
    pub segments: usize,
    pub leaf_slopes: Vec<f64>,
    pub leaf_intercepts: Vec<f64>,
    pub segment_bounds: Vec<usize>,
    pub min_error: i64,
    pub max_error: i64,
    overflow: OverflowMap,
}

impl TwoLayerModel {
    pub fn new() -> Self {
        TwoLayerModel {
            root_slope: 0.0,
            root_intercept: 0.0,
            segments: 0,
            leaf_slopes: Vec::new(),
            leaf_intercepts: Vec::new(),
            segment_bounds: Vec::new(),
            min_error: 0,
            max_error: 0,
            overflow: OverflowMap::new(),
        }
    }

    pub fn from_state(state: ModelState, overflow: OverflowMap) -> Self {
        match state {
            ModelState::TwoLayer {
                root_slope,
                root_intercept,
                segments,
                leaf_slopes,
                leaf_intercepts,
                segment_bounds,
                min_error,
                max_error,
            } => TwoLayerModel {
                root_slope,
                root_intercept,
                segments,
                leaf_slopes,
                leaf_intercepts,
                segment_bounds,
                min_error,
                max_error,
                overflow,
            },
            other => unreachable!("two-layer model restored from {:?}", other),
        }
    }

    /// Route a key to a segment, clamped into [0, K).
    pub fn predict_segment(&self, key: f64) -> usize {
        if self.segments == 0 {
            return 0;
        }
        let seg = (self.root_slope * key + self.root_intercept).floor();
        if seg < 0.0 {
            0
        } else {
            (seg as usize).min(self.segments - 1)
        }
    }

    fn predict_leaf(&self, seg: usize, key: f64) -> i64 {
        (self.leaf_slopes[seg] * key + self.leaf_intercepts[seg]) as i64
    }

    fn train_root(&mut self, pairs: &[TrainingPair]) {
        let n = pairs.len();
        let k = self.segments;
        let xs: Vec<f64> = pairs.iter().map(|p| p.key).collect();
        // Scaled targets: the root learns segment numbers, not positions
        let ys: Vec<f64> = pairs
            .iter()
            .map(|p| p.position as f64 * k as f64 / n as f64)
            .collect();
        let (slope, intercept) = fit_simple_linear(&xs, &ys);
        self.root_slope = slope;
        self.root_intercept = intercept;
    }

    fn build_segments(&mut self, pairs: &[TrainingPair]) {
        let n = pairs.len();
        let k = self.segments;

        self.leaf_slopes = vec![0.0; k];
        self.leaf_intercepts = vec![0.0; k];
        self.segment_bounds = vec![0; k + 1];

        let seg_size = (n / k).max(1);
        let mut start = 0;

        for seg in 0..k {
            // The last segment absorbs the division remainder
            let end = if seg == k - 1 { n } else { (start + seg_size).min(n) };
            self.segment_bounds[seg] = start;

            if end - start < 2 {
                self.leaf_slopes[seg] = 0.0;
                self.leaf_intercepts[seg] = start as f64;
                start = end;
                continue;
            }

            let xs: Vec<f64> = pairs[start..end].iter().map(|p| p.key).collect();
            let ys: Vec<f64> = pairs[start..end].iter().map(|p| p.position as f64).collect();
            let (slope, intercept) = fit_simple_linear(&xs, &ys);
            self.leaf_slopes[seg] = slope;
            self.leaf_intercepts[seg] = intercept;

            start = end;
        }

        self.segment_bounds[k] = n;
    }

    fn compute_envelope(&mut self, pairs: &[TrainingPair]) {
        self.min_error = i64::MAX;
        self.max_error = i64::MIN;

        for pair in pairs {
            let truth = pair.position as i64;
            let primary_seg = self.predict_segment(pair.key);
            let primary = self.predict_leaf(primary_seg, pair.key);

            // Probe the neighbouring leaves for the closest prediction
            let mut best = primary;
            for cand in [primary_seg.saturating_sub(1), primary_seg + 1] {
                if cand >= self.segments || cand == primary_seg {
                    continue;
                }
                let alt = self.predict_leaf(cand, pair.key);
                if (truth - alt).abs() < (truth - best).abs() {
                    best = alt;
                }
            }

            // The lookup path only ever evaluates the predicted leaf, so
            // the primary residual must stay inside the envelope too.
            for pred in [best, primary] {
                let err = truth - pred;
                self.min_error = self.min_error.min(err);
                self.max_error = self.max_error.max(err);
            }
        }
    }
}

impl Default for TwoLayerModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for TwoLayerModel {
    fn train(&mut self, pairs: &[TrainingPair]) {
        let n = pairs.len();
        if n == 0 {
            self.root_slope = 0.0;
            self.root_intercept = 0.0;
            self.segments = 0;
            self.leaf_slopes.clear();
            self.leaf_intercepts.clear();
            self.segment_bounds.clear();
            self.min_error = 0;
            self.max_error = 0;
            return;
        }

        self.segments = ((n as f64).sqrt().floor() as usize).max(1);

        self.train_root(pairs);
        self.build_segments(pairs);
        self.compute_envelope(pairs);

        debug!(
            segments = self.segments,
            root_slope = self.root_slope,
            root_intercept = self.root_intercept,
            min_error = self.min_error,
            max_error = self.max_error,
            pairs = n,
            "Trained two-layer model"
        );
    }

    fn predict(&self, key: f64) -> i64 {
        if self.segments == 0 {
            return 0;
        }
        let seg = self.predict_segment(key);
        self.predict_leaf(seg, key)
    }

    fn min_error(&self) -> i64 {
        self.min_error
    }

    fn max_error(&self) -> i64 {
        self.max_error
    }

    fn overflow(&self) -> &OverflowMap {
        &self.overflow
    }

    fn overflow_mut(&mut self) -> &mut OverflowMap {
        &mut self.overflow
    }

    fn kind(&self) -> ModelKind {
        ModelKind::TwoLayer
    }

    fn dump(&self) -> ModelDump {
        let leaves = (0..self.segments)
            .map(|seg| LeafDump {
                slope: self.leaf_slopes[seg],
                intercept: self.leaf_intercepts[seg],
                start: self.segment_bounds[seg],
            })
            .collect();
        ModelDump::TwoLayer {
            root_slope: self.root_slope,
            root_intercept: self.root_intercept,
            segments: self.segments,
            leaves,
        }
    }

    fn state(&self) -> ModelState {
        ModelState::TwoLayer {
            root_slope: self.root_slope,
            root_intercept: self.root_intercept,
            segments: self.segments,
            leaf_slopes: self.leaf_slopes.clone(),
            leaf_intercepts: self.leaf_intercepts.clone(),
            segment_bounds: self.segment_bounds.clone(),
            min_error: self.min_error,
            max_error: self.max_error,
        }
    }
}
