use tracing::debug;
use crate::core::config::ModelKind;
use crate::core::stats::ModelDump;
use crate::core::types::TrainingPair;
use crate::model::overflow::OverflowMap;
use crate::model::{Model, ModelState};
use crate::regression::linear::fit_simple_linear;

/// Single straight-line fit over the whole key space.
pub struct LinearModel {
    pub slope: f64,
    pub intercept: f64,
    pub min_error: i64,
    pub max_error: i64,
    overflow: OverflowMap,
}

impl LinearModel {
    pub fn new() -> Self {
        LinearModel {
            slope: 0.0,
            intercept: 0.0,
            min_error: 0,
            max_error: 0,
            overflow: OverflowMap::new(),
        }
    }

    pub fn from_state(state: ModelState, overflow: OverflowMap) -> Self {
        match state {
            ModelState::Linear {
                slope,
                intercept,
                min_error,
                max_error,
            } => LinearModel {
                slope,
                intercept,
                min_error,
                max_error,
                overflow,
            },
            other => unreachable!("linear model restored from {:?}", other),
        }
    }

    fn raw_predict(&self, key: f64) -> f64 {
        self.slope * key + self.intercept
    }
}

impl Default for LinearModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for LinearModel {
    fn train(&mut self, pairs: &[TrainingPair]) {
        if pairs.is_empty() {
            self.slope = 0.0;
            self.intercept = 0.0;
            self.min_error = 0;
            self.max_error = 0;
            return;
        }

        let xs: Vec<f64> = pairs.iter().map(|p| p.key).collect();
        let ys: Vec<f64> = pairs.iter().map(|p| p.position as f64).collect();
        let (slope, intercept) = fit_simple_linear(&xs, &ys);
        self.slope = slope;
        self.intercept = intercept;

        self.min_error = i64::MAX;
        self.max_error = i64::MIN;
        for pair in pairs {
            let err = pair.position as i64 - self.predict(pair.key);
            self.min_error = self.min_error.min(err);
            self.max_error = self.max_error.max(err);
        }

        debug!(
            slope = self.slope,
            intercept = self.intercept,
            min_error = self.min_error,
            max_error = self.max_error,
            pairs = pairs.len(),
            "Trained linear model"
        );
    }

    fn predict(&self, key: f64) -> i64 {
        self.raw_predict(key) as i64
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
        ModelKind::Linear
    }

    fn dump(&self) -> ModelDump {
        ModelDump::Linear {
            slope: self.slope,
            intercept: self.intercept,
        }
    }

    fn state(&self) -> ModelState {
        ModelState::Linear {
            slope: self.slope,
            intercept: self.intercept,
            min_error: self.min_error,
            max_error: self.max_error,
        }
    }
}
