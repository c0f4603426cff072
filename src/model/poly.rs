use tracing::debug;
use crate::core::config::ModelKind;
use crate::core::stats::ModelDump;
use crate::core::types::TrainingPair;
use crate::model::overflow::OverflowMap;
use crate::model::{Model, ModelState};
use crate::regression::poly::{eval_polynomial, fit_best_polynomial, MAX_POLY_DEGREE};

/// Best-fit polynomial over the whole key space, degree chosen by
/// training MSE up to MAX_POLY_DEGREE.
pub struct PolyModel {
    pub coeffs: Vec<f64>,
    pub min_error: i64,
    pub max_error: i64,
    overflow: OverflowMap,
}

impl PolyModel {
    pub fn new() -> Self {
        PolyModel {
            coeffs: vec![0.0],
            min_error: 0,
            max_error: 0,
            overflow: OverflowMap::new(),
        }
    }

    pub fn from_state(state: ModelState, overflow: OverflowMap) -> Self {
        match state {
            ModelState::Poly {
                coeffs,
                min_error,
                max_error,
            } => PolyModel {
                coeffs,
                min_error,
                max_error,
                overflow,
            },
            other => unreachable!("poly model restored from {:?}", other),
        }
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }
}

impl Default for PolyModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for PolyModel {
    fn train(&mut self, pairs: &[TrainingPair]) {
        if pairs.is_empty() {
            self.coeffs = vec![0.0];
            self.min_error = 0;
            self.max_error = 0;
            return;
        }

        let xs: Vec<f64> = pairs.iter().map(|p| p.key).collect();
        let ys: Vec<f64> = pairs.iter().map(|p| p.position as f64).collect();
        self.coeffs = fit_best_polynomial(&xs, &ys, MAX_POLY_DEGREE);

        self.min_error = i64::MAX;
        self.max_error = i64::MIN;
        for pair in pairs {
            let err = pair.position as i64 - self.predict(pair.key);
            self.min_error = self.min_error.min(err);
            self.max_error = self.max_error.max(err);
        }

        debug!(
            degree = self.degree(),
            min_error = self.min_error,
            max_error = self.max_error,
            pairs = pairs.len(),
            "Trained polynomial model"
        );
    }

    fn predict(&self, key: f64) -> i64 {
        eval_polynomial(&self.coeffs, key) as i64
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
        ModelKind::Poly
    }

    fn dump(&self) -> ModelDump {
        ModelDump::Poly {
            degree: self.degree(),
            coeffs: self.coeffs.clone(),
        }
    }

    fn state(&self) -> ModelState {
        ModelState::Poly {
            coeffs: self.coeffs.clone(),
            min_error: self.min_error,
            max_error: self.max_error,
        }
    }
}
