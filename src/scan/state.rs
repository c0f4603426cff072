use crate::core::error::{Error, ErrorKind, Result};
use crate::scan::predicate::{Comparison, Predicate};

/// Life cycle of a scan. A state is consumed by its first scan call;
/// later calls yield nothing (the host re-fetches rows in batches from
/// the row-id set it already holds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Fresh,
    Checked,
    Done,
}

/// Up to two predicates over the indexed column, reduced and converted
/// to key space, plus the one-shot phase marker.
#[derive(Debug, Clone)]
pub struct ScanState {
    pub values: [Option<f64>; 2],
    pub comparisons: [Option<Comparison>; 2],
    phase: ScanPhase,
}

impl ScanState {
    /// Single-predicate scan (equality or one-sided range).
    pub fn single(comparison: Comparison, key: f64) -> Self {
        ScanState {
            values: [Some(key), None],
            comparisons: [Some(comparison), None],
            phase: ScanPhase::Fresh,
        }
    }

    /// Two-sided range scan; slot 0 is the lower bound, slot 1 the upper.
    pub fn two_sided(low: Comparison, low_key: f64, high: Comparison, high_key: f64) -> Self {
        ScanState {
            values: [Some(low_key), Some(high_key)],
            comparisons: [Some(low), Some(high)],
            phase: ScanPhase::Fresh,
        }
    }

    /// Reduce a filter's predicate list to a scan state. An equality
    /// predicate overrides any bounds; otherwise the last lower bound and
    /// the last upper bound are kept. Non-numeric constants and filters
    /// with no usable predicate are rejected here so the host can fall
    /// back to a sequential scan.
    pub fn try_from_predicates(predicates: &[Predicate]) -> Result<Self> {
        let mut equal: Option<f64> = None;
        let mut low: Option<(f64, Comparison)> = None;
        let mut high: Option<(f64, Comparison)> = None;

        for predicate in predicates {
            let key = predicate.value.as_key().ok_or_else(|| {
                Error::new(
                    ErrorKind::Predicate,
                    format!("Non-numeric predicate constant {:?}", predicate.value),
                )
            })?;

            match predicate.comparison {
                Comparison::Equal => equal = Some(key),
                Comparison::GreaterThan | Comparison::GreaterThanOrEqual => {
                    low = Some((key, predicate.comparison));
                }
                Comparison::LessThan | Comparison::LessThanOrEqual => {
                    high = Some((key, predicate.comparison));
                }
            }
        }

        if let Some(key) = equal {
            return Ok(ScanState::single(Comparison::Equal, key));
        }

        match (low, high) {
            (Some((low_key, low_cmp)), Some((high_key, high_cmp))) => {
                Ok(ScanState::two_sided(low_cmp, low_key, high_cmp, high_key))
            }
            (Some((key, cmp)), None) => Ok(ScanState::single(cmp, key)),
            (None, Some((key, cmp))) => Ok(ScanState::single(cmp, key)),
            (None, None) => Err(Error::new(
                ErrorKind::Predicate,
                "Filter contains no usable predicate".to_string(),
            )),
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn is_fresh(&self) -> bool {
        self.phase == ScanPhase::Fresh
    }

    pub fn mark_checked(&mut self) {
        self.phase = ScanPhase::Checked;
    }

    pub fn mark_done(&mut self) {
        self.phase = ScanPhase::Done;
    }
}
