use rayon::slice::ParallelSliceMut;
use tracing::warn;
use crate::core::types::{Entry, RowId, TrainingPair};

/// Builds at or above this many entries sort in parallel.
const PARALLEL_SORT_THRESHOLD: usize = 1 << 16;

/// The trained half of the index: a contiguous (key, row_id) array,
/// sorted by (key, row_id) and immutable once built.
#[derive(Debug, Clone, Default)]
pub struct BaseArray {
    entries: Vec<Entry>,
}

impl BaseArray {
    pub fn new() -> Self {
        BaseArray {
            entries: Vec::new(),
        }
    }

    /// Take ownership of the bulk pipeline's output. Upstream sorts by
    /// key only, so re-sort with the (key, row_id) tie-break; non-finite
    /// keys are dropped (nulls were already filtered a layer up).
    pub fn build(pairs: Vec<(f64, RowId)>) -> Self {
        let mut entries: Vec<Entry> = Vec::with_capacity(pairs.len());
        let mut skipped = 0usize;
        for (key, row_id) in pairs {
            if !key.is_finite() {
                skipped += 1;
                continue;
            }
            entries.push(Entry::new(key, row_id));
        }
        if skipped > 0 {
            warn!(skipped, "Dropped non-finite keys from index build");
        }

        if entries.len() >= PARALLEL_SORT_THRESHOLD {
            entries.par_sort_unstable();
        } else {
            entries.sort_unstable();
        }

        BaseArray { entries }
    }

    pub fn from_entries(entries: Vec<Entry>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0] <= w[1]));
        BaseArray { entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The (key, position) samples the model trains on.
    pub fn training_pairs(&self) -> Vec<TrainingPair> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| TrainingPair::new(e.key, i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_resorts_by_key_then_row_id() {
        let base = BaseArray::build(vec![
            (3.0, RowId(1)),
            (1.0, RowId(9)),
            (3.0, RowId(0)),
            (2.0, RowId(4)),
        ]);
        let order: Vec<(f64, i64)> = base.entries().iter().map(|e| (e.key, e.row_id.0)).collect();
        assert_eq!(order, vec![(1.0, 9), (2.0, 4), (3.0, 0), (3.0, 1)]);
    }

    #[test]
    fn build_drops_non_finite_keys() {
        let base = BaseArray::build(vec![
            (f64::NAN, RowId(1)),
            (f64::INFINITY, RowId(2)),
            (5.0, RowId(3)),
        ]);
        assert_eq!(base.len(), 1);
        assert_eq!(base.entries()[0].row_id, RowId(3));
    }

    #[test]
    fn training_pairs_enumerate_positions() {
        let base = BaseArray::build(vec![(10.0, RowId(1)), (20.0, RowId(2))]);
        let pairs = base.training_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].position, 0);
        assert_eq!(pairs[1].position, 1);
        assert_eq!(pairs[1].key, 20.0);
    }
}
