use std::collections::BTreeSet;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;
use crate::core::config::IndexOptions;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::{IndexInfo, ModelDump, ResidualRecord};
use crate::core::types::{Entry, RowId};
use crate::index::base::BaseArray;
use crate::model::{clamp_position, create_model, Model};
use crate::scan::predicate::Comparison;
use crate::scan::state::ScanState;

/// Keys closer than this are considered equal on equality scans. Range
/// comparisons use the exact values.
pub const KEY_EPSILON: f64 = 1e-9;

/// Padding past the predicted window end on equality scans, tolerating
/// off-by-ones at the clamp boundaries.
pub const EQUALITY_SCAN_SLACK: usize = 10;

/// Learned secondary index over one numeric column.
///
/// Holds the sorted base array and the trained model; the model also owns
/// the overflow map for post-build mutations. Searches take a read lock,
/// mutations a write lock; the base array and trained parameters are
/// never touched after `build`.
pub struct RmiIndex {
    name: String,
    options: IndexOptions,
    base: BaseArray,
    model: RwLock<Box<dyn Model>>,
    built: bool,
    built_at: Option<DateTime<Utc>>,
}

impl RmiIndex {
    /// Create an empty, untrained index. Options are validated here;
    /// unknown models, non-numeric key types and uniqueness constraints
    /// never produce an index object.
    pub fn create(name: impl Into<String>, options: IndexOptions) -> Result<Self> {
        options.validate()?;
        let model = create_model(options.model);
        Ok(RmiIndex {
            name: name.into(),
            options,
            base: BaseArray::new(),
            model: RwLock::new(model),
            built: false,
            built_at: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    /// Number of entries in the trained part.
    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Bulk-load the sorted pipeline output and train the model. Allowed
    /// exactly once per index lifetime.
    pub fn build(&mut self, pairs: Vec<(f64, RowId)>) -> Result<()> {
        if self.built {
            return Err(Error::new(
                ErrorKind::Build,
                format!("Index '{}' is already built", self.name),
            ));
        }

        self.base = BaseArray::build(pairs);
        let training = self.base.training_pairs();
        self.model.get_mut().train(&training);
        self.built = true;
        self.built_at = Some(Utc::now());

        debug!(
            index = %self.name,
            rows = self.base.len(),
            model = self.options.model.name(),
            "Built index"
        );
        Ok(())
    }

    /// Divert a post-build row into the overflow map.
    pub fn insert(&self, key: f64, row_id: RowId) {
        self.model.write().insert_overflow(key, row_id);
    }

    /// Appends are inserts; the trained part never grows.
    pub fn append(&self, key: f64, row_id: RowId) {
        self.insert(key, row_id);
    }

    /// Remove a row from the overflow map. Rows in the trained part
    /// cannot be deleted without a rebuild.
    pub fn delete(&self, key: f64, row_id: RowId) {
        self.model.write().delete_overflow(key, row_id);
    }

    /// Execute a one-shot scan state against this index. Returns `true`
    /// when the scan ran to completion, `false` when `max_count` cut it
    /// short (the partial row-id set is still valid).
    pub fn scan(
        &self,
        state: &mut ScanState,
        max_count: usize,
        row_ids: &mut BTreeSet<RowId>,
    ) -> Result<bool> {
        if !state.is_fresh() {
            state.mark_done();
            return Ok(true);
        }
        state.mark_checked();

        let key_low = state.values[0].ok_or_else(|| {
            Error::new(ErrorKind::Internal, "Scan state has no first predicate".to_string())
        })?;

        let model = self.model.read();
        match (state.comparisons[0], state.values[1]) {
            (Some(Comparison::Equal), None) => {
                Ok(self.search_equal_locked(&**model, key_low, max_count, row_ids))
            }
            (Some(Comparison::GreaterThanOrEqual), None) => {
                Ok(self.search_greater_locked(&**model, key_low, true, max_count, row_ids))
            }
            (Some(Comparison::GreaterThan), None) => {
                Ok(self.search_greater_locked(&**model, key_low, false, max_count, row_ids))
            }
            (Some(Comparison::LessThanOrEqual), None) => {
                Ok(self.search_less_locked(&**model, key_low, true, max_count, row_ids))
            }
            (Some(Comparison::LessThan), None) => {
                Ok(self.search_less_locked(&**model, key_low, false, max_count, row_ids))
            }
            (Some(low_cmp), Some(key_high)) if low_cmp.is_lower_bound() => {
                let high_cmp = state.comparisons[1].filter(|c| c.is_upper_bound()).ok_or_else(
                    || {
                        Error::new(
                            ErrorKind::Internal,
                            "Two-sided scan without an upper bound".to_string(),
                        )
                    },
                )?;
                Ok(self.search_range_locked(
                    &**model,
                    key_low,
                    key_high,
                    low_cmp.is_inclusive(),
                    high_cmp.is_inclusive(),
                    max_count,
                    row_ids,
                ))
            }
            _ => Err(Error::new(
                ErrorKind::Internal,
                "Scan comparison combination not implemented".to_string(),
            )),
        }
    }

    pub fn search_equal(&self, key: f64, max_count: usize, row_ids: &mut BTreeSet<RowId>) -> bool {
        let model = self.model.read();
        self.search_equal_locked(&**model, key, max_count, row_ids)
    }

    pub fn search_greater(
        &self,
        key: f64,
        inclusive: bool,
        max_count: usize,
        row_ids: &mut BTreeSet<RowId>,
    ) -> bool {
        let model = self.model.read();
        self.search_greater_locked(&**model, key, inclusive, max_count, row_ids)
    }

    pub fn search_less(
        &self,
        key: f64,
        inclusive: bool,
        max_count: usize,
        row_ids: &mut BTreeSet<RowId>,
    ) -> bool {
        let model = self.model.read();
        self.search_less_locked(&**model, key, inclusive, max_count, row_ids)
    }

    pub fn search_range(
        &self,
        low: f64,
        high: f64,
        low_inclusive: bool,
        high_inclusive: bool,
        max_count: usize,
        row_ids: &mut BTreeSet<RowId>,
    ) -> bool {
        let model = self.model.read();
        self.search_range_locked(
            &**model,
            low,
            high,
            low_inclusive,
            high_inclusive,
            max_count,
            row_ids,
        )
    }

    fn search_equal_locked(
        &self,
        model: &dyn Model,
        key: f64,
        max_count: usize,
        row_ids: &mut BTreeSet<RowId>,
    ) -> bool {
        let n = self.base.len();
        let (lo, hi) = model.search_bounds(key, n);
        let end = (hi + EQUALITY_SCAN_SLACK).min(n);

        for entry in &self.base.entries()[lo..end] {
            if (entry.key - key).abs() < KEY_EPSILON {
                if !try_add(row_ids, entry.row_id, max_count) {
                    return false;
                }
            }
        }

        for (ov_key, rows) in model
            .overflow()
            .iter_between(key - KEY_EPSILON, key + KEY_EPSILON)
        {
            if (ov_key - key).abs() >= KEY_EPSILON {
                continue;
            }
            for &row_id in rows {
                if !try_add(row_ids, row_id, max_count) {
                    return false;
                }
            }
        }

        true
    }

    fn search_greater_locked(
        &self,
        model: &dyn Model,
        key: f64,
        inclusive: bool,
        max_count: usize,
        row_ids: &mut BTreeSet<RowId>,
    ) -> bool {
        let n = self.base.len();
        // Everything >= key sits at or past the envelope's lower edge
        let lo = clamp_position(model.predict(key).saturating_add(model.min_error()), n);

        for entry in &self.base.entries()[lo..] {
            let matches = if inclusive { entry.key >= key } else { entry.key > key };
            if matches && !try_add(row_ids, entry.row_id, max_count) {
                return false;
            }
        }

        for (ov_key, rows) in model.overflow().iter_from(key) {
            if !inclusive && ov_key == key {
                continue;
            }
            for &row_id in rows {
                if !try_add(row_ids, row_id, max_count) {
                    return false;
                }
            }
        }

        true
    }

    fn search_less_locked(
        &self,
        model: &dyn Model,
        key: f64,
        inclusive: bool,
        max_count: usize,
        row_ids: &mut BTreeSet<RowId>,
    ) -> bool {
        let n = self.base.len();
        let end = clamp_position(
            model
                .predict(key)
                .saturating_add(model.max_error())
                .saturating_add(1),
            n,
        );

        for entry in &self.base.entries()[..end] {
            let matches = if inclusive { entry.key <= key } else { entry.key < key };
            if matches && !try_add(row_ids, entry.row_id, max_count) {
                return false;
            }
        }

        for (ov_key, rows) in model.overflow().iter() {
            let matches = if inclusive { ov_key <= key } else { ov_key < key };
            if !matches {
                // Buckets are key-ordered; nothing further can match
                break;
            }
            for &row_id in rows {
                if !try_add(row_ids, row_id, max_count) {
                    return false;
                }
            }
        }

        true
    }

    #[allow(clippy::too_many_arguments)]
    fn search_range_locked(
        &self,
        model: &dyn Model,
        low: f64,
        high: f64,
        low_inclusive: bool,
        high_inclusive: bool,
        max_count: usize,
        row_ids: &mut BTreeSet<RowId>,
    ) -> bool {
        let n = self.base.len();
        let lo = clamp_position(model.predict(low).saturating_add(model.min_error()), n);
        let end = clamp_position(
            model
                .predict(high)
                .saturating_add(model.max_error())
                .saturating_add(1),
            n,
        );

        // An inverted range (low > high) leaves lo past end; scan nothing
        for entry in &self.base.entries()[lo..end.max(lo)] {
            let above = if low_inclusive { entry.key >= low } else { entry.key > low };
            let below = if high_inclusive { entry.key <= high } else { entry.key < high };
            if above && below && !try_add(row_ids, entry.row_id, max_count) {
                return false;
            }
        }

        for (ov_key, rows) in model.overflow().iter_from(low) {
            if !low_inclusive && ov_key == low {
                continue;
            }
            let past = if high_inclusive { ov_key > high } else { ov_key >= high };
            if past {
                break;
            }
            for &row_id in rows {
                if !try_add(row_ids, row_id, max_count) {
                    return false;
                }
            }
        }

        true
    }

    /// Monitoring snapshot: row count, model name, envelope, overflow size.
    pub fn info(&self) -> IndexInfo {
        let model = self.model.read();
        IndexInfo {
            name: self.name.clone(),
            model: model.kind().name().to_string(),
            total_rows: self.base.len(),
            min_error: model.min_error(),
            max_error: model.max_error(),
            overflow_keys: model.overflow().key_count(),
            built: self.built,
            built_at: self.built_at,
        }
    }

    /// Variant-specific parameter dump of the trained model.
    pub fn model_dump(&self) -> ModelDump {
        self.model.read().dump()
    }

    /// The trained (key, row_id) entries in sorted order.
    pub fn dump_entries(&self) -> &[Entry] {
        self.base.entries()
    }

    /// Overflow contents as (key, row ids) pairs in ascending key order.
    pub fn dump_overflow(&self) -> Vec<(f64, Vec<RowId>)> {
        self.model.read().overflow().to_pairs()
    }

    /// Per-entry model predictions next to the envelope, for inspecting
    /// fit quality.
    pub fn model_residuals(&self) -> Vec<ResidualRecord> {
        let model = self.model.read();
        self.base
            .entries()
            .iter()
            .map(|entry| ResidualRecord {
                key: entry.key,
                row_id: entry.row_id,
                predicted: model.predict(entry.key),
                min_error: model.min_error(),
                max_error: model.max_error(),
            })
            .collect()
    }

    pub(crate) fn base(&self) -> &BaseArray {
        &self.base
    }

    pub(crate) fn model(&self) -> &RwLock<Box<dyn Model>> {
        &self.model
    }

    pub(crate) fn built_at(&self) -> Option<DateTime<Utc>> {
        self.built_at
    }

    pub(crate) fn restore(
        name: String,
        options: IndexOptions,
        base: BaseArray,
        model: Box<dyn Model>,
        built: bool,
        built_at: Option<DateTime<Utc>>,
    ) -> Self {
        RmiIndex {
            name,
            options,
            base,
            model: RwLock::new(model),
            built,
            built_at,
        }
    }

    pub(crate) fn is_built(&self) -> bool {
        self.built
    }
}

/// Add a row id unless that would push the set past `max_count`.
fn try_add(row_ids: &mut BTreeSet<RowId>, row_id: RowId, max_count: usize) -> bool {
    if row_ids.len() + 1 > max_count {
        return false;
    }
    row_ids.insert(row_id);
    true
}
