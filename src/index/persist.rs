use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use tracing::debug;
use crate::core::config::IndexOptions;
use crate::core::error::Result;
use crate::core::types::{Entry, RowId};
use crate::index::base::BaseArray;
use crate::index::rmi::RmiIndex;
use crate::model::overflow::OverflowMap;
use crate::model::{restore_model, ModelState};

/// Everything needed to bring an index back without retraining: the
/// sorted entries, the trained model parameters and envelope, and the
/// overflow contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub name: String,
    pub options: IndexOptions,
    pub entries: Vec<Entry>,
    pub model: ModelState,
    pub overflow: Vec<(f64, Vec<RowId>)>,
    pub built: bool,
    pub built_at: Option<DateTime<Utc>>,
}

impl IndexSnapshot {
    pub fn capture(index: &RmiIndex) -> Self {
        let model = index.model().read();
        IndexSnapshot {
            name: index.name().to_string(),
            options: index.options().clone(),
            entries: index.base().entries().to_vec(),
            model: model.state(),
            overflow: model.overflow().to_pairs(),
            built: index.is_built(),
            built_at: index.built_at(),
        }
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        bincode::serialize_into(BufWriter::new(file), self)?;
        debug!(
            index = %self.name,
            rows = self.entries.len(),
            path = %path.as_ref().display(),
            "Saved index snapshot"
        );
        Ok(())
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let snapshot = bincode::deserialize_from(BufReader::new(file))?;
        Ok(snapshot)
    }

    /// Rebuild the index from this snapshot. Options are re-validated;
    /// the model is restored from its parameters, not retrained.
    pub fn restore(self) -> Result<RmiIndex> {
        self.options.validate()?;
        let overflow = OverflowMap::from_pairs(self.overflow);
        let model = restore_model(self.model, overflow);
        Ok(RmiIndex::restore(
            self.name,
            self.options,
            BaseArray::from_entries(self.entries),
            model,
            self.built,
            self.built_at,
        ))
    }
}
