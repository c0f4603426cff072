pub mod core;
pub mod regression;
pub mod model;
pub mod index;
pub mod scan;

/*
┌──────────────────────────────── RMINDEX STRUCTURE ────────────────────────────────┐
│                                                                                    │
│  ┌──────────────────────────── struct RmiIndex ───────────────────────────────┐   │
│  │ options: IndexOptions             // model choice, key type, constraint    │   │
│  │ base: BaseArray                   // sorted (key, row_id), frozen at build │   │
│  │ model: RwLock<Box<dyn Model>>     // trained params + overflow map         │   │
│  │ built / built_at                  // build happens exactly once            │   │
│  └────────────────────────────────────────────────────────────────────────────┘   │
│          │ build                  │ insert/delete          │ scan                  │
│          ▼                        ▼                        ▼                       │
│  ┌───────────────┐      ┌──────────────────┐      ┌─────────────────────┐         │
│  │ regression::  │      │ model::overflow  │      │ scan::ScanState     │         │
│  │ fit + solve   │      │ BTreeMap buckets │      │ 1-2 predicates,     │         │
│  │ (train-time)  │      │ (post-build rows)│      │ one-shot dispatch   │         │
│  └───────────────┘      └──────────────────┘      └─────────────────────┘         │
│                                                                                    │
│  Query path: predict(key) + error envelope → bounded scan of BaseArray            │
│              → ordered overflow walk → ascending BTreeSet<RowId>                  │
└────────────────────────────────────────────────────────────────────────────────────┘
*/

pub use crate::core::config::{IndexConstraint, IndexOptions, KeyType, ModelKind};
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::stats::{IndexInfo, LeafDump, ModelDump, ResidualRecord};
pub use crate::core::types::{Entry, RowId, TrainingPair, Value};
pub use crate::index::persist::IndexSnapshot;
pub use crate::index::rmi::{RmiIndex, EQUALITY_SCAN_SLACK, KEY_EPSILON};
pub use crate::model::{create_model, Model, ModelState};
pub use crate::scan::predicate::{Comparison, Predicate};
pub use crate::scan::state::{ScanPhase, ScanState};
