use serde::{Serialize, Deserialize};
use crate::core::types::Value;

/// Comparison operator of a filter predicate, as delivered by the host
/// after expression matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    Equal,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl Comparison {
    /// Lower-bound side of a range (`>` or `>=`).
    pub fn is_lower_bound(&self) -> bool {
        matches!(self, Comparison::GreaterThan | Comparison::GreaterThanOrEqual)
    }

    /// Upper-bound side of a range (`<` or `<=`).
    pub fn is_upper_bound(&self) -> bool {
        matches!(self, Comparison::LessThan | Comparison::LessThanOrEqual)
    }

    pub fn is_inclusive(&self) -> bool {
        matches!(
            self,
            Comparison::Equal | Comparison::GreaterThanOrEqual | Comparison::LessThanOrEqual
        )
    }
}

/// One (constant, comparison) pair extracted from a filter. BETWEEN
/// arrives as two predicates, one per bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub value: Value,
    pub comparison: Comparison,
}

impl Predicate {
    pub fn new(comparison: Comparison, value: Value) -> Self {
        Predicate { value, comparison }
    }
}
