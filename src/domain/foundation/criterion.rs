//! Criterion identity, polarity, and hierarchy node.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a criterion, as keyed by the caller's store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CriterionId(i64);

impl CriterionId {
    /// Creates a criterion id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CriterionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CriterionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Direction of preference for a criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    /// Higher ratings are better (quality, reliability).
    #[default]
    Benefit,
    /// Lower ratings are better (price, lead time).
    Cost,
}

impl Polarity {
    /// Returns true for benefit criteria.
    pub fn is_benefit(&self) -> bool {
        matches!(self, Polarity::Benefit)
    }
}

/// A criterion in the decision hierarchy.
///
/// Top-level criteria have `parent == None`. The `global_weight` is written
/// by the hierarchical weight propagator on each recalculation and read by
/// the ranking and sensitivity engines until the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionNode {
    pub id: CriterionId,
    pub parent: Option<CriterionId>,
    pub polarity: Polarity,
    pub global_weight: f64,
}

impl CriterionNode {
    /// Creates a top-level criterion with zero weight.
    pub fn new(id: impl Into<CriterionId>, polarity: Polarity) -> Self {
        Self {
            id: id.into(),
            parent: None,
            polarity,
            global_weight: 0.0,
        }
    }

    /// Creates a sub-criterion of the given parent.
    pub fn child_of(
        id: impl Into<CriterionId>,
        parent: impl Into<CriterionId>,
        polarity: Polarity,
    ) -> Self {
        Self {
            id: id.into(),
            parent: Some(parent.into()),
            polarity,
            global_weight: 0.0,
        }
    }

    /// Returns true if this criterion has no parent.
    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criterion_id_round_trips_value() {
        let id = CriterionId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(format!("{}", id), "42");
    }

    #[test]
    fn polarity_benefit_check() {
        assert!(Polarity::Benefit.is_benefit());
        assert!(!Polarity::Cost.is_benefit());
    }

    #[test]
    fn new_criterion_is_top_level_with_zero_weight() {
        let node = CriterionNode::new(1, Polarity::Benefit);
        assert!(node.is_top_level());
        assert_eq!(node.global_weight, 0.0);
    }

    #[test]
    fn child_of_records_parent() {
        let node = CriterionNode::child_of(5, 1, Polarity::Cost);
        assert_eq!(node.parent, Some(CriterionId::new(1)));
        assert!(!node.is_top_level());
    }

    #[test]
    fn criterion_id_serializes_transparently() {
        let id = CriterionId::new(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
    }
}
