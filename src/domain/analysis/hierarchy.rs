//! Hierarchical weight propagation across the criteria forest.
//!
//! Criteria form a forest: a top-level "main" group plus one sibling
//! group per parent. Each group is weighted locally with Fuzzy AHP (or
//! an equal split when no comparisons exist), local weights are
//! multiplied down the tree, and the leaf set is renormalized to sum 1.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::domain::foundation::{AnalysisError, CriterionId, CriterionNode};

use super::{ComparisonRecord, Consistency, FuzzyAhpEngine, FuzzyComparisonMatrix};

/// Key identifying one sibling group of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupKey {
    /// The top-level (parentless) criteria.
    Main,
    /// The children of one parent criterion.
    Sub(CriterionId),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Main => write!(f, "main"),
            GroupKey::Sub(parent) => write!(f, "sub_{}", parent),
        }
    }
}

/// Consistency diagnostics for one sibling group, kept for UI display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConsistency {
    pub consistency: Consistency,
    /// The first expert's matrix for the group, retained so the UI can
    /// run an inconsistency diagnosis against it.
    pub source_matrix: FuzzyComparisonMatrix,
}

/// Result of propagating weights through the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchicalWeights {
    /// Global weight per criterion id. Leaf weights sum to 1.
    pub global_weights: HashMap<CriterionId, f64>,
    /// Per-group consistency info, keyed "main" or "sub_<parent id>".
    pub group_consistency: HashMap<String, GroupConsistency>,
}

impl HierarchicalWeights {
    /// Returns the global weight of a criterion, 0 if unknown.
    pub fn weight_of(&self, id: CriterionId) -> f64 {
        self.global_weights.get(&id).copied().unwrap_or(0.0)
    }
}

/// Hierarchy traversal and weight composition functions.
pub struct HierarchicalWeightPropagator;

impl HierarchicalWeightPropagator {
    /// Calculates global weights for the whole hierarchy and writes them
    /// into each node's `global_weight`.
    ///
    /// Groups with comparison matrices are weighted by
    /// [`FuzzyAhpEngine::calculate_weights`]; groups without data split
    /// their parent's weight equally. After traversal, exactly the leaf
    /// set is renormalized to sum 1; parent weights are left as composed.
    ///
    /// # Errors
    /// - `NoData` if `criteria` is empty.
    /// - `DimensionMismatch` if a group's matrices disagree with the
    ///   group's size.
    pub fn propagate(
        criteria: &mut [CriterionNode],
        comparisons_by_group: &HashMap<GroupKey, Vec<FuzzyComparisonMatrix>>,
    ) -> Result<HierarchicalWeights, AnalysisError> {
        if criteria.is_empty() {
            return Err(AnalysisError::no_data("criteria"));
        }

        // Arena-style indexes over the flat list: id -> index and
        // parent -> ordered child indexes.
        let mut children: HashMap<Option<CriterionId>, Vec<usize>> = HashMap::new();
        for (idx, node) in criteria.iter().enumerate() {
            children.entry(node.parent).or_default().push(idx);
        }

        let mut weights: HashMap<CriterionId, f64> = HashMap::new();
        let mut group_consistency: HashMap<String, GroupConsistency> = HashMap::new();

        let main_group = children.get(&None).cloned().unwrap_or_default();
        let main_weights = Self::group_weights(
            GroupKey::Main,
            main_group.len(),
            1.0,
            comparisons_by_group,
            &mut group_consistency,
        )?;
        for (&idx, &weight) in main_group.iter().zip(&main_weights) {
            weights.insert(criteria[idx].id, weight);
        }

        // Descend from each top-level criterion.
        for &idx in &main_group {
            let parent_id = criteria[idx].id;
            let parent_weight = weights[&parent_id];
            Self::propagate_children(
                parent_id,
                parent_weight,
                criteria,
                &children,
                comparisons_by_group,
                &mut weights,
                &mut group_consistency,
            )?;
        }

        // Renormalize exactly the leaf set to sum 1. A node whose parent
        // id is not in the list never receives a weight and counts as 0.
        let leaf_ids: Vec<CriterionId> = criteria
            .iter()
            .filter(|node| !children.contains_key(&Some(node.id)))
            .map(|node| node.id)
            .collect();
        let leaf_sum: f64 = leaf_ids
            .iter()
            .map(|id| weights.get(id).copied().unwrap_or(0.0))
            .sum();
        if leaf_sum > 0.0 {
            for id in &leaf_ids {
                if let Some(w) = weights.get_mut(id) {
                    *w /= leaf_sum;
                }
            }
        }

        for node in criteria.iter_mut() {
            node.global_weight = weights.get(&node.id).copied().unwrap_or(0.0);
        }

        debug!(
            criteria = criteria.len(),
            leaves = leaf_ids.len(),
            groups = group_consistency.len(),
            "propagated hierarchical weights"
        );

        Ok(HierarchicalWeights {
            global_weights: weights,
            group_consistency,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn propagate_children(
        parent_id: CriterionId,
        parent_weight: f64,
        criteria: &[CriterionNode],
        children: &HashMap<Option<CriterionId>, Vec<usize>>,
        comparisons_by_group: &HashMap<GroupKey, Vec<FuzzyComparisonMatrix>>,
        weights: &mut HashMap<CriterionId, f64>,
        group_consistency: &mut HashMap<String, GroupConsistency>,
    ) -> Result<(), AnalysisError> {
        let Some(group) = children.get(&Some(parent_id)) else {
            return Ok(());
        };

        let local_weights = Self::group_weights(
            GroupKey::Sub(parent_id),
            group.len(),
            1.0,
            comparisons_by_group,
            group_consistency,
        )?;

        for (&idx, &local) in group.iter().zip(&local_weights) {
            let child_id = criteria[idx].id;
            let global = local * parent_weight;
            weights.insert(child_id, global);
            Self::propagate_children(
                child_id,
                global,
                criteria,
                children,
                comparisons_by_group,
                weights,
                group_consistency,
            )?;
        }
        Ok(())
    }

    /// Local weights for one sibling group: Fuzzy AHP when comparison
    /// matrices exist, equal split of `total` otherwise.
    fn group_weights(
        key: GroupKey,
        group_size: usize,
        total: f64,
        comparisons_by_group: &HashMap<GroupKey, Vec<FuzzyComparisonMatrix>>,
        group_consistency: &mut HashMap<String, GroupConsistency>,
    ) -> Result<Vec<f64>, AnalysisError> {
        if group_size == 0 {
            return Ok(Vec::new());
        }

        let matrices = comparisons_by_group.get(&key).filter(|m| !m.is_empty());
        let Some(matrices) = matrices else {
            return Ok(vec![total / group_size as f64; group_size]);
        };

        for matrix in matrices {
            if matrix.order() != group_size {
                return Err(AnalysisError::dimension_mismatch(
                    format!("comparison matrices for group '{}'", key),
                    group_size,
                    matrix.order(),
                ));
            }
        }

        let derivation = FuzzyAhpEngine::calculate_weights(matrices, None)?;
        group_consistency.insert(
            key.to_string(),
            GroupConsistency {
                consistency: derivation.consistency,
                source_matrix: matrices[0].clone(),
            },
        );
        Ok(derivation
            .crisp_weights
            .iter()
            .map(|w| w * total)
            .collect())
    }

    /// Groups flat comparison records into per-expert matrices per
    /// sibling group.
    ///
    /// A record belongs to "main" when both criteria are parentless, or
    /// to `sub_<parent>` when both share that parent. Records whose
    /// criteria have different parents are dropped as ambiguous.
    pub fn organize_comparisons_by_group(
        records: &[ComparisonRecord],
        criteria: &[CriterionNode],
    ) -> HashMap<GroupKey, Vec<FuzzyComparisonMatrix>> {
        let parent_of: HashMap<CriterionId, Option<CriterionId>> =
            criteria.iter().map(|c| (c.id, c.parent)).collect();

        // Ordered member ids per group, following the flat list order.
        let mut members: HashMap<GroupKey, Vec<CriterionId>> = HashMap::new();
        for node in criteria {
            let key = match node.parent {
                None => GroupKey::Main,
                Some(parent) => GroupKey::Sub(parent),
            };
            members.entry(key).or_default().push(node.id);
        }

        // BTreeMap keys keep expert iteration deterministic.
        let mut by_expert_and_group: std::collections::BTreeMap<(i64, GroupKey), Vec<ComparisonRecord>> =
            std::collections::BTreeMap::new();
        for record in records {
            let (Some(&p1), Some(&p2)) = (
                parent_of.get(&record.criterion1),
                parent_of.get(&record.criterion2),
            ) else {
                continue;
            };
            if p1 != p2 {
                // Cross-group comparison: ambiguous input, dropped.
                continue;
            }
            let key = match p1 {
                None => GroupKey::Main,
                Some(parent) => GroupKey::Sub(parent),
            };
            by_expert_and_group
                .entry((record.expert_id, key))
                .or_default()
                .push(*record);
        }

        let mut result: HashMap<GroupKey, Vec<FuzzyComparisonMatrix>> = HashMap::new();
        for ((_, key), group_records) in by_expert_and_group {
            let Some(ids) = members.get(&key) else {
                continue;
            };
            result
                .entry(key)
                .or_default()
                .push(FuzzyComparisonMatrix::from_records(ids, &group_records));
        }
        result
    }
}
