//! Fuzzy pairwise comparison matrix for one hierarchy group.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{CriterionId, TriangularFuzzyNumber};

/// A stored pairwise comparison, as supplied by the persistence collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub expert_id: i64,
    pub criterion1: CriterionId,
    pub criterion2: CriterionId,
    pub lower: f64,
    pub middle: f64,
    pub upper: f64,
}

impl ComparisonRecord {
    /// Creates a comparison record.
    pub fn new(
        expert_id: i64,
        criterion1: impl Into<CriterionId>,
        criterion2: impl Into<CriterionId>,
        fuzzy: TriangularFuzzyNumber,
    ) -> Self {
        Self {
            expert_id,
            criterion1: criterion1.into(),
            criterion2: criterion2.into(),
            lower: fuzzy.l(),
            middle: fuzzy.m(),
            upper: fuzzy.u(),
        }
    }

    /// The judgment as a fuzzy number.
    pub fn fuzzy(&self) -> TriangularFuzzyNumber {
        TriangularFuzzyNumber::new(self.lower, self.middle, self.upper)
    }
}

/// An n x n grid of fuzzy numbers comparing sibling criteria.
///
/// Stored row-major with a fixed order checked at construction. The
/// diagonal is (1, 1, 1); the reciprocal convention for cell [j, i] is
/// applied by [`FuzzyComparisonMatrix::from_records`] and
/// [`FuzzyComparisonMatrix::set_judgment`], not enforced structurally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyComparisonMatrix {
    order: usize,
    cells: Vec<TriangularFuzzyNumber>,
}

impl FuzzyComparisonMatrix {
    /// Creates an order x order matrix with every cell (1, 1, 1).
    ///
    /// Unstated pairs mean "equally important"; starting from all-ones
    /// keeps a partially filled matrix from collapsing row geometric
    /// means to zero.
    pub fn identity(order: usize) -> Self {
        Self {
            order,
            cells: vec![TriangularFuzzyNumber::ONE; order * order],
        }
    }

    /// Number of criteria compared by this matrix.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Returns the cell at (row, col).
    pub fn get(&self, row: usize, col: usize) -> TriangularFuzzyNumber {
        debug_assert!(row < self.order && col < self.order);
        self.cells[row * self.order + col]
    }

    /// Sets the cell at (row, col).
    pub fn set(&mut self, row: usize, col: usize, value: TriangularFuzzyNumber) {
        debug_assert!(row < self.order && col < self.order);
        self.cells[row * self.order + col] = value;
    }

    /// Sets a judgment and its component-reversed reciprocal:
    /// [row, col] = (l, m, u) and [col, row] = (1/u, 1/m, 1/l).
    pub fn set_judgment(&mut self, row: usize, col: usize, value: TriangularFuzzyNumber) {
        self.set(row, col, value);
        if row != col {
            self.set(col, row, value.reciprocal());
        }
    }

    /// Middle components of all cells, row-major. Used as the crisp
    /// matrix for consistency checks.
    pub fn middle_values(&self) -> Vec<f64> {
        self.cells.iter().map(|c| c.m()).collect()
    }

    /// Builds a matrix from flat comparison records for the given
    /// ordered group of criteria.
    ///
    /// The diagonal is (1, 1, 1); each record fills its cell and the
    /// reciprocal cell. Records naming a criterion outside `criteria_ids`
    /// are dropped (ambiguous input). Pairs never mentioned stay at the
    /// equal-importance default.
    pub fn from_records(criteria_ids: &[CriterionId], records: &[ComparisonRecord]) -> Self {
        let index: HashMap<CriterionId, usize> = criteria_ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (*id, idx))
            .collect();

        let mut matrix = Self::identity(criteria_ids.len());
        for record in records {
            let (Some(&i), Some(&j)) = (index.get(&record.criterion1), index.get(&record.criterion2))
            else {
                continue;
            };
            matrix.set_judgment(i, j, record.fuzzy());
        }
        matrix
    }
}
