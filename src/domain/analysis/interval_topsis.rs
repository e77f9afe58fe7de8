//! Interval TOPSIS engine - alternative ranking under interval ratings.
//!
//! Alternatives are ranked by closeness to an ideal composite: the
//! decision matrix is vector-normalized per criterion, weighted, compared
//! against positive and negative ideal solutions, and scored by the
//! relative closeness coefficient.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::foundation::{AnalysisError, IntervalRating, Polarity};

use super::DecisionMatrix;

/// Ranking output: one score set per alternative plus the total order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    /// Closeness coefficient per alternative, each in [0, 1].
    pub closeness: Vec<f64>,
    /// Distance to the positive ideal solution per alternative.
    pub distance_to_pis: Vec<f64>,
    /// Distance to the negative ideal solution per alternative.
    pub distance_to_nis: Vec<f64>,
    /// Alternative indexes in descending closeness order; ties keep the
    /// original index order.
    pub order: Vec<usize>,
}

impl RankingResult {
    /// 1-based rank of an alternative in the total order.
    pub fn rank_of(&self, alternative: usize) -> Option<usize> {
        self.order.iter().position(|&a| a == alternative).map(|p| p + 1)
    }
}

/// Intermediate matrices of one ranking run, retained for result views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingBreakdown {
    pub normalized: DecisionMatrix,
    pub weighted: DecisionMatrix,
    pub positive_ideal: Vec<IntervalRating>,
    pub negative_ideal: Vec<IntervalRating>,
}

/// Interval TOPSIS computation functions.
pub struct IntervalTopsisEngine;

impl IntervalTopsisEngine {
    /// Aggregates expert rating matrices with a per-cell arithmetic mean
    /// of both bounds.
    ///
    /// # Errors
    /// - `NoData` if `matrices` is empty.
    /// - `DimensionMismatch` if the matrices disagree on shape.
    pub fn aggregate_expert_ratings(
        matrices: &[DecisionMatrix],
    ) -> Result<DecisionMatrix, AnalysisError> {
        let Some(first) = matrices.first() else {
            return Err(AnalysisError::no_data("expert rating matrices"));
        };

        let (m, n) = (first.alternatives(), first.criteria());
        for matrix in &matrices[1..] {
            if matrix.alternatives() != m || matrix.criteria() != n {
                return Err(AnalysisError::dimension_mismatch(
                    "expert rating matrices",
                    m * n,
                    matrix.alternatives() * matrix.criteria(),
                ));
            }
        }

        let count = matrices.len() as f64;
        let mut aggregated = DecisionMatrix::zeros(m, n);
        for i in 0..m {
            for j in 0..n {
                let (mut lower, mut upper) = (0.0, 0.0);
                for matrix in matrices {
                    let cell = matrix.get(i, j);
                    lower += cell.lower();
                    upper += cell.upper();
                }
                aggregated.set(i, j, IntervalRating::new(lower / count, upper / count));
            }
        }
        Ok(aggregated)
    }

    /// Vector-normalizes each criterion column:
    /// every bound in column j is divided by sqrt(sum of l^2 + u^2 over
    /// alternatives). A zero norm divides by 1 instead. Normalization is
    /// polarity-independent; direction is applied at the ideal-solution
    /// step.
    pub fn normalize(matrix: &DecisionMatrix) -> DecisionMatrix {
        let (m, n) = (matrix.alternatives(), matrix.criteria());
        let mut normalized = DecisionMatrix::zeros(m, n);

        for j in 0..n {
            let mut sum_squares = 0.0;
            for i in 0..m {
                let cell = matrix.get(i, j);
                sum_squares += cell.lower() * cell.lower() + cell.upper() * cell.upper();
            }
            let norm = sum_squares.sqrt();
            let norm = if norm == 0.0 { 1.0 } else { norm };

            for i in 0..m {
                normalized.set(i, j, matrix.get(i, j).scale(1.0 / norm));
            }
        }
        normalized
    }

    /// Multiplies every cell in column j by weight j. Weight vector
    /// length matching the criteria count is a caller contract.
    pub fn apply_weights(normalized: &DecisionMatrix, weights: &[f64]) -> DecisionMatrix {
        let (m, n) = (normalized.alternatives(), normalized.criteria());
        let mut weighted = DecisionMatrix::zeros(m, n);
        for i in 0..m {
            for j in 0..n {
                weighted.set(i, j, normalized.get(i, j).scale(weights[j]));
            }
        }
        weighted
    }

    /// Positive and negative ideal solutions per criterion: benefit
    /// criteria take the column max/min of each bound for PIS/NIS, cost
    /// criteria the reverse.
    pub fn ideal_solutions(
        weighted: &DecisionMatrix,
        polarities: &[Polarity],
    ) -> (Vec<IntervalRating>, Vec<IntervalRating>) {
        let (m, n) = (weighted.alternatives(), weighted.criteria());
        let mut pis = Vec::with_capacity(n);
        let mut nis = Vec::with_capacity(n);

        for j in 0..n {
            let mut min_lower = f64::INFINITY;
            let mut max_lower = f64::NEG_INFINITY;
            let mut min_upper = f64::INFINITY;
            let mut max_upper = f64::NEG_INFINITY;
            for i in 0..m {
                let cell = weighted.get(i, j);
                min_lower = min_lower.min(cell.lower());
                max_lower = max_lower.max(cell.lower());
                min_upper = min_upper.min(cell.upper());
                max_upper = max_upper.max(cell.upper());
            }

            if m == 0 {
                pis.push(IntervalRating::ZERO);
                nis.push(IntervalRating::ZERO);
            } else if polarities[j].is_benefit() {
                pis.push(IntervalRating::new(max_lower, max_upper));
                nis.push(IntervalRating::new(min_lower, min_upper));
            } else {
                pis.push(IntervalRating::new(min_lower, min_upper));
                nis.push(IntervalRating::new(max_lower, max_upper));
            }
        }
        (pis, nis)
    }

    /// Per-alternative distances to a reference composite:
    /// sqrt(sum over criteria of interval_distance^2).
    ///
    /// Note: the per-criterion interval distance already contains a
    /// square root that is squared again here. Downstream scores depend
    /// on this exact compound form; do not collapse the two roots.
    pub fn distances(weighted: &DecisionMatrix, reference: &[IntervalRating]) -> Vec<f64> {
        let (m, n) = (weighted.alternatives(), weighted.criteria());
        (0..m)
            .map(|i| {
                let sum: f64 = (0..n)
                    .map(|j| {
                        let d = weighted.get(i, j).distance_to(&reference[j]);
                        d * d
                    })
                    .sum();
                sum.sqrt()
            })
            .collect()
    }

    /// Closeness coefficient: d_nis / (d_pis + d_nis), 0 when both
    /// distances are 0 (degenerate but expected input state).
    pub fn closeness_coefficient(distance_to_pis: f64, distance_to_nis: f64) -> f64 {
        let denominator = distance_to_pis + distance_to_nis;
        if denominator == 0.0 {
            0.0
        } else {
            distance_to_nis / denominator
        }
    }

    /// Complete ranking pipeline: normalize, weight, find ideals, score,
    /// and order alternatives by descending closeness (stable; ties keep
    /// the original index order).
    pub fn rank_alternatives(
        matrix: &DecisionMatrix,
        weights: &[f64],
        polarities: &[Polarity],
    ) -> RankingResult {
        let (result, _) = Self::rank_alternatives_detailed(matrix, weights, polarities);
        result
    }

    /// Same as [`Self::rank_alternatives`], additionally returning the
    /// intermediate matrices for result presentation.
    pub fn rank_alternatives_detailed(
        matrix: &DecisionMatrix,
        weights: &[f64],
        polarities: &[Polarity],
    ) -> (RankingResult, RankingBreakdown) {
        let normalized = Self::normalize(matrix);
        let weighted = Self::apply_weights(&normalized, weights);
        let (pis, nis) = Self::ideal_solutions(&weighted, polarities);
        let distance_to_pis = Self::distances(&weighted, &pis);
        let distance_to_nis = Self::distances(&weighted, &nis);

        let closeness: Vec<f64> = distance_to_pis
            .iter()
            .zip(&distance_to_nis)
            .map(|(&d_pis, &d_nis)| Self::closeness_coefficient(d_pis, d_nis))
            .collect();

        let mut order: Vec<usize> = (0..closeness.len()).collect();
        order.sort_by(|&a, &b| {
            closeness[b]
                .partial_cmp(&closeness[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        debug!(
            alternatives = matrix.alternatives(),
            criteria = matrix.criteria(),
            "ranked alternatives"
        );

        (
            RankingResult {
                closeness,
                distance_to_pis,
                distance_to_nis,
                order,
            },
            RankingBreakdown {
                normalized,
                weighted,
                positive_ideal: pis,
                negative_ideal: nis,
            },
        )
    }
}
