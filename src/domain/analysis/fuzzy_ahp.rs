//! Fuzzy AHP engine - criteria weighting from expert comparison matrices.
//!
//! Implements Buckley's geometric-mean method: expert matrices are
//! aggregated with a weighted geometric mean, fuzzy weights derived from
//! row geometric means, defuzzified by centre of area, and the aggregated
//! matrix checked for judgment consistency.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::domain::foundation::{AnalysisError, TriangularFuzzyNumber};

use super::FuzzyComparisonMatrix;

/// Random Index values for matrices of order 1..=15. Above 15 the value
/// plateaus; `random_index` falls back to 1.49.
static RANDOM_INDEX: Lazy<HashMap<usize, f64>> = Lazy::new(|| {
    HashMap::from([
        (1, 0.0),
        (2, 0.0),
        (3, 0.58),
        (4, 0.90),
        (5, 1.12),
        (6, 1.24),
        (7, 1.32),
        (8, 1.41),
        (9, 1.45),
        (10, 1.49),
        (11, 1.51),
        (12, 1.48),
        (13, 1.56),
        (14, 1.57),
        (15, 1.59),
    ])
});

fn random_index(order: usize) -> f64 {
    RANDOM_INDEX.get(&order).copied().unwrap_or(1.49)
}

/// Consistency measures of a crisp comparison matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Consistency {
    /// Consistency Ratio: CI relative to the Random Index.
    pub ratio: f64,
    /// Consistency Index: (lambda_max - n) / (n - 1).
    pub index: f64,
    /// Principal eigenvalue of the matrix.
    pub lambda_max: f64,
}

impl Consistency {
    /// Saaty's conventional acceptance threshold.
    pub const ACCEPTABLE_RATIO: f64 = 0.1;

    /// Returns true if the ratio is within the conventional threshold.
    pub fn is_acceptable(&self) -> bool {
        self.ratio < Self::ACCEPTABLE_RATIO
    }
}

/// Output of the complete weighting pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightDerivation {
    /// Normalized crisp weights, one per criterion.
    pub crisp_weights: Vec<f64>,
    /// Fuzzy weights before defuzzification.
    pub fuzzy_weights: Vec<TriangularFuzzyNumber>,
    /// Consistency of the aggregated matrix, measured on middle values.
    pub consistency: Consistency,
}

/// Fuzzy AHP computation functions.
pub struct FuzzyAhpEngine;

impl FuzzyAhpEngine {
    /// Aggregates expert comparison matrices with a weighted geometric
    /// mean applied independently to each fuzzy component.
    ///
    /// The diagonal of the result is forced to (1, 1, 1). When
    /// `expert_weights` is `None` or its length does not match the number
    /// of matrices, equal weights 1/K are used. Supplied weights are
    /// applied as exponents as given; they are not checked to sum to 1,
    /// so a non-normalized vector yields a non-normalized geometric mean.
    ///
    /// # Errors
    /// - `NoData` if `matrices` is empty.
    /// - `DimensionMismatch` if the matrices disagree on order.
    pub fn aggregate_expert_matrices(
        matrices: &[FuzzyComparisonMatrix],
        expert_weights: Option<&[f64]>,
    ) -> Result<FuzzyComparisonMatrix, AnalysisError> {
        if matrices.is_empty() {
            return Err(AnalysisError::no_data("comparison matrices"));
        }

        let order = matrices[0].order();
        for matrix in &matrices[1..] {
            if matrix.order() != order {
                return Err(AnalysisError::dimension_mismatch(
                    "expert comparison matrices",
                    order,
                    matrix.order(),
                ));
            }
        }

        let equal = vec![1.0 / matrices.len() as f64; matrices.len()];
        let weights = match expert_weights {
            Some(w) if w.len() == matrices.len() => w,
            _ => equal.as_slice(),
        };

        let mut aggregated = FuzzyComparisonMatrix::identity(order);
        for i in 0..order {
            for j in 0..order {
                if i == j {
                    continue;
                }
                let mut l = 1.0;
                let mut m = 1.0;
                let mut u = 1.0;
                for (matrix, &w) in matrices.iter().zip(weights) {
                    let cell = matrix.get(i, j);
                    l *= cell.l().powf(w);
                    m *= cell.m().powf(w);
                    u *= cell.u().powf(w);
                }
                aggregated.set(i, j, TriangularFuzzyNumber::new(l, m, u));
            }
        }
        Ok(aggregated)
    }

    /// Derives fuzzy weights from an aggregated matrix (Buckley's method).
    ///
    /// For each row i, r_i is the n-th-root geometric mean of the row per
    /// component; w_i = r_i multiplied by the order-reversing reciprocal
    /// of the component-wise sum of all r. Zero sum components invert to
    /// 0 instead of raising.
    pub fn derive_fuzzy_weights(matrix: &FuzzyComparisonMatrix) -> Vec<TriangularFuzzyNumber> {
        let n = matrix.order();
        if n == 0 {
            return Vec::new();
        }

        let root = 1.0 / n as f64;
        let row_means: Vec<TriangularFuzzyNumber> = (0..n)
            .map(|i| {
                let mut l = 1.0;
                let mut m = 1.0;
                let mut u = 1.0;
                for j in 0..n {
                    let cell = matrix.get(i, j);
                    l *= cell.l();
                    m *= cell.m();
                    u *= cell.u();
                }
                TriangularFuzzyNumber::new(l.powf(root), m.powf(root), u.powf(root))
            })
            .collect();

        let sum = row_means
            .iter()
            .fold(TriangularFuzzyNumber::ZERO, |acc, r| acc.add(r));
        let inverse_sum = sum.reciprocal();

        row_means
            .iter()
            .map(|r| r.multiply(&inverse_sum))
            .collect()
    }

    /// Defuzzifies fuzzy weights by centre of area and normalizes the
    /// result to sum 1. A zero raw sum yields an all-zero vector.
    pub fn defuzzify(fuzzy_weights: &[TriangularFuzzyNumber]) -> Vec<f64> {
        let crisp: Vec<f64> = fuzzy_weights.iter().map(|w| w.centroid()).collect();
        let total: f64 = crisp.iter().sum();
        if total > 0.0 {
            crisp.iter().map(|w| w / total).collect()
        } else {
            vec![0.0; crisp.len()]
        }
    }

    /// Computes the consistency ratio of a crisp comparison matrix given
    /// row-major with `order` rows.
    ///
    /// For order < 3 consistency is undefined by convention and (0, 0, n)
    /// is returned. Otherwise lambda_max is the principal eigenvalue,
    /// CI = (lambda_max - n) / (n - 1), and CR = CI / RI(n).
    pub fn consistency_ratio(crisp_matrix: &[f64], order: usize) -> Consistency {
        debug_assert_eq!(crisp_matrix.len(), order * order);

        if order < 3 {
            return Consistency {
                ratio: 0.0,
                index: 0.0,
                lambda_max: order as f64,
            };
        }

        let lambda_max = principal_eigenvalue(crisp_matrix, order);
        let index = (lambda_max - order as f64) / (order as f64 - 1.0);
        let ratio = index / random_index(order);

        Consistency {
            ratio,
            index,
            lambda_max,
        }
    }

    /// Complete weighting pipeline: aggregate expert matrices, derive
    /// fuzzy weights, defuzzify, and measure consistency on the middle
    /// values of the aggregated matrix.
    pub fn calculate_weights(
        matrices: &[FuzzyComparisonMatrix],
        expert_weights: Option<&[f64]>,
    ) -> Result<WeightDerivation, AnalysisError> {
        let aggregated = Self::aggregate_expert_matrices(matrices, expert_weights)?;
        let fuzzy_weights = Self::derive_fuzzy_weights(&aggregated);
        let crisp_weights = Self::defuzzify(&fuzzy_weights);
        let consistency =
            Self::consistency_ratio(&aggregated.middle_values(), aggregated.order());

        debug!(
            experts = matrices.len(),
            order = aggregated.order(),
            cr = consistency.ratio,
            "derived criteria weights"
        );

        Ok(WeightDerivation {
            crisp_weights,
            fuzzy_weights,
            consistency,
        })
    }

    /// Identifies the judgment pair that deviates most from the derived
    /// weights and suggests which direction to revise it. Advisory text
    /// only; never blocks computation.
    pub fn diagnose_inconsistency(
        crisp_matrix: &[f64],
        order: usize,
        weights: &[f64],
        criteria_names: &[String],
    ) -> String {
        debug_assert_eq!(crisp_matrix.len(), order * order);

        let mut max_deviation = 0.0;
        let mut worst_pair: Option<(usize, usize)> = None;

        // Pair (i, j) where the judgment a_ij strays furthest from the
        // implied ratio w_i / w_j, in log space.
        for i in 0..order {
            for j in (i + 1)..order {
                let ratio = if weights[j] != 0.0 {
                    weights[i] / weights[j]
                } else {
                    0.0
                };
                let judgment = crisp_matrix[i * order + j];
                if judgment > 0.0 && ratio > 0.0 {
                    let deviation = (judgment.ln() - ratio.ln()).abs();
                    if deviation > max_deviation {
                        max_deviation = deviation;
                        worst_pair = Some((i, j));
                    }
                }
            }
        }

        let Some((i, j)) = worst_pair else {
            return "No significant inconsistency found.".to_string();
        };

        let judgment = crisp_matrix[i * order + j];
        let ratio = weights[i] / weights[j];
        let fallback_i = format!("Criterion {}", i + 1);
        let fallback_j = format!("Criterion {}", j + 1);
        let name_i = criteria_names.get(i).unwrap_or(&fallback_i);
        let name_j = criteria_names.get(j).unwrap_or(&fallback_j);

        let suggestion = if judgment > ratio {
            format!("Reduce the importance of '{}' relative to '{}'.", name_i, name_j)
        } else {
            format!("Increase the importance of '{}' relative to '{}'.", name_i, name_j)
        };

        format!(
            "Inconsistency found between '{}' and '{}'.\n\
             You rated '{}' as {:.2} times more important than '{}',\n\
             but the overall weights suggest it should be closer to {:.2}.\n\
             Suggestion: {}",
            name_i, name_j, name_i, judgment, name_j, ratio, suggestion
        )
    }
}

/// Dominant eigenvalue of a positive square matrix by power iteration.
///
/// Pairwise comparison matrices are positive and reciprocal, so the
/// Perron eigenvalue is real, simple, and dominant; power iteration
/// converges to it from any positive start vector.
fn principal_eigenvalue(matrix: &[f64], order: usize) -> f64 {
    const MAX_ITERATIONS: usize = 500;
    const TOLERANCE: f64 = 1e-12;

    let mut vector = vec![1.0 / order as f64; order];
    let mut lambda = 0.0;

    for _ in 0..MAX_ITERATIONS {
        let mut next = vec![0.0; order];
        for i in 0..order {
            for j in 0..order {
                next[i] += matrix[i * order + j] * vector[j];
            }
        }

        let norm = next.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm == 0.0 {
            return 0.0;
        }
        for x in &mut next {
            *x /= norm;
        }

        // Rayleigh quotient of the normalized iterate.
        let mut product = vec![0.0; order];
        for i in 0..order {
            for j in 0..order {
                product[i] += matrix[i * order + j] * next[j];
            }
        }
        let next_lambda: f64 = next.iter().zip(&product).map(|(v, p)| v * p).sum();

        if (next_lambda - lambda).abs() < TOLERANCE {
            return next_lambda;
        }
        lambda = next_lambda;
        vector = next;
    }

    lambda
}
