//! Monte Carlo robustness simulation over Dirichlet-sampled weights.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Dirichlet, Distribution};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::domain::analysis::{DecisionMatrix, IntervalTopsisEngine};
use crate::domain::foundation::{AnalysisError, Polarity};

use super::SensitivityAnalyzer;

/// Dirichlet concentrations must stay positive; zero base weights are
/// clamped to this floor.
const MIN_CONCENTRATION: f64 = 1e-6;

/// Parameters of a Monte Carlo run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    /// Number of weight vectors to draw.
    pub iterations: usize,
    /// Spread of the draws: concentration = base_weight / std, so a
    /// larger value perturbs more.
    pub perturbation_std: f64,
    /// Fixed seed for reproducible runs; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            perturbation_std: 0.05,
            seed: None,
        }
    }
}

/// How often one full ranking occurred across the draws.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFrequency {
    pub order: Vec<usize>,
    pub count: usize,
}

/// Rank distribution of a single alternative across the draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeRankStats {
    pub mean_rank: f64,
    pub std_rank: f64,
    /// Occurrences per rank; index 0 counts rank 1.
    pub histogram: Vec<usize>,
}

/// Output of a Monte Carlo robustness simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    /// Distinct rankings sorted by frequency, most common first.
    pub order_frequencies: Vec<OrderFrequency>,
    /// The modal ranking.
    pub most_common_order: Vec<usize>,
    /// Empirical probability of the modal ranking.
    pub order_probability: f64,
    /// Per-alternative rank statistics, indexed by alternative.
    pub rank_stats: Vec<AlternativeRankStats>,
    pub iterations: usize,
}

impl SensitivityAnalyzer {
    /// Draws weight vectors from a Dirichlet distribution centred on the
    /// base weights, reruns the ranking per draw, and tallies how stable
    /// the resulting order is.
    ///
    /// The concentration vector is base_weights / perturbation_std, so
    /// smaller std means draws hug the base weights. Iterations are
    /// independent; each uses its own counter-derived ChaCha stream, so
    /// a fixed seed reproduces the run exactly regardless of the
    /// parallel schedule.
    ///
    /// # Errors
    /// `NoData` for an empty matrix or zero iterations.
    pub fn monte_carlo_simulation(
        matrix: &DecisionMatrix,
        base_weights: &[f64],
        polarities: &[Polarity],
        config: &MonteCarloConfig,
    ) -> Result<MonteCarloResult, AnalysisError> {
        if matrix.alternatives() == 0 || matrix.criteria() == 0 {
            return Err(AnalysisError::no_data("decision matrix"));
        }
        if config.iterations == 0 {
            return Err(AnalysisError::no_data("Monte Carlo iterations"));
        }

        let std = if config.perturbation_std > 0.0 {
            config.perturbation_std
        } else {
            MonteCarloConfig::default().perturbation_std
        };
        let concentration: Vec<f64> = base_weights
            .iter()
            .map(|w| (w / std).max(MIN_CONCENTRATION))
            .collect();

        // A single criterion has no weight uncertainty to sample; the
        // constructor also rejects length-1 vectors. Both cases fall back
        // to the base weights unperturbed.
        let dirichlet = Dirichlet::new(&concentration).ok();

        let base_seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());

        let orders: Vec<Vec<usize>> = (0..config.iterations)
            .into_par_iter()
            .map(|iteration| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(iteration as u64));
                let weights = match &dirichlet {
                    Some(d) => d.sample(&mut rng),
                    None => base_weights.to_vec(),
                };
                IntervalTopsisEngine::rank_alternatives(matrix, &weights, polarities).order
            })
            .collect();

        let mut counts: HashMap<Vec<usize>, usize> = HashMap::new();
        for order in &orders {
            *counts.entry(order.clone()).or_insert(0) += 1;
        }

        let mut order_frequencies: Vec<OrderFrequency> = counts
            .into_iter()
            .map(|(order, count)| OrderFrequency { order, count })
            .collect();
        order_frequencies.sort_by(|a, b| b.count.cmp(&a.count).then(a.order.cmp(&b.order)));

        let most_common = &order_frequencies[0];
        let most_common_order = most_common.order.clone();
        let order_probability = most_common.count as f64 / config.iterations as f64;

        let alternatives = matrix.alternatives();
        let rank_stats: Vec<AlternativeRankStats> = (0..alternatives)
            .map(|alternative| {
                let ranks: Vec<usize> = orders
                    .iter()
                    .filter_map(|order| order.iter().position(|&a| a == alternative))
                    .map(|position| position + 1)
                    .collect();

                let count = ranks.len() as f64;
                let mean_rank = ranks.iter().sum::<usize>() as f64 / count;
                let variance = ranks
                    .iter()
                    .map(|&r| {
                        let d = r as f64 - mean_rank;
                        d * d
                    })
                    .sum::<f64>()
                    / count;

                let mut histogram = vec![0usize; alternatives];
                for &r in &ranks {
                    histogram[r - 1] += 1;
                }

                AlternativeRankStats {
                    mean_rank,
                    std_rank: variance.sqrt(),
                    histogram,
                }
            })
            .collect();

        debug!(
            iterations = config.iterations,
            distinct_orders = order_frequencies.len(),
            modal_probability = order_probability,
            "completed Monte Carlo simulation"
        );

        Ok(MonteCarloResult {
            order_frequencies,
            most_common_order,
            order_probability,
            rank_stats,
            iterations: config.iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::IntervalRating;

    fn seeded_config(iterations: usize, std: f64) -> MonteCarloConfig {
        MonteCarloConfig {
            iterations,
            perturbation_std: std,
            seed: Some(42),
        }
    }

    fn contested_matrix() -> DecisionMatrix {
        let mut matrix = DecisionMatrix::zeros(3, 3);
        let rows: [&[(f64, f64)]; 3] = [
            &[(7.0, 9.0), (5.0, 7.0), (3.0, 5.0)],
            &[(5.0, 7.0), (7.0, 9.0), (5.0, 7.0)],
            &[(3.0, 5.0), (5.0, 7.0), (7.0, 9.0)],
        ];
        for (i, row) in rows.iter().enumerate() {
            for (j, &(lower, upper)) in row.iter().enumerate() {
                matrix.set(i, j, IntervalRating::new(lower, upper));
            }
        }
        matrix
    }

    #[test]
    fn empty_matrix_is_no_data() {
        let matrix = DecisionMatrix::zeros(0, 0);
        let result = SensitivityAnalyzer::monte_carlo_simulation(
            &matrix,
            &[],
            &[],
            &MonteCarloConfig::default(),
        );
        assert!(matches!(result, Err(AnalysisError::NoData { .. })));
    }

    #[test]
    fn zero_iterations_is_no_data() {
        let matrix = contested_matrix();
        let result = SensitivityAnalyzer::monte_carlo_simulation(
            &matrix,
            &[1.0 / 3.0; 3],
            &[Polarity::Benefit; 3],
            &seeded_config(0, 0.05),
        );
        assert!(matches!(result, Err(AnalysisError::NoData { .. })));
    }

    #[test]
    fn frequencies_account_for_every_iteration() {
        let matrix = contested_matrix();
        let result = SensitivityAnalyzer::monte_carlo_simulation(
            &matrix,
            &[0.5, 0.3, 0.2],
            &[Polarity::Benefit; 3],
            &seeded_config(200, 0.05),
        )
        .unwrap();

        let total: usize = result.order_frequencies.iter().map(|f| f.count).sum();
        assert_eq!(total, 200);
        assert_eq!(result.iterations, 200);
        assert_eq!(result.most_common_order, result.order_frequencies[0].order);
        assert!(result.order_probability > 0.0);
        assert!(result.order_probability <= 1.0);
    }

    #[test]
    fn rank_histograms_sum_to_iteration_count() {
        let matrix = contested_matrix();
        let result = SensitivityAnalyzer::monte_carlo_simulation(
            &matrix,
            &[0.5, 0.3, 0.2],
            &[Polarity::Benefit; 3],
            &seeded_config(150, 0.1),
        )
        .unwrap();

        assert_eq!(result.rank_stats.len(), 3);
        for stats in &result.rank_stats {
            assert_eq!(stats.histogram.iter().sum::<usize>(), 150);
            assert!(stats.mean_rank >= 1.0);
            assert!(stats.mean_rank <= 3.0);
            assert!(stats.std_rank >= 0.0);
        }
    }

    #[test]
    fn fixed_seed_reproduces_the_run() {
        let matrix = contested_matrix();
        let config = seeded_config(100, 0.1);
        let weights = [0.4, 0.35, 0.25];
        let polarities = [Polarity::Benefit; 3];

        let first =
            SensitivityAnalyzer::monte_carlo_simulation(&matrix, &weights, &polarities, &config)
                .unwrap();
        let second =
            SensitivityAnalyzer::monte_carlo_simulation(&matrix, &weights, &polarities, &config)
                .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn tight_spread_keeps_the_base_ranking_dominant() {
        let matrix = contested_matrix();
        let weights = [0.6, 0.25, 0.15];
        let polarities = [Polarity::Benefit; 3];

        let base = IntervalTopsisEngine::rank_alternatives(&matrix, &weights, &polarities);
        let result = SensitivityAnalyzer::monte_carlo_simulation(
            &matrix,
            &weights,
            &polarities,
            // Very small std: draws concentrate hard on the base weights.
            &seeded_config(300, 0.001),
        )
        .unwrap();

        assert_eq!(result.most_common_order, base.order);
        assert!(result.order_probability > 0.9);
    }

    #[test]
    fn single_criterion_falls_back_to_base_weights() {
        let mut matrix = DecisionMatrix::zeros(2, 1);
        matrix.set(0, 0, IntervalRating::new(7.0, 9.0));
        matrix.set(1, 0, IntervalRating::new(1.0, 3.0));

        let result = SensitivityAnalyzer::monte_carlo_simulation(
            &matrix,
            &[1.0],
            &[Polarity::Benefit],
            &seeded_config(50, 0.05),
        )
        .unwrap();

        // Only one possible ranking with a single deterministic weight.
        assert_eq!(result.order_frequencies.len(), 1);
        assert_eq!(result.most_common_order, vec![0, 1]);
        assert_eq!(result.order_probability, 1.0);
    }

    #[test]
    fn result_serializes_round_trip() {
        let matrix = contested_matrix();
        let result = SensitivityAnalyzer::monte_carlo_simulation(
            &matrix,
            &[0.5, 0.3, 0.2],
            &[Polarity::Benefit; 3],
            &seeded_config(30, 0.05),
        )
        .unwrap();

        let json = serde_json::to_string(&result).unwrap();
        let restored: MonteCarloResult = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, result);
    }
}
