//! Weight perturbation sweeps and rank-reversal detection.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::domain::analysis::{DecisionMatrix, IntervalTopsisEngine};
use crate::domain::foundation::{AnalysisError, CriterionId, CriterionNode, Polarity};

use super::SensitivityAnalyzer;

const ZERO_STEP_EPSILON: f64 = 1e-6;

/// Parameters of a perturbation sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerturbationConfig {
    /// Sweep half-width as a fraction of the target's base weight
    /// (0.2 sweeps from -20% to +20% of that weight).
    pub range: f64,
    /// Number of evenly spaced sweep points.
    pub steps: usize,
    /// When set, restrict per-step series display to the N alternatives
    /// with the most closeness variance. Display-only; every alternative
    /// is still computed and ranked.
    pub top_n: Option<usize>,
}

impl Default for PerturbationConfig {
    fn default() -> Self {
        Self {
            range: 0.2,
            steps: 41,
            top_n: None,
        }
    }
}

/// One alternative's movement inside a rank reversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankChange {
    pub alternative: String,
    /// 1-based rank at the unperturbed baseline.
    pub from_rank: usize,
    /// 1-based rank at the reversal step.
    pub to_rank: usize,
}

impl RankChange {
    /// Returns true if the alternative moved up.
    pub fn improved(&self) -> bool {
        self.to_rank < self.from_rank
    }
}

impl fmt::Display for RankChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.improved() { "up" } else { "down" };
        write!(
            f,
            "{}: rank {} -> {} ({})",
            self.alternative, self.from_rank, self.to_rank, direction
        )
    }
}

/// A sweep step whose ranking differs from the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankReversal {
    /// Perturbation at this step, in percent of the base weight.
    pub perturbation_pct: f64,
    /// The full ranking at this step.
    pub order: Vec<usize>,
    /// Alternatives whose rank changed, with direction.
    pub changes: Vec<RankChange>,
}

/// Sweep results for one target criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerturbationSeries {
    /// Name of the swept criterion (or parent).
    pub criterion: String,
    /// Perturbation percentages per step; always includes the 0% step.
    pub perturbation_pcts: Vec<f64>,
    /// The target's renormalized weight at each step.
    pub target_weights: Vec<f64>,
    /// Closeness coefficients per step, indexed [step][alternative].
    pub closeness_per_step: Vec<Vec<f64>>,
    /// Full ranking at each step.
    pub orders: Vec<Vec<usize>>,
    /// Steps after the baseline whose ranking differs from it.
    pub reversals: Vec<RankReversal>,
    /// The first reversal in sweep order, in percent.
    pub critical_perturbation_pct: Option<f64>,
    /// Alternative indexes selected for display (top-N filter or all).
    pub analyzed_alternatives: Vec<usize>,
}

/// Sweep results for every criterion plus the overall stability index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerturbationAnalysis {
    pub series: Vec<PerturbationSeries>,
    /// 1 minus the fraction of criteria with at least one reversal.
    pub stability_index: f64,
}

impl SensitivityAnalyzer {
    /// Renormalizes a weight vector after moving one weight by `delta`.
    ///
    /// The target becomes clamp(old + delta, 0, 1 - 1e-9); every other
    /// weight is rescaled by (1 - new) / (1 - old) so the vector keeps
    /// summing to 1. If the target already held ~all the weight there is
    /// nothing to rescale: the others become 0 and the target exactly 1.
    /// A final pass renormalizes the vector when floating point drift
    /// exceeds 1e-10.
    pub fn renormalize_after_perturbation(
        weights: &[f64],
        target: usize,
        delta: f64,
    ) -> Vec<f64> {
        let old_target = weights[target];
        let new_target = (old_target + delta).clamp(0.0, 1.0 - 1e-9);

        if 1.0 - old_target < 1e-9 {
            // Original weight was ~100%; the rest are zeros that cannot
            // be scaled up, so the target keeps everything.
            let mut out = vec![0.0; weights.len()];
            out[target] = 1.0;
            return out;
        }

        let scale = (1.0 - new_target) / (1.0 - old_target);
        let mut out: Vec<f64> = weights.iter().map(|w| w * scale).collect();
        out[target] = new_target;

        let sum: f64 = out.iter().sum();
        if (sum - 1.0).abs() > 1e-10 {
            for w in &mut out {
                *w /= sum;
            }
        }
        out
    }

    /// Sweeps every criterion's weight across the configured range and
    /// reports rank reversals per criterion.
    ///
    /// Each sweep point perturbs one criterion by a fraction of its own
    /// base weight, renormalizes the rest, and reruns the ranking. The
    /// ~0% step is the baseline; steps after it (in sweep order) whose
    /// ranking differs are reversal points, and the first one is the
    /// critical perturbation. Criteria sweeps are independent and run in
    /// parallel.
    ///
    /// `criterion_names` and `alternative_names` may be shorter than the
    /// matrix; positional fallbacks are used for missing names.
    ///
    /// # Errors
    /// `NoData` for an empty decision matrix.
    pub fn weight_perturbation_analysis(
        matrix: &DecisionMatrix,
        base_weights: &[f64],
        polarities: &[Polarity],
        criterion_names: &[String],
        alternative_names: &[String],
        config: &PerturbationConfig,
    ) -> Result<PerturbationAnalysis, AnalysisError> {
        if matrix.alternatives() == 0 || matrix.criteria() == 0 {
            return Err(AnalysisError::no_data("decision matrix"));
        }

        let points = perturbation_points(config.range, config.steps);
        let analyzed =
            analyzed_alternatives(matrix, base_weights, polarities, &points, config.top_n);

        let series: Vec<PerturbationSeries> = (0..matrix.criteria())
            .into_par_iter()
            .map(|criterion| {
                let (target_weights, closeness_per_step, orders) =
                    sweep_criterion(matrix, base_weights, polarities, criterion, &points);
                build_series(
                    name_or(criterion_names, criterion, "Criterion"),
                    &points,
                    target_weights,
                    closeness_per_step,
                    orders,
                    alternative_names,
                    analyzed.clone(),
                )
            })
            .collect();

        let unstable = series.iter().filter(|s| !s.reversals.is_empty()).count();
        let stability_index = 1.0 - unstable as f64 / series.len() as f64;

        debug!(
            criteria = series.len(),
            steps = points.len(),
            unstable,
            "completed weight perturbation analysis"
        );

        Ok(PerturbationAnalysis {
            series,
            stability_index,
        })
    }

    /// Sweeps one parent's weight across the top-level parent group and
    /// propagates each step down to the leaves before reranking.
    ///
    /// The perturbation vector is the global weights of the top-level
    /// parents. Each step redistributes weight among them, then every
    /// descendant follows its fixed baseline ratio child/parent,
    /// recursing through deeper levels. The resulting leaf vector (in
    /// flat-list leaf order, matching `polarities`) is renormalized to
    /// sum 1 and fed to the ranking engine.
    ///
    /// # Errors
    /// - `SingleParentPerturbation` when fewer than two top-level parents
    ///   exist: there is nothing to redistribute into.
    /// - `NoData` when the target has no children or the matrix is empty.
    pub fn parent_perturbation_analysis(
        matrix: &DecisionMatrix,
        criteria: &[CriterionNode],
        target_parent: CriterionId,
        parent_name: impl Into<String>,
        polarities: &[Polarity],
        alternative_names: &[String],
        config: &PerturbationConfig,
    ) -> Result<PerturbationSeries, AnalysisError> {
        if matrix.alternatives() == 0 || matrix.criteria() == 0 {
            return Err(AnalysisError::no_data("decision matrix"));
        }

        let mut children: HashMap<CriterionId, Vec<usize>> = HashMap::new();
        for (idx, node) in criteria.iter().enumerate() {
            if let Some(parent) = node.parent {
                children.entry(parent).or_default().push(idx);
            }
        }

        let top_parents: Vec<usize> = criteria
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_top_level() && children.contains_key(&node.id))
            .map(|(idx, _)| idx)
            .collect();
        if top_parents.len() < 2 {
            return Err(AnalysisError::SingleParentPerturbation {
                parent_count: top_parents.len(),
            });
        }

        let Some(target_pos) = top_parents
            .iter()
            .position(|&idx| criteria[idx].id == target_parent)
        else {
            return Err(AnalysisError::no_data(format!(
                "sub-criteria under perturbation target {}",
                target_parent
            )));
        };

        let parent_weights: Vec<f64> = top_parents
            .iter()
            .map(|&idx| criteria[idx].global_weight)
            .collect();
        let leaf_indices: Vec<usize> = criteria
            .iter()
            .enumerate()
            .filter(|(_, node)| !children.contains_key(&node.id))
            .map(|(idx, _)| idx)
            .collect();

        let points = perturbation_points(config.range, config.steps);
        let mut target_weights = Vec::with_capacity(points.len());
        let mut closeness_per_step = Vec::with_capacity(points.len());
        let mut orders = Vec::with_capacity(points.len());

        for &pct in &points {
            let delta = parent_weights[target_pos] * pct;
            let new_parents = Self::renormalize_after_perturbation(
                &parent_weights,
                target_pos,
                delta,
            );

            // Baseline globals, overwritten along each perturbed subtree.
            let mut globals: HashMap<CriterionId, f64> = criteria
                .iter()
                .map(|node| (node.id, node.global_weight))
                .collect();
            for (pos, &idx) in top_parents.iter().enumerate() {
                assign_descendants(idx, new_parents[pos], criteria, &children, &mut globals);
            }

            let mut leaf_weights: Vec<f64> = leaf_indices
                .iter()
                .map(|&idx| globals[&criteria[idx].id])
                .collect();
            let leaf_sum: f64 = leaf_weights.iter().sum();
            if leaf_sum > 0.0 {
                for w in &mut leaf_weights {
                    *w /= leaf_sum;
                }
            }

            let result = IntervalTopsisEngine::rank_alternatives(matrix, &leaf_weights, polarities);
            target_weights.push(new_parents[target_pos]);
            closeness_per_step.push(result.closeness);
            orders.push(result.order);
        }

        let analyzed = (0..matrix.alternatives()).collect();
        Ok(build_series(
            parent_name.into(),
            &points,
            target_weights,
            closeness_per_step,
            orders,
            alternative_names,
            analyzed,
        ))
    }
}

/// Evenly spaced sweep fractions over [-range, +range]. The unperturbed
/// 0 step is inserted if the spacing would skip it.
fn perturbation_points(range: f64, steps: usize) -> Vec<f64> {
    let steps = steps.max(1);
    let mut points: Vec<f64> = if steps == 1 {
        vec![0.0]
    } else {
        (0..steps)
            .map(|k| -range + 2.0 * range * k as f64 / (steps - 1) as f64)
            .collect()
    };

    if !points.iter().any(|p| p.abs() < ZERO_STEP_EPSILON) {
        let position = points
            .iter()
            .position(|&p| p > 0.0)
            .unwrap_or(points.len());
        points.insert(position, 0.0);
    }
    points
}

/// Runs the full ranking at every sweep point of one criterion.
fn sweep_criterion(
    matrix: &DecisionMatrix,
    base_weights: &[f64],
    polarities: &[Polarity],
    criterion: usize,
    points: &[f64],
) -> (Vec<f64>, Vec<Vec<f64>>, Vec<Vec<usize>>) {
    let mut target_weights = Vec::with_capacity(points.len());
    let mut closeness_per_step = Vec::with_capacity(points.len());
    let mut orders = Vec::with_capacity(points.len());

    for &pct in points {
        let delta = base_weights[criterion] * pct;
        let perturbed =
            SensitivityAnalyzer::renormalize_after_perturbation(base_weights, criterion, delta);
        let result = IntervalTopsisEngine::rank_alternatives(matrix, &perturbed, polarities);

        target_weights.push(perturbed[criterion]);
        closeness_per_step.push(result.closeness);
        orders.push(result.order);
    }
    (target_weights, closeness_per_step, orders)
}

/// Selects which alternatives appear in per-step series. With a top-N
/// filter, a single-criterion pre-pass picks the N alternatives whose
/// closeness varies most across the sweep.
fn analyzed_alternatives(
    matrix: &DecisionMatrix,
    base_weights: &[f64],
    polarities: &[Polarity],
    points: &[f64],
    top_n: Option<usize>,
) -> Vec<usize> {
    let alternatives = matrix.alternatives();
    let Some(top_n) = top_n.filter(|&n| n < alternatives) else {
        return (0..alternatives).collect();
    };

    let (_, closeness_per_step, _) = sweep_criterion(matrix, base_weights, polarities, 0, points);

    let variances: Vec<f64> = (0..alternatives)
        .map(|alt| {
            let values: Vec<f64> = closeness_per_step.iter().map(|step| step[alt]).collect();
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64
        })
        .collect();

    let mut by_variance: Vec<usize> = (0..alternatives).collect();
    by_variance.sort_by(|&a, &b| {
        variances[b]
            .partial_cmp(&variances[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    let mut selected: Vec<usize> = by_variance.into_iter().take(top_n).collect();
    selected.sort_unstable();
    selected
}

/// Assembles a series: baseline lookup, reversal detection, critical
/// perturbation. Only steps after the baseline in sweep order are
/// compared against it.
fn build_series(
    criterion: String,
    points: &[f64],
    target_weights: Vec<f64>,
    closeness_per_step: Vec<Vec<f64>>,
    orders: Vec<Vec<usize>>,
    alternative_names: &[String],
    analyzed_alternatives: Vec<usize>,
) -> PerturbationSeries {
    let mut baseline: Option<&Vec<usize>> = None;
    let mut reversals = Vec::new();
    let mut critical_perturbation_pct = None;

    for (step, &pct) in points.iter().enumerate() {
        match baseline {
            None => {
                if pct.abs() < ZERO_STEP_EPSILON {
                    baseline = Some(&orders[step]);
                }
            }
            Some(base) => {
                if orders[step] != *base {
                    let pct_value = pct * 100.0;
                    if critical_perturbation_pct.is_none() {
                        critical_perturbation_pct = Some(pct_value);
                    }
                    reversals.push(RankReversal {
                        perturbation_pct: pct_value,
                        order: orders[step].clone(),
                        changes: detect_rank_changes(base, &orders[step], alternative_names),
                    });
                }
            }
        }
    }

    PerturbationSeries {
        criterion,
        perturbation_pcts: points.iter().map(|p| p * 100.0).collect(),
        target_weights,
        closeness_per_step,
        orders,
        reversals,
        critical_perturbation_pct,
        analyzed_alternatives,
    }
}

/// Lists every alternative whose rank differs between two orders.
fn detect_rank_changes(
    base_order: &[usize],
    new_order: &[usize],
    alternative_names: &[String],
) -> Vec<RankChange> {
    let mut changes = Vec::new();
    for alternative in 0..base_order.len() {
        let from_rank = base_order.iter().position(|&a| a == alternative);
        let to_rank = new_order.iter().position(|&a| a == alternative);
        if let (Some(from), Some(to)) = (from_rank, to_rank) {
            if from != to {
                changes.push(RankChange {
                    alternative: name_or(alternative_names, alternative, "Alternative"),
                    from_rank: from + 1,
                    to_rank: to + 1,
                });
            }
        }
    }
    changes
}

fn name_or(names: &[String], index: usize, fallback_prefix: &str) -> String {
    names
        .get(index)
        .cloned()
        .unwrap_or_else(|| format!("{} {}", fallback_prefix, index + 1))
}

/// Propagates a parent's new weight to its subtree using the fixed
/// local ratios captured at baseline. A zero-weight baseline parent
/// splits its new weight equally instead.
fn assign_descendants(
    index: usize,
    new_weight: f64,
    criteria: &[CriterionNode],
    children: &HashMap<CriterionId, Vec<usize>>,
    globals: &mut HashMap<CriterionId, f64>,
) {
    let node = &criteria[index];
    globals.insert(node.id, new_weight);

    let Some(kids) = children.get(&node.id) else {
        return;
    };
    let baseline_parent = node.global_weight;
    for &kid in kids {
        let ratio = if baseline_parent > 0.0 {
            criteria[kid].global_weight / baseline_parent
        } else {
            1.0 / kids.len() as f64
        };
        assign_descendants(kid, ratio * new_weight, criteria, children, globals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::IntervalTopsisEngine;
    use crate::domain::foundation::IntervalRating;
    use proptest::prelude::*;

    fn supplier_matrix() -> DecisionMatrix {
        // Three suppliers with opposed strengths: sensitive to weights.
        let rows: [&[(f64, f64)]; 3] = [
            &[(7.0, 9.0), (5.0, 7.0), (3.0, 5.0)],
            &[(5.0, 7.0), (7.0, 9.0), (5.0, 7.0)],
            &[(3.0, 5.0), (5.0, 7.0), (7.0, 9.0)],
        ];
        let mut matrix = DecisionMatrix::zeros(3, 3);
        for (i, row) in rows.iter().enumerate() {
            for (j, &(lower, upper)) in row.iter().enumerate() {
                matrix.set(i, j, IntervalRating::new(lower, upper));
            }
        }
        matrix
    }

    fn names(prefix: &str, count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("{} {}", prefix, i)).collect()
    }

    // Renormalization Tests

    #[test]
    fn renormalization_redistributes_proportionally() {
        let weights = [0.5, 0.3, 0.2];
        let out = SensitivityAnalyzer::renormalize_after_perturbation(&weights, 0, 0.1);

        assert!((out[0] - 0.6).abs() < 1e-12);
        assert!((out[1] - 0.24).abs() < 1e-12);
        assert!((out[2] - 0.16).abs() < 1e-12);
        assert!((out.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn renormalization_with_zero_delta_is_identity() {
        let weights = [0.5, 0.3, 0.2];
        let out = SensitivityAnalyzer::renormalize_after_perturbation(&weights, 1, 0.0);
        assert_eq!(out, weights.to_vec());
    }

    #[test]
    fn renormalization_handles_negative_delta() {
        let weights = [0.5, 0.3, 0.2];
        let out = SensitivityAnalyzer::renormalize_after_perturbation(&weights, 1, -0.1);

        assert!((out[1] - 0.2).abs() < 1e-12);
        assert!((out.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        // Remaining weight flows to the others proportionally.
        assert!(out[0] > 0.5);
        assert!(out[2] > 0.2);
    }

    #[test]
    fn over_perturbation_clamps_below_one() {
        let weights = [0.8, 0.15, 0.05];
        let out = SensitivityAnalyzer::renormalize_after_perturbation(&weights, 0, 5.0);

        assert!(out[0] < 1.0);
        assert!(out[0] > 0.999);
        assert!(out[1] < 1e-8);
        assert!(out[2] < 1e-8);
        assert!((out.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn saturated_target_keeps_everything() {
        let weights = [1.0, 0.0, 0.0];
        let out = SensitivityAnalyzer::renormalize_after_perturbation(&weights, 0, -0.3);
        assert_eq!(out, vec![1.0, 0.0, 0.0]);
    }

    // Sweep Tests

    #[test]
    fn zero_step_reproduces_unperturbed_ranking() {
        let matrix = supplier_matrix();
        let weights = [0.5, 0.3, 0.2];
        let polarities = [Polarity::Benefit; 3];

        let analysis = SensitivityAnalyzer::weight_perturbation_analysis(
            &matrix,
            &weights,
            &polarities,
            &names("Criterion", 3),
            &names("Supplier", 3),
            &PerturbationConfig::default(),
        )
        .unwrap();

        let unperturbed = IntervalTopsisEngine::rank_alternatives(&matrix, &weights, &polarities);
        for series in &analysis.series {
            let zero_step = series
                .perturbation_pcts
                .iter()
                .position(|p| p.abs() < 1e-6)
                .expect("0% step must exist");
            assert_eq!(series.orders[zero_step], unperturbed.order);
            for (a, b) in series.closeness_per_step[zero_step]
                .iter()
                .zip(&unperturbed.closeness)
            {
                assert!((a - b).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn series_covers_every_criterion_and_step() {
        let matrix = supplier_matrix();
        let config = PerturbationConfig {
            range: 0.3,
            steps: 21,
            top_n: None,
        };
        let analysis = SensitivityAnalyzer::weight_perturbation_analysis(
            &matrix,
            &[0.5, 0.3, 0.2],
            &[Polarity::Benefit; 3],
            &names("Criterion", 3),
            &names("Supplier", 3),
            &config,
        )
        .unwrap();

        assert_eq!(analysis.series.len(), 3);
        for series in &analysis.series {
            assert_eq!(series.perturbation_pcts.len(), 21);
            assert_eq!(series.orders.len(), 21);
            assert_eq!(series.target_weights.len(), 21);
            assert_eq!(series.analyzed_alternatives, vec![0, 1, 2]);
            assert!((series.perturbation_pcts[0] + 30.0).abs() < 1e-9);
            assert!((series.perturbation_pcts[20] - 30.0).abs() < 1e-9);
        }
    }

    #[test]
    fn even_step_count_still_includes_zero() {
        let points = perturbation_points(0.2, 10);
        assert_eq!(points.len(), 11);
        assert!(points.iter().any(|p| *p == 0.0));
        // Inserted in sorted position.
        let zero_pos = points.iter().position(|p| *p == 0.0).unwrap();
        assert!(points[zero_pos - 1] < 0.0);
        assert!(points[zero_pos + 1] > 0.0);
    }

    #[test]
    fn reversals_report_critical_perturbation_first() {
        // Two alternatives with opposed strengths. Baseline weights favor
        // criterion 2 (and so alternative B); strengthening criterion 1
        // past the break-even point flips the ranking. The flip happens
        // after the 0% baseline in sweep order, where reversal detection
        // applies.
        let mut matrix = DecisionMatrix::zeros(2, 2);
        matrix.set(0, 0, IntervalRating::new(8.0, 9.0));
        matrix.set(0, 1, IntervalRating::new(1.0, 2.0));
        matrix.set(1, 0, IntervalRating::new(1.0, 2.0));
        matrix.set(1, 1, IntervalRating::new(8.0, 9.0));

        let weights = [0.45, 0.55];
        let config = PerturbationConfig {
            range: 0.9,
            steps: 41,
            top_n: None,
        };
        let analysis = SensitivityAnalyzer::weight_perturbation_analysis(
            &matrix,
            &weights,
            &[Polarity::Benefit; 2],
            &names("Criterion", 2),
            &names("Option", 2),
            &config,
        )
        .unwrap();

        let swept = &analysis.series[0];
        assert!(
            !swept.reversals.is_empty(),
            "a ±90% sweep past break-even must flip the ranking"
        );
        let critical = swept.critical_perturbation_pct.unwrap();
        assert!(critical > 0.0);
        assert!((critical - swept.reversals[0].perturbation_pct).abs() < 1e-12);
        assert!(!swept.reversals[0].changes.is_empty());
        assert!(analysis.stability_index < 1.0);
    }

    #[test]
    fn stable_setup_has_stability_index_one() {
        // One alternative dominates everywhere; no weight change can flip it.
        let mut matrix = DecisionMatrix::zeros(2, 2);
        matrix.set(0, 0, IntervalRating::new(8.0, 9.0));
        matrix.set(0, 1, IntervalRating::new(8.0, 9.0));
        matrix.set(1, 0, IntervalRating::new(1.0, 2.0));
        matrix.set(1, 1, IntervalRating::new(1.0, 2.0));

        let analysis = SensitivityAnalyzer::weight_perturbation_analysis(
            &matrix,
            &[0.5, 0.5],
            &[Polarity::Benefit; 2],
            &names("Criterion", 2),
            &names("Option", 2),
            &PerturbationConfig::default(),
        )
        .unwrap();

        assert_eq!(analysis.stability_index, 1.0);
        for series in &analysis.series {
            assert!(series.reversals.is_empty());
            assert!(series.critical_perturbation_pct.is_none());
        }
    }

    #[test]
    fn top_n_filter_restricts_displayed_alternatives() {
        let matrix = supplier_matrix();
        let config = PerturbationConfig {
            range: 0.2,
            steps: 11,
            top_n: Some(2),
        };
        let analysis = SensitivityAnalyzer::weight_perturbation_analysis(
            &matrix,
            &[0.5, 0.3, 0.2],
            &[Polarity::Benefit; 3],
            &names("Criterion", 3),
            &names("Supplier", 3),
            &config,
        )
        .unwrap();

        for series in &analysis.series {
            assert_eq!(series.analyzed_alternatives.len(), 2);
            // Closeness is still computed for every alternative.
            assert_eq!(series.closeness_per_step[0].len(), 3);
        }
    }

    #[test]
    fn empty_matrix_is_no_data() {
        let matrix = DecisionMatrix::zeros(0, 0);
        let result = SensitivityAnalyzer::weight_perturbation_analysis(
            &matrix,
            &[],
            &[],
            &[],
            &[],
            &PerturbationConfig::default(),
        );
        assert!(matches!(result, Err(AnalysisError::NoData { .. })));
    }

    // Parent Perturbation Tests

    fn two_parent_hierarchy() -> Vec<CriterionNode> {
        let mut criteria = vec![
            CriterionNode::new(1, Polarity::Benefit),
            CriterionNode::new(2, Polarity::Benefit),
            CriterionNode::child_of(3, 1, Polarity::Benefit),
            CriterionNode::child_of(4, 1, Polarity::Benefit),
            CriterionNode::child_of(5, 2, Polarity::Benefit),
        ];
        criteria[0].global_weight = 0.45;
        criteria[1].global_weight = 0.55;
        criteria[2].global_weight = 0.27;
        criteria[3].global_weight = 0.18;
        criteria[4].global_weight = 0.55;
        criteria
    }

    #[test]
    fn parent_sweep_rejects_single_parent() {
        let mut criteria = vec![
            CriterionNode::new(1, Polarity::Benefit),
            CriterionNode::child_of(2, 1, Polarity::Benefit),
            CriterionNode::child_of(3, 1, Polarity::Benefit),
        ];
        criteria[0].global_weight = 1.0;
        criteria[1].global_weight = 0.5;
        criteria[2].global_weight = 0.5;

        let matrix = supplier_matrix();
        let result = SensitivityAnalyzer::parent_perturbation_analysis(
            &matrix,
            &criteria,
            CriterionId::new(1),
            "Main group",
            &[Polarity::Benefit; 2],
            &names("Supplier", 3),
            &PerturbationConfig::default(),
        );

        assert_eq!(
            result.unwrap_err(),
            AnalysisError::SingleParentPerturbation { parent_count: 1 }
        );
    }

    #[test]
    fn parent_sweep_propagates_baseline_ratios() {
        let criteria = two_parent_hierarchy();
        // Leaves are 3, 4, 5 in flat order.
        let mut matrix = DecisionMatrix::zeros(2, 3);
        matrix.set(0, 0, IntervalRating::new(7.0, 9.0));
        matrix.set(0, 1, IntervalRating::new(5.0, 7.0));
        matrix.set(0, 2, IntervalRating::new(1.0, 3.0));
        matrix.set(1, 0, IntervalRating::new(1.0, 3.0));
        matrix.set(1, 1, IntervalRating::new(3.0, 5.0));
        matrix.set(1, 2, IntervalRating::new(7.0, 9.0));

        let series = SensitivityAnalyzer::parent_perturbation_analysis(
            &matrix,
            &criteria,
            CriterionId::new(1),
            "Technical",
            &[Polarity::Benefit; 3],
            &names("Supplier", 2),
            &PerturbationConfig {
                range: 0.9,
                steps: 11,
                top_n: None,
            },
        )
        .unwrap();

        assert_eq!(series.criterion, "Technical");
        assert_eq!(series.perturbation_pcts.len(), 11);
        // At the 0% step the parent keeps its baseline weight.
        let zero_step = series
            .perturbation_pcts
            .iter()
            .position(|p| p.abs() < 1e-6)
            .unwrap();
        assert!((series.target_weights[zero_step] - 0.45).abs() < 1e-9);
        // Strengthening the parent past break-even flips the suppliers.
        assert!(!series.reversals.is_empty());
        assert!(series.critical_perturbation_pct.unwrap() > 0.0);
    }

    #[test]
    fn parent_sweep_rejects_leaf_target() {
        let criteria = two_parent_hierarchy();
        let matrix = supplier_matrix();
        let result = SensitivityAnalyzer::parent_perturbation_analysis(
            &matrix,
            &criteria,
            CriterionId::new(5),
            "Leaf",
            &[Polarity::Benefit; 3],
            &names("Supplier", 3),
            &PerturbationConfig::default(),
        );
        assert!(matches!(result, Err(AnalysisError::NoData { .. })));
    }

    #[test]
    fn rank_change_display_names_direction() {
        let change = RankChange {
            alternative: "Supplier B".to_string(),
            from_rank: 2,
            to_rank: 1,
        };
        assert!(change.improved());
        assert_eq!(format!("{}", change), "Supplier B: rank 2 -> 1 (up)");
    }

    // Property Tests

    proptest! {
        #[test]
        fn renormalized_weights_always_sum_to_one(
            raw in proptest::collection::vec(0.01..1.0f64, 2..8),
            target_fraction in 0.0..1.0f64,
            delta in -0.5..0.5f64,
        ) {
            let total: f64 = raw.iter().sum();
            let weights: Vec<f64> = raw.iter().map(|w| w / total).collect();
            let target = ((weights.len() - 1) as f64 * target_fraction) as usize;

            let out = SensitivityAnalyzer::renormalize_after_perturbation(&weights, target, delta);

            let sum: f64 = out.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
            for w in &out {
                prop_assert!(*w >= 0.0);
                prop_assert!(*w <= 1.0);
            }
        }
    }
}
