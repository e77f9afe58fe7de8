//! Analysis Module - Pure domain services for multi-criteria decisions.
//!
//! This module contains stateless functions that derive criteria weights
//! from expert judgments, rank alternatives under uncertainty, and probe
//! how robust the resulting rankings are.
//!
//! # Components
//!
//! - `FuzzyScale` - Linguistic judgment scale mapped to fuzzy numbers
//! - `FuzzyComparisonMatrix` / `DecisionMatrix` - Fixed-shape input grids
//! - `FuzzyAhpEngine` - Expert aggregation, Buckley weights, consistency
//! - `HierarchicalWeightPropagator` - Global weights over the criteria forest
//! - `IntervalTopsisEngine` - Interval TOPSIS ranking pipeline
//! - `SensitivityAnalyzer` - Perturbation sweeps and Monte Carlo robustness
//!
//! # Design Philosophy
//!
//! All functions are pure and stateless: matrices are built fresh per
//! call from caller-supplied records, results are returned as values, and
//! the only statics are immutable lookup tables. Numeric degeneracies
//! recover locally with documented fallbacks; only structurally invalid
//! input is an error.

mod comparison_matrix;
mod decision_matrix;
mod fuzzy_ahp;
mod fuzzy_scale;
mod hierarchy;
mod interval_topsis;
mod sensitivity;

// Re-export all public types
pub use comparison_matrix::{ComparisonRecord, FuzzyComparisonMatrix};
pub use decision_matrix::{linguistic_rating, DecisionMatrix, RatingRecord};
pub use fuzzy_ahp::{Consistency, FuzzyAhpEngine, WeightDerivation};
pub use fuzzy_scale::FuzzyScale;
pub use hierarchy::{
    GroupConsistency, GroupKey, HierarchicalWeightPropagator, HierarchicalWeights,
};
pub use interval_topsis::{IntervalTopsisEngine, RankingBreakdown, RankingResult};
pub use sensitivity::{
    AlternativeRankStats, MonteCarloConfig, MonteCarloResult, OrderFrequency,
    PerturbationAnalysis, PerturbationConfig, PerturbationSeries, RankChange, RankReversal,
    SensitivityAnalyzer,
};
