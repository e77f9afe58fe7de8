//! Sensitivity analysis - how weight uncertainty affects rankings.
//!
//! Two complementary views:
//!
//! - Perturbation sweeps move one criterion's weight across a range while
//!   renormalizing the rest, rerank at each step, and report where the
//!   ranking flips.
//! - Monte Carlo simulation perturbs all weights at once with Dirichlet
//!   draws and measures how often each ranking occurs.
//!
//! Both operate on final aggregated weights; comparison matrices are
//! never modified. This is a what-if analysis over the weight vector.

mod monte_carlo;
mod perturbation;

pub use monte_carlo::{
    AlternativeRankStats, MonteCarloConfig, MonteCarloResult, OrderFrequency,
};
pub use perturbation::{
    PerturbationAnalysis, PerturbationConfig, PerturbationSeries, RankChange, RankReversal,
};

/// Weight-perturbation and robustness analysis functions.
pub struct SensitivityAnalyzer;
