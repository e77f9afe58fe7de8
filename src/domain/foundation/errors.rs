//! Error types for the domain layer.

use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' must satisfy {constraint}, got {actual}")]
    ConstraintViolation {
        field: String,
        constraint: String,
        actual: String,
    },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },
}

impl ValidationError {
    /// Creates a constraint violation error.
    pub fn constraint_violation(
        field: impl Into<String>,
        constraint: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        ValidationError::ConstraintViolation {
            field: field.into(),
            constraint: constraint.into(),
            actual: actual.into(),
        }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }
}

/// Errors raised by the analysis engines.
///
/// Only structurally invalid calls surface here. Numeric degeneracies
/// (zero normalization factors, zero weight sums, zero distances) recover
/// locally with a documented fallback and never become errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// An operation requiring at least one matrix or rating received none.
    #[error("No {what} provided; at least one is required")]
    NoData { what: String },

    /// A pairwise judgment outside the linguistic scale.
    ///
    /// Valid judgments are -9..=-2 and 1..=9. Zero is undefined and -1
    /// does not exist: equal importance is expressed only as +1.
    #[error("Invalid scale value {value}: must be -9 to 9, excluding 0 and -1")]
    InvalidScaleValue { value: i8 },

    /// Inputs to one aggregation call disagree on shape.
    #[error("Dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    /// Hierarchical parent perturbation requested with a single parent
    /// group: there is no sibling parent to redistribute weight into, so
    /// the sweep would degenerate to a flat line.
    #[error(
        "Cannot perturb parent weights: the hierarchy has {parent_count} parent group(s); \
         at least two are needed to redistribute weight between them"
    )]
    SingleParentPerturbation { parent_count: usize },
}

impl AnalysisError {
    /// Creates a no-data error.
    pub fn no_data(what: impl Into<String>) -> Self {
        AnalysisError::NoData { what: what.into() }
    }

    /// Creates a dimension mismatch error.
    pub fn dimension_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        AnalysisError::DimensionMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }
}
