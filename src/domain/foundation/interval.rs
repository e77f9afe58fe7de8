//! Interval rating value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// An uncertain performance score expressed as a closed interval
/// [lower, upper] with lower <= upper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalRating {
    lower: f64,
    upper: f64,
}

impl IntervalRating {
    /// The zero interval [0, 0].
    pub const ZERO: Self = Self {
        lower: 0.0,
        upper: 0.0,
    };

    /// Creates a new interval, swapping the bounds if they are reversed.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { lower: a, upper: b }
        } else {
            Self { lower: b, upper: a }
        }
    }

    /// Creates an interval, returning an error if lower > upper.
    pub fn try_new(lower: f64, upper: f64) -> Result<Self, ValidationError> {
        if lower > upper {
            return Err(ValidationError::constraint_violation(
                "interval rating",
                "lower <= upper",
                format!("[{}, {}]", lower, upper),
            ));
        }
        Ok(Self { lower, upper })
    }

    /// Lower bound.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper bound.
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Euclidean distance between two intervals:
    /// sqrt((a.lower - b.lower)^2 + (a.upper - b.upper)^2).
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dl = self.lower - other.lower;
        let du = self.upper - other.upper;
        (dl * dl + du * du).sqrt()
    }

    /// Multiplies both bounds by a non-negative scalar.
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            lower: self.lower * factor,
            upper: self.upper * factor,
        }
    }
}

impl fmt::Display for IntervalRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}
