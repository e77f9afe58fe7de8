//! Triangular fuzzy number value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A triangular fuzzy number (l, m, u) with l <= m <= u.
///
/// Represents an imprecise judgment or weight: `m` is the most likely
/// value, `l` and `u` bound the support.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangularFuzzyNumber {
    l: f64,
    m: f64,
    u: f64,
}

impl TriangularFuzzyNumber {
    /// The multiplicative identity (1, 1, 1), also "equally important".
    pub const ONE: Self = Self {
        l: 1.0,
        m: 1.0,
        u: 1.0,
    };

    /// The additive identity (0, 0, 0).
    pub const ZERO: Self = Self {
        l: 0.0,
        m: 0.0,
        u: 0.0,
    };

    /// Creates a new fuzzy number, sorting the components into l <= m <= u order.
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        let mut v = [a, b, c];
        v.sort_by(|x, y| x.total_cmp(y));
        Self {
            l: v[0],
            m: v[1],
            u: v[2],
        }
    }

    /// Creates a fuzzy number, returning an error if the components are out of order.
    pub fn try_new(l: f64, m: f64, u: f64) -> Result<Self, ValidationError> {
        if !(l <= m && m <= u) {
            return Err(ValidationError::constraint_violation(
                "fuzzy number",
                "l <= m <= u",
                format!("({}, {}, {})", l, m, u),
            ));
        }
        Ok(Self { l, m, u })
    }

    /// Lower bound.
    pub fn l(&self) -> f64 {
        self.l
    }

    /// Most likely value.
    pub fn m(&self) -> f64 {
        self.m
    }

    /// Upper bound.
    pub fn u(&self) -> f64 {
        self.u
    }

    /// Order-reversing reciprocal: (1/u, 1/m, 1/l).
    ///
    /// Zero components map to 0 rather than infinity; a zero cell is an
    /// expected degenerate input, not an error.
    pub fn reciprocal(&self) -> Self {
        let inv = |x: f64| if x > 0.0 { 1.0 / x } else { 0.0 };
        Self {
            l: inv(self.u),
            m: inv(self.m),
            u: inv(self.l),
        }
    }

    /// Component-wise product with another fuzzy number.
    pub fn multiply(&self, other: &Self) -> Self {
        Self {
            l: self.l * other.l,
            m: self.m * other.m,
            u: self.u * other.u,
        }
    }

    /// Component-wise sum with another fuzzy number.
    pub fn add(&self, other: &Self) -> Self {
        Self {
            l: self.l + other.l,
            m: self.m + other.m,
            u: self.u + other.u,
        }
    }

    /// Centre-of-area defuzzification: (l + m + u) / 3.
    pub fn centroid(&self) -> f64 {
        (self.l + self.m + self.u) / 3.0
    }
}

impl fmt::Display for TriangularFuzzyNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.l, self.m, self.u)
    }
}
