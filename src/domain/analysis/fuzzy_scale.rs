//! Linguistic judgment scale for pairwise comparisons.
//!
//! Maps an integer judgment to a triangular fuzzy number. The scale is
//! intentionally asymmetric: positive 1..9 means "row more important",
//! negative -2..-9 means "column more important", and there is no -1;
//! equal importance is only reachable via +1.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::domain::foundation::{AnalysisError, TriangularFuzzyNumber};

struct ScaleEntry {
    number: TriangularFuzzyNumber,
    label: &'static str,
}

/// 17-level fuzzy linguistic scale.
static LINGUISTIC_SCALE: Lazy<HashMap<i8, ScaleEntry>> = Lazy::new(|| {
    let tfn = TriangularFuzzyNumber::new;
    let mut scale = HashMap::new();
    let mut put = |value: i8, number: TriangularFuzzyNumber, label: &'static str| {
        scale.insert(value, ScaleEntry { number, label });
    };

    put(-9, tfn(1.0 / 9.0, 1.0 / 9.0, 1.0 / 8.0), "Absolutely less important");
    put(-8, tfn(1.0 / 9.0, 1.0 / 8.0, 1.0 / 7.0), "Very, very strongly less important");
    put(-7, tfn(1.0 / 8.0, 1.0 / 7.0, 1.0 / 6.0), "Strongly very less important");
    put(-6, tfn(1.0 / 7.0, 1.0 / 6.0, 1.0 / 5.0), "Strongly plus less important");
    put(-5, tfn(1.0 / 6.0, 1.0 / 5.0, 1.0 / 4.0), "Strongly less important");
    put(-4, tfn(1.0 / 5.0, 1.0 / 4.0, 1.0 / 3.0), "Moderately plus less important");
    put(-3, tfn(1.0 / 4.0, 1.0 / 3.0, 1.0 / 2.0), "Moderately less important");
    put(-2, tfn(1.0 / 3.0, 1.0 / 2.0, 1.0), "Weakly or slightly less important");
    put(1, tfn(1.0, 1.0, 1.0), "Equally important");
    put(2, tfn(1.0, 2.0, 3.0), "Weakly or slightly more important");
    put(3, tfn(2.0, 3.0, 4.0), "Moderately more important");
    put(4, tfn(3.0, 4.0, 5.0), "Moderately plus more important");
    put(5, tfn(4.0, 5.0, 6.0), "Strongly more important");
    put(6, tfn(5.0, 6.0, 7.0), "Strongly plus more important");
    put(7, tfn(6.0, 7.0, 8.0), "Strongly very more important");
    put(8, tfn(7.0, 8.0, 9.0), "Very, very strongly more important");
    put(9, tfn(8.0, 9.0, 9.0), "Absolutely more important");

    scale
});

/// Lookup into the linguistic judgment scale.
pub struct FuzzyScale;

impl FuzzyScale {
    /// Returns the fuzzy number for a judgment value.
    ///
    /// # Errors
    /// `InvalidScaleValue` for 0, -1, or values outside [-9, 9].
    pub fn get(value: i8) -> Result<TriangularFuzzyNumber, AnalysisError> {
        LINGUISTIC_SCALE
            .get(&value)
            .map(|entry| entry.number)
            .ok_or(AnalysisError::InvalidScaleValue { value })
    }

    /// Returns the linguistic label for a judgment value.
    pub fn label(value: i8) -> Result<&'static str, AnalysisError> {
        LINGUISTIC_SCALE
            .get(&value)
            .map(|entry| entry.label)
            .ok_or(AnalysisError::InvalidScaleValue { value })
    }

    /// Returns true if the value is on the scale.
    pub fn is_valid(value: i8) -> bool {
        LINGUISTIC_SCALE.contains_key(&value)
    }

    /// All scale values in ascending order.
    pub fn values() -> Vec<i8> {
        let mut values: Vec<i8> = LINGUISTIC_SCALE.keys().copied().collect();
        values.sort_unstable();
        values
    }
}
