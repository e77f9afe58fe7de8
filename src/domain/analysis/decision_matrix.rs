//! Interval decision matrix: alternatives rated against leaf criteria.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{CriterionId, IntervalRating};

/// A stored performance rating, as supplied by the persistence collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub expert_id: i64,
    pub alternative_id: i64,
    pub criterion: CriterionId,
    pub lower: f64,
    pub upper: f64,
}

impl RatingRecord {
    /// Creates a rating record.
    pub fn new(
        expert_id: i64,
        alternative_id: i64,
        criterion: impl Into<CriterionId>,
        rating: IntervalRating,
    ) -> Self {
        Self {
            expert_id,
            alternative_id,
            criterion: criterion.into(),
            lower: rating.lower(),
            upper: rating.upper(),
        }
    }

    /// The rating as an interval.
    pub fn rating(&self) -> IntervalRating {
        IntervalRating::new(self.lower, self.upper)
    }
}

/// Linguistic performance ratings and their interval values.
static LINGUISTIC_RATINGS: Lazy<HashMap<&'static str, IntervalRating>> = Lazy::new(|| {
    HashMap::from([
        ("Very Poor", IntervalRating::new(0.0, 1.0)),
        ("Poor", IntervalRating::new(1.0, 3.0)),
        ("Fair", IntervalRating::new(3.0, 5.0)),
        ("Good", IntervalRating::new(5.0, 7.0)),
        ("Very Good", IntervalRating::new(7.0, 9.0)),
        ("Excellent", IntervalRating::new(9.0, 10.0)),
    ])
});

/// Returns the interval for a linguistic rating label, if it exists.
pub fn linguistic_rating(label: &str) -> Option<IntervalRating> {
    LINGUISTIC_RATINGS.get(label).copied()
}

/// An alternatives x criteria grid of interval ratings, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionMatrix {
    alternatives: usize,
    criteria: usize,
    cells: Vec<IntervalRating>,
}

impl DecisionMatrix {
    /// Creates a matrix of the given shape filled with a single rating.
    pub fn filled(alternatives: usize, criteria: usize, rating: IntervalRating) -> Self {
        Self {
            alternatives,
            criteria,
            cells: vec![rating; alternatives * criteria],
        }
    }

    /// Creates a matrix of the given shape filled with [0, 0].
    pub fn zeros(alternatives: usize, criteria: usize) -> Self {
        Self::filled(alternatives, criteria, IntervalRating::ZERO)
    }

    /// Number of alternatives (rows).
    pub fn alternatives(&self) -> usize {
        self.alternatives
    }

    /// Number of criteria (columns).
    pub fn criteria(&self) -> usize {
        self.criteria
    }

    /// Returns the rating of an alternative on a criterion.
    pub fn get(&self, alternative: usize, criterion: usize) -> IntervalRating {
        debug_assert!(alternative < self.alternatives && criterion < self.criteria);
        self.cells[alternative * self.criteria + criterion]
    }

    /// Sets the rating of an alternative on a criterion.
    pub fn set(&mut self, alternative: usize, criterion: usize, rating: IntervalRating) {
        debug_assert!(alternative < self.alternatives && criterion < self.criteria);
        self.cells[alternative * self.criteria + criterion] = rating;
    }

    /// Builds one expert's matrix from flat rating records.
    ///
    /// Rows follow `alternative_ids` order, columns follow `criteria_ids`
    /// order. Cells with no matching record take `default` (callers
    /// typically pass the "Fair" interval). Records naming an unknown
    /// alternative or criterion are dropped.
    pub fn from_records(
        alternative_ids: &[i64],
        criteria_ids: &[CriterionId],
        records: &[RatingRecord],
        default: IntervalRating,
    ) -> Self {
        let alt_index: HashMap<i64, usize> = alternative_ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (*id, idx))
            .collect();
        let crit_index: HashMap<CriterionId, usize> = criteria_ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (*id, idx))
            .collect();

        let mut matrix = Self::filled(alternative_ids.len(), criteria_ids.len(), default);
        for record in records {
            let (Some(&i), Some(&j)) = (
                alt_index.get(&record.alternative_id),
                crit_index.get(&record.criterion),
            ) else {
                continue;
            };
            matrix.set(i, j, record.rating());
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_has_requested_shape() {
        let matrix = DecisionMatrix::zeros(3, 2);
        assert_eq!(matrix.alternatives(), 3);
        assert_eq!(matrix.criteria(), 2);
        assert_eq!(matrix.get(2, 1), IntervalRating::ZERO);
    }

    #[test]
    fn set_and_get_round_trip() {
        let mut matrix = DecisionMatrix::zeros(2, 2);
        matrix.set(1, 0, IntervalRating::new(3.0, 5.0));
        assert_eq!(matrix.get(1, 0), IntervalRating::new(3.0, 5.0));
        assert_eq!(matrix.get(0, 0), IntervalRating::ZERO);
    }

    #[test]
    fn from_records_places_ratings_and_defaults() {
        let alternatives = [100, 200];
        let criteria = [CriterionId::new(1), CriterionId::new(2)];
        let records = [RatingRecord::new(1, 200, 1, IntervalRating::new(7.0, 9.0))];
        let fair = linguistic_rating("Fair").unwrap();

        let matrix = DecisionMatrix::from_records(&alternatives, &criteria, &records, fair);

        assert_eq!(matrix.get(1, 0), IntervalRating::new(7.0, 9.0));
        // Missing cells fall back to the supplied default.
        assert_eq!(matrix.get(0, 0), fair);
        assert_eq!(matrix.get(0, 1), fair);
    }

    #[test]
    fn from_records_drops_unknown_ids() {
        let alternatives = [100];
        let criteria = [CriterionId::new(1)];
        let records = [RatingRecord::new(1, 999, 1, IntervalRating::new(9.0, 10.0))];

        let matrix =
            DecisionMatrix::from_records(&alternatives, &criteria, &records, IntervalRating::ZERO);
        assert_eq!(matrix.get(0, 0), IntervalRating::ZERO);
    }

    #[test]
    fn linguistic_ratings_cover_standard_labels() {
        assert_eq!(
            linguistic_rating("Fair").unwrap(),
            IntervalRating::new(3.0, 5.0)
        );
        assert_eq!(
            linguistic_rating("Excellent").unwrap(),
            IntervalRating::new(9.0, 10.0)
        );
        assert!(linguistic_rating("Mediocre").is_none());
    }

    #[test]
    fn serializes_round_trip() {
        let mut matrix = DecisionMatrix::zeros(1, 2);
        matrix.set(0, 1, IntervalRating::new(1.0, 2.0));

        let json = serde_json::to_string(&matrix).unwrap();
        let restored: DecisionMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, matrix);
    }
}
