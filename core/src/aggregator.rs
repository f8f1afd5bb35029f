//! Weighted aggregation of factor scores.

use crate::factor::FactorScore;

/// Σ points × weight, accumulated in the order given. No rounding.
pub fn weighted_total(scores: &[FactorScore]) -> f64 {
    scores
        .iter()
        .fold(0.0, |total, score| total + score.contribution())
}
