//! Score Aggregator - weighted overall score.
//!
//! The same arithmetic serves the AI and the human path so the two overall
//! scores are directly comparable.

use crate::domain::ScoreMap;

/// Overall score returned for degenerate input (no scores, zero weight).
pub const NEUTRAL_SCORE: f64 = 3.0;

/// Weighted mean of the scores, rounded to 2 decimals.
pub fn aggregate(scores: &ScoreMap) -> f64 {
    let (weighted, total_weight) = scores
        .values()
        .fold((0.0, 0.0), |(weighted, total), s| {
            (weighted + s.score * s.weight, total + s.weight)
        });

    if scores.is_empty() || total_weight == 0.0 {
        return NEUTRAL_SCORE;
    }

    round2(weighted / total_weight)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
