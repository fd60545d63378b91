//! Triage decision types.
//!
//! Maps an overall score onto one of three buckets.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{EvalError, EvalResult};

/// Default score at or above which content passes automatically.
pub const AUTO_PASS_THRESHOLD: f64 = 4.0;
/// Default score below which content fails automatically.
pub const AUTO_FAIL_THRESHOLD: f64 = 2.5;

/// Triage bucket for a scored piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Good enough to ship without review.
    AutoPass,
    /// Major issues; do not ship.
    AutoFail,
    /// Needs a human reviewer.
    HumanReview,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::AutoPass => write!(f, "auto_pass"),
            Decision::AutoFail => write!(f, "auto_fail"),
            Decision::HumanReview => write!(f, "human_review"),
        }
    }
}

impl std::str::FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto_pass" => Ok(Decision::AutoPass),
            "auto_fail" => Ok(Decision::AutoFail),
            "human_review" => Ok(Decision::HumanReview),
            _ => Err(format!("Unknown decision: {}", s)),
        }
    }
}

/// Threshold policy shared by the AI and human paths.
///
/// Pass is inclusive (`score >= pass`), fail is exclusive (`score < fail`).
/// Anything else, including NaN, goes to human review.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DecisionPolicy {
    pub auto_pass_threshold: f64,
    pub auto_fail_threshold: f64,
}

impl DecisionPolicy {
    pub fn new(auto_pass_threshold: f64, auto_fail_threshold: f64) -> EvalResult<Self> {
        if !auto_pass_threshold.is_finite() || !auto_fail_threshold.is_finite() {
            return Err(EvalError::Config(
                "decision thresholds must be finite".to_string(),
            ));
        }
        if auto_fail_threshold > auto_pass_threshold {
            return Err(EvalError::Config(format!(
                "auto-fail threshold {} is above auto-pass threshold {}",
                auto_fail_threshold, auto_pass_threshold
            )));
        }
        Ok(Self {
            auto_pass_threshold,
            auto_fail_threshold,
        })
    }

    pub fn decide(&self, overall_score: f64) -> Decision {
        if overall_score >= self.auto_pass_threshold {
            Decision::AutoPass
        } else if overall_score < self.auto_fail_threshold {
            Decision::AutoFail
        } else {
            Decision::HumanReview
        }
    }
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            auto_pass_threshold: AUTO_PASS_THRESHOLD,
            auto_fail_threshold: AUTO_FAIL_THRESHOLD,
        }
    }
}
