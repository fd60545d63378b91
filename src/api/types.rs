//! API request and response types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Agreement, CriteriaSet, EvaluationRecord, UseCase};

// ==================== Evaluations ====================

/// Request to evaluate a piece of content.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EvaluateRequest {
    /// The text to judge. May be empty.
    pub content: String,
    /// Use-case tag, e.g. "marketing_copy".
    #[serde(alias = "useCase")]
    pub use_case: String,
    /// Optional notes for the judge (product, market, audience).
    #[serde(default)]
    pub context: Option<String>,
}

/// Query parameters for listing evaluations.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListEvaluationsQuery {
    /// Filter by use case.
    #[serde(default, alias = "useCase")]
    pub use_case: Option<String>,
    /// Filter by AI decision.
    #[serde(default)]
    pub decision: Option<String>,
    /// Maximum number of results.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination.
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    20
}

/// Response for listing evaluations.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListEvaluationsResponse {
    /// Evaluations, newest first.
    pub evaluations: Vec<EvaluationRecord>,
    /// Total matching the filter (for pagination).
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

// ==================== Human Judgment ====================

/// Request to attach a human judgment.
#[derive(Debug, Deserialize, ToSchema)]
pub struct HumanJudgmentRequest {
    /// One score per criterion key of the record's use case.
    pub scores: BTreeMap<String, f64>,
    /// Optional free-text feedback.
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Response after attaching a human judgment.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HumanJudgmentResponse {
    /// The updated record.
    pub evaluation: EvaluationRecord,
    /// AI/human comparison.
    pub agreement: Agreement,
}

// ==================== Criteria ====================

/// A criterion as shown to reviewers.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CriterionInfo {
    pub key: String,
    pub display_name: String,
    pub description: String,
    pub weight: f64,
    /// Weight as a whole percentage.
    pub weight_percent: u32,
}

/// Rubric for one use case.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaResponse {
    pub use_case: UseCase,
    pub label: String,
    pub criteria: Vec<CriterionInfo>,
}

impl From<&CriteriaSet> for CriteriaResponse {
    fn from(set: &CriteriaSet) -> Self {
        Self {
            use_case: set.use_case,
            label: set.use_case.label().to_string(),
            criteria: set
                .iter()
                .map(|c| CriterionInfo {
                    key: c.key.clone(),
                    display_name: c.display_name.clone(),
                    description: c.description.clone(),
                    weight: c.weight,
                    weight_percent: c.weight_percent(),
                })
                .collect(),
        }
    }
}

// ==================== Health ====================

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Judge model in use.
    pub judge_model: String,
    /// Number of evaluations held in memory.
    pub evaluations: usize,
    /// Server time.
    pub timestamp: DateTime<Utc>,
}
