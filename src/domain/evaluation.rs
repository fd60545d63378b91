//! Evaluation record domain types.
//!
//! An [`Evaluation`] is the outcome of one judging pass. It is created with
//! the AI judgment filled in and may later receive exactly one human
//! judgment for comparison.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Decision, UseCase};
use crate::error::{EvalError, EvalResult};

/// Absolute score difference below which AI and human agree closely.
pub const HIGH_AGREEMENT_DIFF: f64 = 0.5;
/// Absolute score difference below which agreement is still moderate.
pub const MODERATE_AGREEMENT_DIFF: f64 = 1.0;

/// Score for a single criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CriterionScore {
    /// Score on the 1-5 scale (not clamped).
    pub score: f64,
    /// Justification for the score.
    pub explanation: String,
    /// Weight copied from the registry when the score was produced.
    pub weight: f64,
}

impl CriterionScore {
    pub fn new(score: f64, explanation: impl Into<String>, weight: f64) -> Self {
        Self {
            score,
            explanation: explanation.into(),
            weight,
        }
    }
}

/// Criterion key -> score, in rubric order. Always covers exactly one
/// criteria set.
pub type ScoreMap = IndexMap<String, CriterionScore>;

/// A human reviewer's judgment of the same content.
#[derive(Debug, Clone, PartialEq)]
pub struct HumanJudgment {
    pub scores: ScoreMap,
    pub overall_score: f64,
    pub decision: Decision,
    pub feedback: Option<String>,
}

/// Whether a record has received its human judgment yet.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JudgmentState {
    #[default]
    Unjudged,
    Judged(HumanJudgment),
}

/// How closely the human overall score tracks the AI overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AgreementLevel {
    /// Difference below 0.5.
    High,
    /// Difference below 1.0.
    Moderate,
    /// Difference of 1.0 or more.
    Low,
}

impl AgreementLevel {
    pub fn from_difference(abs_difference: f64) -> Self {
        if abs_difference < HIGH_AGREEMENT_DIFF {
            AgreementLevel::High
        } else if abs_difference < MODERATE_AGREEMENT_DIFF {
            AgreementLevel::Moderate
        } else {
            AgreementLevel::Low
        }
    }
}

impl std::fmt::Display for AgreementLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgreementLevel::High => write!(f, "high"),
            AgreementLevel::Moderate => write!(f, "moderate"),
            AgreementLevel::Low => write!(f, "low"),
        }
    }
}

/// Comparison of the AI and human judgments on one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Agreement {
    /// Human overall minus AI overall, rounded to 2 decimals.
    pub delta: f64,
    pub level: AgreementLevel,
    /// Whether both judgments landed in the same triage bucket.
    pub decisions_match: bool,
}

/// The outcome of one judging pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "EvaluationRecord", try_from = "EvaluationRecord")]
pub struct Evaluation {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub use_case: UseCase,
    pub content: String,
    pub context: Option<String>,
    pub ai_scores: ScoreMap,
    pub ai_overall_score: f64,
    pub ai_decision: Decision,
    judgment: JudgmentState,
}

impl Evaluation {
    /// Create a fresh, unjudged record with a new id and the current time.
    pub fn new(
        use_case: UseCase,
        content: impl Into<String>,
        context: Option<String>,
        ai_scores: ScoreMap,
        ai_overall_score: f64,
        ai_decision: Decision,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            use_case,
            content: content.into(),
            context,
            ai_scores,
            ai_overall_score,
            ai_decision,
            judgment: JudgmentState::Unjudged,
        }
    }

    pub fn is_judged(&self) -> bool {
        matches!(self.judgment, JudgmentState::Judged(_))
    }

    pub fn human(&self) -> Option<&HumanJudgment> {
        match &self.judgment {
            JudgmentState::Judged(human) => Some(human),
            JudgmentState::Unjudged => None,
        }
    }

    pub fn human_scores(&self) -> Option<&ScoreMap> {
        self.human().map(|h| &h.scores)
    }

    pub fn human_overall_score(&self) -> Option<f64> {
        self.human().map(|h| h.overall_score)
    }

    pub fn human_decision(&self) -> Option<Decision> {
        self.human().map(|h| h.decision)
    }

    pub fn human_feedback(&self) -> Option<&str> {
        self.human().and_then(|h| h.feedback.as_deref())
    }

    /// Record the human judgment. Only the first call succeeds.
    pub(crate) fn attach_human(&mut self, judgment: HumanJudgment) -> EvalResult<()> {
        if self.is_judged() {
            return Err(EvalError::AlreadyJudged(self.id));
        }
        self.judgment = JudgmentState::Judged(judgment);
        Ok(())
    }

    /// AI/human comparison, once a human judgment exists.
    pub fn agreement(&self) -> Option<Agreement> {
        let human = self.human()?;
        let delta = round2(human.overall_score - self.ai_overall_score);
        Some(Agreement {
            delta,
            level: AgreementLevel::from_difference(delta.abs()),
            decisions_match: human.decision == self.ai_decision,
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Wire form of an [`Evaluation`], used for export and the HTTP API.
///
/// Human fields are either all present or all absent (feedback may be
/// absent on its own).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub use_case: UseCase,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub ai_scores: ScoreMap,
    pub ai_overall_score: f64,
    pub ai_decision: Decision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_scores: Option<ScoreMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_overall_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_decision: Option<Decision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_feedback: Option<String>,
}

impl From<Evaluation> for EvaluationRecord {
    fn from(evaluation: Evaluation) -> Self {
        let (human_scores, human_overall_score, human_decision, human_feedback) =
            match evaluation.judgment {
                JudgmentState::Judged(human) => (
                    Some(human.scores),
                    Some(human.overall_score),
                    Some(human.decision),
                    human.feedback,
                ),
                JudgmentState::Unjudged => (None, None, None, None),
            };

        Self {
            id: evaluation.id,
            timestamp: evaluation.timestamp,
            use_case: evaluation.use_case,
            content: evaluation.content,
            context: evaluation.context,
            ai_scores: evaluation.ai_scores,
            ai_overall_score: evaluation.ai_overall_score,
            ai_decision: evaluation.ai_decision,
            human_scores,
            human_overall_score,
            human_decision,
            human_feedback,
        }
    }
}

impl TryFrom<EvaluationRecord> for Evaluation {
    type Error = String;

    fn try_from(record: EvaluationRecord) -> Result<Self, Self::Error> {
        let judgment = match (
            record.human_scores,
            record.human_overall_score,
            record.human_decision,
        ) {
            (Some(scores), Some(overall_score), Some(decision)) => {
                JudgmentState::Judged(HumanJudgment {
                    scores,
                    overall_score,
                    decision,
                    feedback: record.human_feedback,
                })
            }
            (None, None, None) if record.human_feedback.is_none() => JudgmentState::Unjudged,
            _ => {
                return Err(format!(
                    "evaluation {} has an incomplete human judgment",
                    record.id
                ))
            }
        };

        Ok(Self {
            id: record.id,
            timestamp: record.timestamp,
            use_case: record.use_case,
            content: record.content,
            context: record.context,
            ai_scores: record.ai_scores,
            ai_overall_score: record.ai_overall_score,
            ai_decision: record.ai_decision,
            judgment,
        })
    }
}
