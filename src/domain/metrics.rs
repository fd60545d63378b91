//! History metrics over a collection of evaluations.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Decision, Evaluation};

/// Count of AI decisions per triage bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecisionCounts {
    pub auto_pass: usize,
    pub auto_fail: usize,
    pub human_review: usize,
}

impl DecisionCounts {
    fn record(&mut self, decision: Decision) {
        match decision {
            Decision::AutoPass => self.auto_pass += 1,
            Decision::AutoFail => self.auto_fail += 1,
            Decision::HumanReview => self.human_review += 1,
        }
    }
}

/// Summary of an evaluation history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    /// Total number of evaluations.
    pub total_evaluations: usize,
    /// AI triage decisions.
    pub ai_decisions: DecisionCounts,
    /// Mean AI overall score; absent for an empty history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_ai_score: Option<f64>,
    /// Evaluations carrying a human judgment.
    pub human_judged: usize,
    /// Mean human overall score over judged evaluations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_human_score: Option<f64>,
    /// Mean |human - AI| overall difference over judged evaluations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_absolute_difference: Option<f64>,
    /// Share of judged evaluations where AI and human chose the same bucket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_agreement_rate: Option<f64>,
}

impl HistorySummary {
    pub fn from_evaluations<'a, I>(evaluations: I) -> Self
    where
        I: IntoIterator<Item = &'a Evaluation>,
    {
        let mut summary = HistorySummary::default();
        let mut ai_total = 0.0;
        let mut human_total = 0.0;
        let mut diff_total = 0.0;
        let mut matching = 0usize;

        for evaluation in evaluations {
            summary.total_evaluations += 1;
            summary.ai_decisions.record(evaluation.ai_decision);
            ai_total += evaluation.ai_overall_score;

            if let Some(human) = evaluation.human() {
                summary.human_judged += 1;
                human_total += human.overall_score;
                diff_total += (human.overall_score - evaluation.ai_overall_score).abs();
                if human.decision == evaluation.ai_decision {
                    matching += 1;
                }
            }
        }

        if summary.total_evaluations > 0 {
            summary.average_ai_score = Some(round2(ai_total / summary.total_evaluations as f64));
        }
        if summary.human_judged > 0 {
            let judged = summary.human_judged as f64;
            summary.average_human_score = Some(round2(human_total / judged));
            summary.mean_absolute_difference = Some(round2(diff_total / judged));
            summary.decision_agreement_rate = Some(round2(matching as f64 / judged));
        }

        summary
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
