//! Evaluator - orchestrates one judging pass.
//!
//! This is the central component: it resolves the rubric, prompts the
//! judge, parses and aggregates the scores, and triages the result. It also
//! attaches a later human judgment using the same aggregation and policy.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{
    CriteriaRegistry, CriterionScore, DecisionPolicy, Evaluation, HumanJudgment, ScoreMap,
};
use crate::engine::{aggregate, build_prompt, parse_response, JudgeClient};
use crate::error::{EvalError, EvalResult};

/// Explanation stored on every human-provided criterion score.
pub const HUMAN_RATING_EXPLANATION: &str = "Human rating";

/// Runs evaluations against a shared, read-only criteria registry.
pub struct Evaluator {
    registry: Arc<CriteriaRegistry>,
    policy: DecisionPolicy,
    judge: Box<dyn JudgeClient>,
}

impl Evaluator {
    pub fn new(
        registry: Arc<CriteriaRegistry>,
        policy: DecisionPolicy,
        judge: Box<dyn JudgeClient>,
    ) -> Self {
        Self {
            registry,
            policy,
            judge,
        }
    }

    pub fn registry(&self) -> &CriteriaRegistry {
        &self.registry
    }

    pub fn judge_model(&self) -> &str {
        self.judge.model()
    }

    /// Score content with the judge and triage the result.
    ///
    /// Pipeline order:
    /// 1. Resolve the criteria set for the use case
    /// 2. Build the prompt
    /// 3. Call the judge (failure aborts, no record is produced)
    /// 4. Parse the response (never fails)
    /// 5. Aggregate and decide
    pub fn evaluate(
        &self,
        content: &str,
        use_case: &str,
        context: Option<&str>,
    ) -> EvalResult<Evaluation> {
        let criteria = self.registry.get_criteria_set(use_case)?;
        let context = normalize(context);

        let prompt = build_prompt(content, criteria.use_case, context.as_deref(), criteria);

        let raw = self.judge.send(&prompt).map_err(|e| match e {
            EvalError::JudgeUnavailable(_) => e,
            other => EvalError::JudgeUnavailable(other.to_string()),
        })?;

        let ai_scores = parse_response(&raw, criteria);
        let ai_overall_score = aggregate(&ai_scores);
        let ai_decision = self.policy.decide(ai_overall_score);

        let evaluation = Evaluation::new(
            criteria.use_case,
            content,
            context,
            ai_scores,
            ai_overall_score,
            ai_decision,
        );

        tracing::info!(
            evaluation_id = %evaluation.id,
            use_case = %evaluation.use_case,
            model = %self.judge.model(),
            content_len = content.len(),
            overall_score = evaluation.ai_overall_score,
            decision = %evaluation.ai_decision,
            "Evaluation complete"
        );

        Ok(evaluation)
    }

    /// Attach a human judgment to an evaluation.
    ///
    /// `scores` must hold exactly one score per criterion of the record's
    /// use case. On any error the record is left unchanged.
    pub fn attach_human_judgment(
        &self,
        evaluation: &mut Evaluation,
        scores: &BTreeMap<String, f64>,
        feedback: Option<String>,
    ) -> EvalResult<()> {
        if evaluation.is_judged() {
            return Err(EvalError::AlreadyJudged(evaluation.id));
        }

        let criteria = self.registry.get(evaluation.use_case);

        if let Some(unknown) = scores.keys().find(|k| !criteria.contains(k)) {
            return Err(EvalError::InvalidHumanJudgment(format!(
                "'{}' is not a criterion of {}",
                unknown, criteria.use_case
            )));
        }

        let mut human_scores = ScoreMap::new();
        for criterion in criteria.iter() {
            let score = scores.get(&criterion.key).copied().ok_or_else(|| {
                EvalError::InvalidHumanJudgment(format!("missing score for '{}'", criterion.key))
            })?;
            if !score.is_finite() {
                return Err(EvalError::InvalidHumanJudgment(format!(
                    "score for '{}' is not a finite number",
                    criterion.key
                )));
            }
            human_scores.insert(
                criterion.key.clone(),
                CriterionScore::new(score, HUMAN_RATING_EXPLANATION, criterion.weight),
            );
        }

        let overall_score = aggregate(&human_scores);
        let decision = self.policy.decide(overall_score);

        evaluation.attach_human(HumanJudgment {
            scores: human_scores,
            overall_score,
            decision,
            feedback: normalize(feedback.as_deref()),
        })?;

        tracing::info!(
            evaluation_id = %evaluation.id,
            ai_score = evaluation.ai_overall_score,
            human_score = overall_score,
            human_decision = %decision,
            "Human judgment recorded"
        );

        Ok(())
    }
}

/// Blank free text counts as absent; anything else is kept verbatim.
fn normalize(text: Option<&str>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty()).map(str::to_string)
}
