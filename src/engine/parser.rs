//! Response Parser - turns raw judge output into a complete score map.
//!
//! Parsing never fails outward. Anything the judge gets wrong degrades to
//! neutral midpoint scores so the evaluation lands in human review instead
//! of aborting the pipeline.

use serde_json::{Map, Value};

use crate::domain::{CriteriaSet, CriterionScore, ScoreMap};

/// Score used for any criterion the judge did not score usably.
pub const FALLBACK_SCORE: f64 = 3.0;
pub const PARSE_ERROR_EXPLANATION: &str = "Error parsing response";
pub const MISSING_SCORE_EXPLANATION: &str = "Score not provided by evaluator";

const FENCE: &str = "```";
const LOG_PREVIEW_CHARS: usize = 500;

/// Result of interpreting a judge response.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// The response was usable. `missing` lists keys filled by fallback.
    Parsed {
        scores: ScoreMap,
        missing: Vec<String>,
    },
    /// The response was unusable; every criterion holds the fallback score.
    Fallback { scores: ScoreMap, reason: String },
}

impl ParseOutcome {
    pub fn into_scores(self) -> ScoreMap {
        match self {
            ParseOutcome::Parsed { scores, .. } | ParseOutcome::Fallback { scores, .. } => scores,
        }
    }
}

/// Parse a judge response into a score map covering every criterion.
pub fn parse_response(raw: &str, criteria: &CriteriaSet) -> ScoreMap {
    let outcome = interpret_response(raw, criteria);

    match &outcome {
        ParseOutcome::Parsed { missing, .. } if !missing.is_empty() => {
            tracing::warn!(
                use_case = %criteria.use_case,
                missing = ?missing,
                "Judge response omitted criteria, using fallback scores"
            );
        }
        ParseOutcome::Parsed { .. } => {
            tracing::debug!(use_case = %criteria.use_case, "Judge response parsed");
        }
        ParseOutcome::Fallback { reason, .. } => {
            tracing::warn!(
                use_case = %criteria.use_case,
                reason = %reason,
                response = %preview(raw),
                "Malformed judge response, falling back to neutral scores"
            );
        }
    }

    outcome.into_scores()
}

/// Interpret a judge response, keeping track of which fallback applied.
pub fn interpret_response(raw: &str, criteria: &CriteriaSet) -> ParseOutcome {
    let body = strip_fence(raw);

    let parsed: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(e) => return fallback(criteria, format!("invalid JSON: {}", e)),
    };

    let Some(object) = parsed.as_object() else {
        return fallback(criteria, "response is not a JSON object".to_string());
    };

    match extract_scores(object, criteria) {
        Ok((scores, missing)) => ParseOutcome::Parsed { scores, missing },
        Err(reason) => fallback(criteria, reason),
    }
}

/// Trim the response and drop a surrounding fenced block if present.
fn strip_fence(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with(FENCE) {
        return trimmed.to_string();
    }

    let lines: Vec<&str> = trimmed.lines().collect();
    if lines.len() < 2 {
        return String::new();
    }
    lines[1..lines.len() - 1].join("\n")
}

fn extract_scores(
    object: &Map<String, Value>,
    criteria: &CriteriaSet,
) -> Result<(ScoreMap, Vec<String>), String> {
    let mut scores = ScoreMap::new();
    let mut missing = Vec::new();

    for criterion in criteria.iter() {
        let score = match object.get(&criterion.key) {
            Some(entry) => {
                let (score, explanation) = read_entry(&criterion.key, entry)?;
                CriterionScore::new(score, explanation, criterion.weight)
            }
            None => {
                missing.push(criterion.key.clone());
                CriterionScore::new(FALLBACK_SCORE, MISSING_SCORE_EXPLANATION, criterion.weight)
            }
        };
        scores.insert(criterion.key.clone(), score);
    }

    Ok((scores, missing))
}

fn read_entry(key: &str, entry: &Value) -> Result<(f64, String), String> {
    let score = entry
        .get("score")
        .ok_or_else(|| format!("'{}' has no score", key))?;
    let score =
        coerce_score(score).ok_or_else(|| format!("'{}' has unusable score {}", key, score))?;

    let explanation = match entry.get("explanation") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => return Err(format!("'{}' has no explanation", key)),
    };

    Ok((score, explanation))
}

/// Accept JSON numbers and numeric strings; reject anything non-finite.
fn coerce_score(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    score.is_finite().then_some(score)
}

fn fallback(criteria: &CriteriaSet, reason: String) -> ParseOutcome {
    let scores = criteria
        .iter()
        .map(|c| {
            (
                c.key.clone(),
                CriterionScore::new(FALLBACK_SCORE, PARSE_ERROR_EXPLANATION, c.weight),
            )
        })
        .collect();
    ParseOutcome::Fallback { scores, reason }
}

fn preview(raw: &str) -> String {
    raw.chars().take(LOG_PREVIEW_CHARS).collect()
}
