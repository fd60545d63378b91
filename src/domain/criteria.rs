//! Criteria registry domain types.
//!
//! A criteria set is the weighted rubric the judge scores content against.
//! Sets are built once at startup and never change afterwards.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{EvalError, EvalResult};

/// Tolerance used when checking that a set's weights sum to 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Content categories the service knows how to judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UseCase {
    /// Marketing copy written natively in the target language.
    MarketingCopy,
    /// Bilingual product documentation (manuals, packaging, labels).
    BilingualCompliance,
}

impl UseCase {
    /// All registered use cases, in display order.
    pub const ALL: [UseCase; 2] = [UseCase::MarketingCopy, UseCase::BilingualCompliance];

    pub fn as_str(&self) -> &'static str {
        match self {
            UseCase::MarketingCopy => "marketing_copy",
            UseCase::BilingualCompliance => "bilingual_compliance",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            UseCase::MarketingCopy => "Marketing Copy (Multilingual Creation)",
            UseCase::BilingualCompliance => "Bilingual Compliance (Translation Quality)",
        }
    }
}

impl std::fmt::Display for UseCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UseCase {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "marketing_copy" => Ok(UseCase::MarketingCopy),
            "bilingual_compliance" => Ok(UseCase::BilingualCompliance),
            other => Err(EvalError::UnknownUseCase(other.to_string())),
        }
    }
}

/// One weighted quality dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CriterionDefinition {
    /// Stable identifier; the judge must answer with exactly this key.
    pub key: String,
    /// Name shown to reviewers and in the judge prompt.
    pub display_name: String,
    pub description: String,
    /// Share of the overall score, in (0, 1].
    pub weight: f64,
}

impl CriterionDefinition {
    pub fn new(key: &str, display_name: &str, description: &str, weight: f64) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            weight,
        }
    }

    /// Weight as a whole percentage, e.g. 0.15 -> 15.
    pub fn weight_percent(&self) -> u32 {
        (self.weight * 100.0).round() as u32
    }
}

/// The complete, ordered rubric for one use case.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CriteriaSet {
    pub use_case: UseCase,
    criteria: Vec<CriterionDefinition>,
}

impl CriteriaSet {
    /// Build a set, validating keys and weights.
    pub fn new(use_case: UseCase, criteria: Vec<CriterionDefinition>) -> EvalResult<Self> {
        if criteria.is_empty() {
            return Err(EvalError::Config(format!(
                "criteria set '{}' has no criteria",
                use_case
            )));
        }

        for (idx, criterion) in criteria.iter().enumerate() {
            if criteria[..idx].iter().any(|c| c.key == criterion.key) {
                return Err(EvalError::Config(format!(
                    "criteria set '{}' defines '{}' more than once",
                    use_case, criterion.key
                )));
            }
            if !(criterion.weight > 0.0 && criterion.weight <= 1.0) {
                return Err(EvalError::Config(format!(
                    "criterion '{}' in '{}' has weight {} outside (0, 1]",
                    criterion.key, use_case, criterion.weight
                )));
            }
        }

        let total: f64 = criteria.iter().map(|c| c.weight).sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(EvalError::Config(format!(
                "weights of criteria set '{}' sum to {:.6}, expected 1.0",
                use_case, total
            )));
        }

        Ok(Self { use_case, criteria })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CriterionDefinition> {
        self.criteria.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.criteria.iter().map(|c| c.key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&CriterionDefinition> {
        self.criteria.iter().find(|c| c.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.criteria.iter().map(|c| c.weight).sum()
    }

    fn marketing_copy() -> EvalResult<Self> {
        Self::new(
            UseCase::MarketingCopy,
            vec![
                CriterionDefinition::new(
                    "cultural_appropriateness",
                    "Cultural Appropriateness",
                    "Idioms, cultural references, and tone appropriate for target culture",
                    0.30,
                ),
                CriterionDefinition::new(
                    "persuasiveness",
                    "Persuasiveness",
                    "Likely to drive action and conversion",
                    0.25,
                ),
                CriterionDefinition::new(
                    "brand_voice",
                    "Brand Voice Consistency",
                    "Matches the brand voice in the target language",
                    0.20,
                ),
                CriterionDefinition::new(
                    "grammar_fluency",
                    "Grammar & Fluency",
                    "Natural, error-free language",
                    0.15,
                ),
                CriterionDefinition::new(
                    "semantic_accuracy",
                    "Semantic Accuracy",
                    "Conveys the intended message accurately",
                    0.10,
                ),
            ],
        )
    }

    fn bilingual_compliance() -> EvalResult<Self> {
        Self::new(
            UseCase::BilingualCompliance,
            vec![
                CriterionDefinition::new(
                    "completeness",
                    "Completeness",
                    "Both languages present, all content translated",
                    0.25,
                ),
                CriterionDefinition::new(
                    "accuracy",
                    "Translation Accuracy",
                    "Meaning preserved, no mistranslations",
                    0.25,
                ),
                CriterionDefinition::new(
                    "fluency",
                    "Fluency",
                    "Natural and readable in target language",
                    0.20,
                ),
                CriterionDefinition::new(
                    "terminology",
                    "Terminology Consistency",
                    "Technical/product terms used correctly",
                    0.15,
                ),
                CriterionDefinition::new(
                    "regulatory_compliance",
                    "Regulatory Compliance",
                    "Safety warnings and legal text properly translated",
                    0.15,
                ),
            ],
        )
    }
}

/// Process-wide registry of criteria sets, one per [`UseCase`].
#[derive(Debug, Clone)]
pub struct CriteriaRegistry {
    marketing_copy: CriteriaSet,
    bilingual_compliance: CriteriaSet,
}

impl CriteriaRegistry {
    /// Registry holding the built-in rubrics.
    pub fn builtin() -> EvalResult<Self> {
        Ok(Self {
            marketing_copy: CriteriaSet::marketing_copy()?,
            bilingual_compliance: CriteriaSet::bilingual_compliance()?,
        })
    }

    pub fn get(&self, use_case: UseCase) -> &CriteriaSet {
        match use_case {
            UseCase::MarketingCopy => &self.marketing_copy,
            UseCase::BilingualCompliance => &self.bilingual_compliance,
        }
    }

    /// Resolve a raw use-case tag to its criteria set.
    pub fn get_criteria_set(&self, tag: &str) -> EvalResult<&CriteriaSet> {
        let use_case: UseCase = tag.parse()?;
        Ok(self.get(use_case))
    }

    pub fn sets(&self) -> impl Iterator<Item = &CriteriaSet> {
        UseCase::ALL.into_iter().map(move |u| self.get(u))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_weights_sum_to_one() {
        let registry = CriteriaRegistry::builtin().unwrap();
        for set in registry.sets() {
            assert!(
                (set.total_weight() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE,
                "{} sums to {}",
                set.use_case,
                set.total_weight()
            );
            assert_eq!(set.len(), 5);
        }
    }

    #[test]
    fn test_marketing_copy_order_and_weights() {
        let registry = CriteriaRegistry::builtin().unwrap();
        let set = registry.get(UseCase::MarketingCopy);
        let keys: Vec<&str> = set.keys().collect();
        assert_eq!(
            keys,
            vec![
                "cultural_appropriateness",
                "persuasiveness",
                "brand_voice",
                "grammar_fluency",
                "semantic_accuracy"
            ]
        );
        assert_eq!(set.get("cultural_appropriateness").unwrap().weight, 0.30);
        assert_eq!(set.get("semantic_accuracy").unwrap().weight, 0.10);
    }

    #[test]
    fn test_bilingual_compliance_keys() {
        let registry = CriteriaRegistry::builtin().unwrap();
        let set = registry.get_criteria_set("bilingual_compliance").unwrap();
        assert_eq!(set.use_case, UseCase::BilingualCompliance);
        assert!(set.contains("regulatory_compliance"));
        assert_eq!(set.get("terminology").unwrap().weight_percent(), 15);
    }

    #[test]
    fn test_unknown_use_case() {
        let registry = CriteriaRegistry::builtin().unwrap();
        let err = registry.get_criteria_set("unsupported_tag").unwrap_err();
        assert!(matches!(err, EvalError::UnknownUseCase(tag) if tag == "unsupported_tag"));
    }

    #[test]
    fn test_use_case_round_trip() {
        for use_case in UseCase::ALL {
            assert_eq!(use_case.as_str().parse::<UseCase>().unwrap(), use_case);
            let json = serde_json::to_string(&use_case).unwrap();
            assert_eq!(json, format!("\"{}\"", use_case));
        }
    }

    #[test]
    fn test_rejects_bad_weight_sum() {
        let result = CriteriaSet::new(
            UseCase::MarketingCopy,
            vec![
                CriterionDefinition::new("a", "A", "first", 0.5),
                CriterionDefinition::new("b", "B", "second", 0.4),
            ],
        );
        assert!(matches!(result, Err(EvalError::Config(_))));
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let result = CriteriaSet::new(
            UseCase::MarketingCopy,
            vec![
                CriterionDefinition::new("a", "A", "first", 0.5),
                CriterionDefinition::new("a", "A again", "second", 0.5),
            ],
        );
        assert!(matches!(result, Err(EvalError::Config(msg)) if msg.contains("more than once")));
    }

    #[test]
    fn test_rejects_out_of_range_weight_and_empty_set() {
        let zero = CriteriaSet::new(
            UseCase::MarketingCopy,
            vec![
                CriterionDefinition::new("a", "A", "first", 0.0),
                CriterionDefinition::new("b", "B", "second", 1.0),
            ],
        );
        assert!(zero.is_err());
        assert!(CriteriaSet::new(UseCase::MarketingCopy, Vec::new()).is_err());
    }
}
