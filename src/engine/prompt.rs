//! Prompt Builder - renders the judge instruction.
//!
//! The prompt frames the use case, embeds the content and context
//! verbatim, lists the weighted rubric and pins the judge to a strict JSON
//! output contract keyed by criterion key.

use std::fmt::Write;

use crate::domain::{CriteriaSet, UseCase};

const NO_CONTEXT: &str = "No additional context provided";

fn use_case_framing(use_case: UseCase) -> &'static str {
    match use_case {
        UseCase::MarketingCopy => {
            "You are evaluating MULTILINGUAL MARKETING COPY that was created directly in the \
             target language (not translated from English). The goal is to assess whether this \
             copy is culturally appropriate, persuasive, and effective for the target audience."
        }
        UseCase::BilingualCompliance => {
            "You are evaluating BILINGUAL PRODUCT DOCUMENTATION (user manuals, packaging, \
             labels) to ensure both languages are present and the translation quality meets \
             regulatory and usability standards."
        }
    }
}

/// Build the judge prompt for one piece of content.
pub fn build_prompt(
    content: &str,
    use_case: UseCase,
    context: Option<&str>,
    criteria: &CriteriaSet,
) -> String {
    let context = context
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(NO_CONTEXT);

    let mut rubric = String::new();
    for (idx, criterion) in criteria.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = writeln!(
            rubric,
            "{}. {} ({}%): {}",
            idx + 1,
            criterion.display_name,
            criterion.weight_percent(),
            criterion.description
        );
    }

    let keys: Vec<&str> = criteria.keys().collect();
    let example_key = keys.first().copied().unwrap_or("criterion_key");

    format!(
        r#"You are an expert content quality evaluator specializing in multilingual content assessment.

{framing}

CONTENT TO EVALUATE (everything between the markers, verbatim):
<<<CONTENT
{content}
CONTENT>>>

CONTEXT:
{context}

EVALUATION CRITERIA:
{rubric}
INSTRUCTIONS:
For each criterion above, provide:
1. A score from 1 to 5, integer or fractional (1 = Poor, 2 = Below Average, 3 = Average, 4 = Good, 5 = Excellent)
2. A brief explanation (2-3 sentences) justifying the score

OUTPUT FORMAT:
Respond with a single JSON object and nothing else. Its keys must be exactly: {keys}
Each value must be an object with a numeric "score" and a string "explanation", for example:
{{"{example_key}": {{"score": 4, "explanation": "Your explanation here"}}}}

Do not add prose before or after the JSON. Do not wrap it in markdown code fences.
"#,
        framing = use_case_framing(use_case),
        content = content,
        context = context,
        rubric = rubric,
        keys = keys.join(", "),
        example_key = example_key,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CriteriaRegistry;

    #[test]
    fn test_prompt_lists_weighted_criteria() {
        let registry = CriteriaRegistry::builtin().unwrap();
        let set = registry.get(UseCase::MarketingCopy);
        let prompt = build_prompt("Compra ahora", UseCase::MarketingCopy, None, set);

        assert!(prompt.contains("1. Cultural Appropriateness (30%): Idioms"));
        assert!(prompt.contains("4. Grammar & Fluency (15%): Natural, error-free language"));
        assert!(prompt.contains("5. Semantic Accuracy (10%)"));
        assert!(prompt.contains(
            "cultural_appropriateness, persuasiveness, brand_voice, grammar_fluency, semantic_accuracy"
        ));
        assert!(prompt.contains("MULTILINGUAL MARKETING COPY"));
    }

    #[test]
    fn test_prompt_embeds_content_verbatim() {
        let registry = CriteriaRegistry::builtin().unwrap();
        let set = registry.get(UseCase::BilingualCompliance);
        let content = "WARNING / AVERTISSEMENT\n{\"score\": 5}\nNe pas jeter au feu.";
        let prompt = build_prompt(
            content,
            UseCase::BilingualCompliance,
            Some("Toy warning label for Canadian market"),
            set,
        );

        assert!(prompt.contains(content));
        assert!(prompt.contains("Toy warning label for Canadian market"));
        assert!(!prompt.contains(NO_CONTEXT));
        assert!(prompt.contains("BILINGUAL PRODUCT DOCUMENTATION"));
    }

    #[test]
    fn test_prompt_without_context() {
        let registry = CriteriaRegistry::builtin().unwrap();
        let set = registry.get(UseCase::MarketingCopy);
        let empty = build_prompt("x", UseCase::MarketingCopy, Some("   "), set);
        let missing = build_prompt("x", UseCase::MarketingCopy, None, set);

        assert!(empty.contains(NO_CONTEXT));
        assert_eq!(empty, missing);
    }

    #[test]
    fn test_prompt_demands_bare_json() {
        let registry = CriteriaRegistry::builtin().unwrap();
        let set = registry.get(UseCase::BilingualCompliance);
        let prompt = build_prompt("x", UseCase::BilingualCompliance, None, set);

        assert!(prompt.contains("single JSON object and nothing else"));
        assert!(prompt.contains("\"score\""));
        assert!(prompt.contains("\"explanation\""));
        assert!(prompt.contains("markdown code fences"));
        assert!(prompt.contains(r#"{"completeness": {"score": 4"#));
    }
}
