//! Evaluation engine for Content Judge.
//!
//! This module contains the judging pipeline:
//! - Prompt Builder: renders the rubric and content into a judge prompt
//! - Judge Client: sends the prompt to the hosted model
//! - Response Parser: validates the judge output with fallbacks
//! - Score Aggregator: weighted overall score
//! - Evaluator: orchestrates all steps

mod aggregator;
mod evaluator;
pub mod judge;
mod parser;
mod prompt;

pub use aggregator::*;
pub use evaluator::*;
pub use judge::{JudgeClient, SyncAnthropicJudge};
pub use parser::*;
pub use prompt::*;
