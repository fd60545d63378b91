//! Storage layer for Content Judge.
//!
//! Evaluations are kept in process memory only; durable storage belongs to
//! whoever embeds the evaluator.

mod history;

pub use history::{EvaluationHistory, HistoryFilter};
