//! Domain types for Content Judge.
//!
//! This module contains the rubric definitions, triage decisions and the
//! evaluation record.

mod criteria;
mod decision;
mod evaluation;
mod metrics;

pub use criteria::*;
pub use decision::*;
pub use evaluation::*;
pub use metrics::*;
