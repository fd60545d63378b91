//! HTTP API layer for Content Judge.
//!
//! Provides REST endpoints for content evaluation, human judgment and
//! history export.

pub mod handlers;
mod routes;
mod types;

pub use routes::build_router;
