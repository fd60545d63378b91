//! Content Judge - LLM-as-judge quality gate for multilingual content
//!
//! This service scores marketing copy and bilingual product documentation
//! against weighted rubrics, triages the result, and records human
//! judgments for comparison.

use std::sync::Arc;

use tokio::net::TcpListener;

mod api;
mod config;
mod domain;
mod engine;
mod error;
mod logging;
mod storage;

use crate::api::build_router;
use crate::config::Config;
use crate::domain::{CriteriaRegistry, DecisionPolicy};
use crate::engine::{Evaluator, SyncAnthropicJudge};
use crate::storage::EvaluationHistory;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The evaluator.
    pub evaluator: Arc<Evaluator>,
    /// In-process evaluation history.
    pub history: EvaluationHistory,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: No .env file loaded ({e})");
    }

    logging::init();

    tracing::info!("Starting Content Judge v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        model = %config.judge.model,
        auto_pass_threshold = config.triage.auto_pass_threshold,
        auto_fail_threshold = config.triage.auto_fail_threshold,
        "Configuration loaded"
    );

    let registry = Arc::new(CriteriaRegistry::builtin()?);
    let policy = DecisionPolicy::new(
        config.triage.auto_pass_threshold,
        config.triage.auto_fail_threshold,
    )?;

    // Without a key every evaluation would fail, so refuse to start.
    let judge = SyncAnthropicJudge::new(config.judge.clone()).map_err(|e| {
        tracing::error!(error = %e, "Failed to build judge client");
        anyhow::anyhow!("{}", e)
    })?;

    let evaluator = Arc::new(Evaluator::new(registry, policy, Box::new(judge)));

    let state = AppState {
        evaluator,
        history: EvaluationHistory::new(),
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(address = %addr, "Server listening");
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
