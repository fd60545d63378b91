//! Route definitions for the API.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers;
use crate::AppState;

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_evaluation,
        handlers::list_evaluations,
        handlers::get_evaluation,
        handlers::submit_human_judgment,
        handlers::export_evaluations,
        handlers::evaluation_summary,
        handlers::get_criteria,
        handlers::health_check,
    ),
    components(schemas(
        crate::api::types::EvaluateRequest,
        crate::api::types::ListEvaluationsResponse,
        crate::api::types::HumanJudgmentRequest,
        crate::api::types::HumanJudgmentResponse,
        crate::api::types::CriteriaResponse,
        crate::api::types::CriterionInfo,
        crate::api::types::HealthResponse,
        crate::domain::EvaluationRecord,
        crate::domain::CriterionScore,
        crate::domain::UseCase,
        crate::domain::Decision,
        crate::domain::Agreement,
        crate::domain::AgreementLevel,
        crate::domain::HistorySummary,
        crate::domain::DecisionCounts,
    )),
    tags(
        (name = "evaluations", description = "Content evaluation and human judgment"),
        (name = "criteria", description = "Rubric catalogue"),
        (name = "health", description = "Health and status endpoints")
    ),
    info(
        title = "Content Judge API",
        version = "0.1.0",
        description = "LLM-as-judge quality gate for multilingual marketing and compliance content",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Evaluations
        .route(
            "/v1/evaluations",
            post(handlers::create_evaluation).get(handlers::list_evaluations),
        )
        .route("/v1/evaluations/export", get(handlers::export_evaluations))
        .route("/v1/evaluations/summary", get(handlers::evaluation_summary))
        .route("/v1/evaluations/:id", get(handlers::get_evaluation))
        .route(
            "/v1/evaluations/:id/human-judgment",
            post(handlers::submit_human_judgment),
        )
        // Criteria
        .route("/v1/criteria/:use_case", get(handlers::get_criteria))
        // Health
        .route("/v1/health", get(handlers::health_check))
        .with_state(state)
        // OpenAPI docs
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
