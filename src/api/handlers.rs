//! HTTP request handlers.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::api::types::*;
use crate::domain::{Decision, EvaluationRecord, HistorySummary, UseCase};
use crate::error::{EvalError, EvalResult};
use crate::storage::HistoryFilter;
use crate::AppState;

/// Evaluate content with the judge model.
///
/// POST /v1/evaluations
#[utoipa::path(
    post,
    path = "/v1/evaluations",
    request_body = EvaluateRequest,
    responses(
        (status = 200, description = "Evaluation complete", body = EvaluationRecord),
        (status = 400, description = "Unknown use case"),
        (status = 502, description = "Judge model unavailable")
    ),
    tag = "evaluations"
)]
pub async fn create_evaluation(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> EvalResult<Json<EvaluationRecord>> {
    tracing::info!(
        use_case = %request.use_case,
        content_len = request.content.len(),
        has_context = request.context.is_some(),
        "Evaluating content"
    );

    let evaluation = state.evaluator.evaluate(
        &request.content,
        &request.use_case,
        request.context.as_deref(),
    )?;

    state.history.insert(evaluation.clone())?;

    Ok(Json(evaluation.into()))
}

/// List evaluations, newest first.
///
/// GET /v1/evaluations
#[utoipa::path(
    get,
    path = "/v1/evaluations",
    params(ListEvaluationsQuery),
    responses(
        (status = 200, description = "List of evaluations", body = ListEvaluationsResponse),
        (status = 400, description = "Invalid filter")
    ),
    tag = "evaluations"
)]
pub async fn list_evaluations(
    State(state): State<AppState>,
    Query(query): Query<ListEvaluationsQuery>,
) -> EvalResult<Json<ListEvaluationsResponse>> {
    let use_case = query
        .use_case
        .as_deref()
        .map(str::parse::<UseCase>)
        .transpose()?;
    let ai_decision = query
        .decision
        .as_deref()
        .map(|d| d.parse::<Decision>().map_err(EvalError::BadRequest))
        .transpose()?;

    let limit = query.limit.clamp(1, 100);
    let offset = query.offset;

    let (evaluations, total) = state.history.list(
        HistoryFilter {
            use_case,
            ai_decision,
        },
        limit,
        offset,
    )?;

    Ok(Json(ListEvaluationsResponse {
        evaluations: evaluations.into_iter().map(Into::into).collect(),
        total,
        limit,
        offset,
    }))
}

/// Get a single evaluation.
///
/// GET /v1/evaluations/{id}
#[utoipa::path(
    get,
    path = "/v1/evaluations/{id}",
    params(
        ("id" = Uuid, Path, description = "Evaluation ID")
    ),
    responses(
        (status = 200, description = "Evaluation", body = EvaluationRecord),
        (status = 404, description = "Evaluation not found")
    ),
    tag = "evaluations"
)]
pub async fn get_evaluation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> EvalResult<Json<EvaluationRecord>> {
    let evaluation = state.history.get(id)?;
    Ok(Json(evaluation.into()))
}

/// Attach the human judgment to an evaluation.
///
/// POST /v1/evaluations/{id}/human-judgment
#[utoipa::path(
    post,
    path = "/v1/evaluations/{id}/human-judgment",
    params(
        ("id" = Uuid, Path, description = "Evaluation ID")
    ),
    request_body = HumanJudgmentRequest,
    responses(
        (status = 200, description = "Judgment recorded", body = HumanJudgmentResponse),
        (status = 400, description = "Scores do not match the rubric"),
        (status = 404, description = "Evaluation not found"),
        (status = 409, description = "Evaluation already judged")
    ),
    tag = "evaluations"
)]
pub async fn submit_human_judgment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<HumanJudgmentRequest>,
) -> EvalResult<Json<HumanJudgmentResponse>> {
    let HumanJudgmentRequest { scores, feedback } = request;

    let evaluation = state.history.update(id, |evaluation| {
        state
            .evaluator
            .attach_human_judgment(evaluation, &scores, feedback)
    })?;

    let agreement = evaluation.agreement().ok_or_else(|| {
        EvalError::Internal(format!("evaluation {} has no human judgment after update", id))
    })?;

    tracing::info!(
        evaluation_id = %id,
        delta = agreement.delta,
        level = %agreement.level,
        decisions_match = agreement.decisions_match,
        "Agreement computed"
    );

    Ok(Json(HumanJudgmentResponse {
        evaluation: evaluation.into(),
        agreement,
    }))
}

/// Download the full history as a JSON array.
///
/// GET /v1/evaluations/export
#[utoipa::path(
    get,
    path = "/v1/evaluations/export",
    responses(
        (status = 200, description = "All evaluations, oldest first", body = [EvaluationRecord])
    ),
    tag = "evaluations"
)]
pub async fn export_evaluations(State(state): State<AppState>) -> EvalResult<impl IntoResponse> {
    let records: Vec<EvaluationRecord> = state.history.all()?.into_iter().map(Into::into).collect();
    let filename = format!("evaluations_{}.json", Utc::now().format("%Y%m%d_%H%M%S"));

    tracing::info!(count = records.len(), filename = %filename, "Exporting evaluations");

    Ok((
        [(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )],
        Json(records),
    ))
}

/// Aggregate statistics over the history.
///
/// GET /v1/evaluations/summary
#[utoipa::path(
    get,
    path = "/v1/evaluations/summary",
    responses(
        (status = 200, description = "History summary", body = HistorySummary)
    ),
    tag = "evaluations"
)]
pub async fn evaluation_summary(State(state): State<AppState>) -> EvalResult<Json<HistorySummary>> {
    Ok(Json(state.history.summary()?))
}

/// Rubric for a use case.
///
/// GET /v1/criteria/{use_case}
#[utoipa::path(
    get,
    path = "/v1/criteria/{use_case}",
    params(
        ("use_case" = String, Path, description = "marketing_copy or bilingual_compliance")
    ),
    responses(
        (status = 200, description = "Criteria for the use case", body = CriteriaResponse),
        (status = 400, description = "Unknown use case")
    ),
    tag = "criteria"
)]
pub async fn get_criteria(
    State(state): State<AppState>,
    Path(use_case): Path<String>,
) -> EvalResult<Json<CriteriaResponse>> {
    let criteria = state.evaluator.registry().get_criteria_set(&use_case)?;
    Ok(Json(criteria.into()))
}

/// Health check endpoint.
///
/// GET /v1/health
#[utoipa::path(
    get,
    path = "/v1/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        judge_model: state.evaluator.judge_model().to_string(),
        evaluations: state.history.len(),
        timestamp: Utc::now(),
    })
}
