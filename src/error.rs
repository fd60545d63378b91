//! Error types for Content Judge.
//!
//! Defines a unified error type that maps cleanly to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Unified error type for Content Judge operations.
///
/// A malformed judge response is not represented here: the response parser
/// absorbs it and falls back to neutral scores.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Unknown use case: {0}")]
    UnknownUseCase(String),

    #[error("Judge unavailable: {0}")]
    JudgeUnavailable(String),

    #[error("Evaluation {0} already has a human judgment")]
    AlreadyJudged(Uuid),

    #[error("Invalid human judgment: {0}")]
    InvalidHumanJudgment(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body for API clients.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for EvalError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            EvalError::UnknownUseCase(tag) => (
                StatusCode::BAD_REQUEST,
                "UNKNOWN_USE_CASE",
                format!("Unknown use case '{}'", tag),
                None,
            ),
            EvalError::JudgeUnavailable(msg) => {
                tracing::warn!(error = %msg, "Judge call failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "JUDGE_UNAVAILABLE",
                    "The judge model could not be reached".to_string(),
                    Some(msg.clone()),
                )
            }
            EvalError::AlreadyJudged(_) => (
                StatusCode::CONFLICT,
                "ALREADY_JUDGED",
                self.to_string(),
                None,
            ),
            EvalError::InvalidHumanJudgment(msg) => (
                StatusCode::BAD_REQUEST,
                "INVALID_HUMAN_JUDGMENT",
                msg.clone(),
                None,
            ),
            EvalError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            EvalError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            EvalError::Config(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                "Configuration error".to_string(),
                Some(msg.clone()),
            ),
            EvalError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for evaluation operations.
pub type EvalResult<T> = Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                EvalError::UnknownUseCase("x".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                EvalError::JudgeUnavailable("timeout".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (EvalError::AlreadyJudged(Uuid::nil()), StatusCode::CONFLICT),
            (
                EvalError::NotFound("evaluation".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                EvalError::Internal("lock poisoned".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
