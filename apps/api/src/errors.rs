use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generation::error::{GenerationError, GenerationErrorKind};
use crate::render::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Generation(e) => generation_error_parts(e),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::S3(msg) => {
                tracing::error!("S3 error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "S3_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "The card document could not be rendered".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        let mut response = (status, body).into_response();
        if let AppError::Generation(e) = &self {
            if e.is_retryable() {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECS));
            }
        }
        response
    }
}

/// Seconds a client should wait before retrying a retryable generation failure.
const RETRY_AFTER_SECS: &str = "5";

fn generation_error_parts(err: &GenerationError) -> (StatusCode, &'static str, String) {
    match err.kind() {
        GenerationErrorKind::InvalidRequest => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
        }
        GenerationErrorKind::UpstreamUnavailable => {
            tracing::warn!("Upstream generator unavailable: {err}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "UPSTREAM_UNAVAILABLE",
                "The word generator is unavailable, please retry shortly".to_string(),
            )
        }
        GenerationErrorKind::NoValidPairs => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "NO_VALID_PAIRS",
            err.to_string(),
        ),
        GenerationErrorKind::InsufficientPairs => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "INSUFFICIENT_PAIRS",
            err.to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;

    #[test]
    fn test_generation_errors_map_to_distinct_statuses() {
        let cases = [
            (
                GenerationError::InvalidRequest("count must be positive".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                GenerationError::UpstreamUnavailable(LlmError::Api {
                    status: 503,
                    message: "overloaded".into(),
                }),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (GenerationError::NoValidPairs, StatusCode::UNPROCESSABLE_ENTITY),
            (
                GenerationError::InsufficientPairs {
                    requested: 10,
                    produced: 3,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];

        for (err, expected) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_only_retryable_failures_carry_retry_after() {
        let upstream = AppError::from(GenerationError::UpstreamUnavailable(LlmError::Api {
            status: 500,
            message: "boom".into(),
        }))
        .into_response();
        assert_eq!(upstream.headers()[header::RETRY_AFTER], RETRY_AFTER_SECS);

        let no_pairs = AppError::from(GenerationError::NoValidPairs).into_response();
        assert!(no_pairs.headers().get(header::RETRY_AFTER).is_none());
    }

    #[test]
    fn test_not_found_status() {
        let response = AppError::NotFound("deck".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
