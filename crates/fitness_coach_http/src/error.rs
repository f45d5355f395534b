//! HTTP-facing error type.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fitness_coach::profile::ValidationErrors;
use fitness_coach::profile_store::ProfileStoreError;
use fitness_coach::{CoachError, ErrorBody};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Coach(#[from] CoachError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("profile store: {0}")]
    Store(#[from] ProfileStoreError),

    #[error("Not found: {0}")]
    NotFound(&'static str),

    #[error("Invalid request body: {0}")]
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Coach(err) => {
                let status = StatusCode::from_u16(err.status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    tracing::error!(error = %err, kind = err.kind(), "coach request failed");
                } else {
                    tracing::warn!(error = %err, kind = err.kind(), "coach request failed");
                }
                (status, Json(err.to_body())).into_response()
            }
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errors": errors })),
            )
                .into_response(),
            ApiError::Store(ProfileStoreError::InvalidPatch(err)) => {
                let body = ErrorBody {
                    error: "Invalid request body".into(),
                    details: Some(err.to_string()),
                    status: None,
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::Store(err) => {
                tracing::error!(error = %err, "profile store failure");
                let body = ErrorBody {
                    error: "Internal server error".into(),
                    details: Some(err.to_string()),
                    status: None,
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            ApiError::NotFound(what) => {
                let body = ErrorBody {
                    error: format!("{what} not found"),
                    details: None,
                    status: None,
                };
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
            ApiError::BadRequest(details) => {
                let body = ErrorBody {
                    error: "Invalid request body".into(),
                    details: Some(details),
                    status: None,
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
        }
    }
}
