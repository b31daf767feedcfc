//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use arthur_providers::ProviderError;
use arthur_tracker::TrackerError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Upstream provider returned {status}: {detail}")]
    UpstreamRejected { status: u16, detail: String },

    #[error("Upstream provider unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("Timed out waiting for job: {0}")]
    WaitExhausted(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::UpstreamRejected { .. } | ApiError::UpstreamUnreachable(_) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::WaitExhausted(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Validation(e) => ApiError::BadRequest(e.to_string()),
            TrackerError::UnsupportedKind(kind) => {
                ApiError::BadRequest(format!("No provider configured for {kind} generation"))
            }
            TrackerError::Remote(ProviderError::Remote { status, body }) => {
                ApiError::UpstreamRejected {
                    status,
                    detail: body,
                }
            }
            TrackerError::Remote(e) => ApiError::UpstreamUnreachable(e.to_string()),
            TrackerError::Timeout { job_id, attempts } => ApiError::WaitExhausted(format!(
                "Job {job_id} not terminal after {attempts} polling attempts"
            )),
            TrackerError::NotFound(msg) => ApiError::NotFound(msg),
            TrackerError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let detail = match &self {
            ApiError::Internal(_) => {
                if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                    "An internal error occurred".to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse { detail };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arthur_models::{JobId, JobKind, ValidationError};

    #[test]
    fn test_tracker_error_mapping() {
        let validation: ApiError = TrackerError::Validation(ValidationError::MissingField {
            kind: JobKind::LipSync,
            field: "audio_url",
        })
        .into();
        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);

        let rejected: ApiError = TrackerError::Remote(ProviderError::Remote {
            status: 422,
            body: "bad".to_string(),
        })
        .into();
        assert_eq!(rejected.status_code(), StatusCode::BAD_GATEWAY);

        let timeout: ApiError = TrackerError::Timeout {
            job_id: JobId::from_string("abc"),
            attempts: 5,
        }
        .into();
        assert_eq!(timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);

        let missing: ApiError = TrackerError::NotFound("abc".to_string()).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }
}
