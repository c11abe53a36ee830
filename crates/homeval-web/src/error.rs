//! Error responses for the HTTP surface.
//!
//! Every failure leaves the service as a JSON object with an `error` message.
//! Lookup failures also carry a machine-readable `code` and the attempt trail
//! so operators can see which request shapes the provider rejected.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use homeval_core::{AttemptRecord, FailureKind, LookupError};
use serde::Serialize;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attempts: Option<Vec<AttemptRecord>>,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            code: None,
            attempts: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Use POST")
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> Option<&'static str> {
        self.code
    }

    pub fn attempts(&self) -> Option<&[AttemptRecord]> {
        self.attempts.as_deref()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{code}: {}", self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        let code = Some(err.code());
        match err {
            LookupError::Configuration(config) => {
                tracing::error!(code = config.code(), "upstream is not configured: {config}");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: format!("Server misconfigured: {config}"),
                    code,
                    attempts: Some(Vec::new()),
                }
            }
            LookupError::Upstream(failure) => {
                let status = match failure.kind {
                    FailureKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                    FailureKind::UpstreamRejected | FailureKind::TransportUnreachable => {
                        StatusCode::BAD_GATEWAY
                    }
                };
                tracing::warn!(
                    code = failure.kind.code(),
                    attempts = failure.attempts.len(),
                    "valuation lookup failed"
                );
                Self {
                    status,
                    error: failure.kind.message().to_string(),
                    code,
                    attempts: Some(failure.attempts),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}
