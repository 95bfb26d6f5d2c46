use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Classified failure of a single attempt against the upstream catalog
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// Transport could not complete (DNS, connection refused, timeout)
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    /// Transport completed but upstream answered with a non-success status
    #[error("upstream returned status {status}: {body}")]
    UpstreamError { status: u16, body: String },
}

/// A discovery source that failed during aggregation
#[derive(Debug)]
pub struct SourceFailure {
    pub source: String,
    pub error: AppError,
}

impl std::fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source, self.error)
    }
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Upstream unavailable for {endpoint} after {attempts} attempts: {last}")]
    UpstreamUnavailable {
        endpoint: String,
        attempts: u32,
        last: AttemptError,
    },

    #[error("All {} discovery sources failed: {}", .0.len(), join_failures(.0))]
    AggregationFailed(Vec<SourceFailure>),

    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

fn join_failures(failures: &[SourceFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl AppError {
    /// True when the upstream could not be reached at all
    pub fn is_network_unreachable(&self) -> bool {
        matches!(
            self,
            AppError::UpstreamUnavailable {
                last: AttemptError::NetworkUnreachable(_),
                ..
            }
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::UpstreamUnavailable { .. } | AppError::InvalidResponse(_) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": self.to_string() }),
            ),
            AppError::AggregationFailed(_) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": self.to_string(), "retryable": true }),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": self.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
