//! Unified error types for the service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Process-level errors surfaced during startup and serving.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Metrics registry could not be built.
    #[error("metrics registry error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    /// IO error (bind, accept, serve).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure raised while handling a single request.
///
/// Every variant is reported to the caller as the same generic 500 body;
/// the detail only reaches the error log.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Handler returned an error.
    #[error("{0}")]
    Internal(#[from] anyhow::Error),

    /// Handler panicked.
    #[error("handler panicked: {0}")]
    Panic(String),
}

/// Failure details attached to a 500 response for the dispatch middleware.
#[derive(Debug, Clone)]
pub struct FailureReport {
    /// Error message.
    pub message: String,
    /// Cause chain or panic payload.
    pub stack: String,
}

/// Body returned for every unhandled request error.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Always "Internal server error".
    pub error: String,
}

impl HandlerError {
    /// Message plus cause chain, the closest thing to a stack we keep.
    pub fn report(&self) -> FailureReport {
        let stack = match self {
            Self::Internal(err) => format!("{err:?}"),
            Self::Panic(payload) => format!("panic: {payload}"),
        };
        FailureReport {
            message: self.to_string(),
            stack,
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let report = self.report();
        let mut response = (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }),
        )
            .into_response();
        response.extensions_mut().insert(report);
        response
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServiceError>;
