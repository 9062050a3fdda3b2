//! HTTP API handlers.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::metrics::EXPOSITION_CONTENT_TYPE;
use crate::state::AppState;

/// Service information returned by the root route.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// Configured service name.
    pub service: String,
    /// Configured description.
    pub description: String,
    /// Configured version.
    pub version: String,
    /// Response time, ISO-8601 UTC.
    pub timestamp: String,
    /// Host serving the request.
    pub hostname: String,
}

/// Liveness and readiness probe response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProbeResponse {
    /// "healthy" or "ready".
    pub status: String,
    /// Response time, ISO-8601 UTC.
    pub timestamp: String,
}

/// Root handler - describes the running service.
#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses((status = 200, description = "Service information", body = ServiceInfo))
)]
pub async fn root(State(state): State<AppState>) -> Json<ServiceInfo> {
    info!("Root endpoint accessed");

    Json(ServiceInfo {
        service: state.config.app_name.clone(),
        description: state.config.app_description.clone(),
        version: state.config.app_version.clone(),
        timestamp: state.timestamp(),
        hostname: state.hostname.to_string(),
    })
}

/// Health check handler - always returns 200.
#[utoipa::path(
    get,
    path = "/health",
    tag = "probes",
    responses((status = 200, description = "Process is alive", body = ProbeResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<ProbeResponse> {
    Json(ProbeResponse {
        status: "healthy".to_string(),
        timestamp: state.timestamp(),
    })
}

/// Readiness check handler - always returns 200.
///
/// No dependencies are checked yet; this is where they would go.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "probes",
    responses((status = 200, description = "Ready to receive traffic", body = ProbeResponse))
)]
pub async fn ready(State(state): State<AppState>) -> Json<ProbeResponse> {
    Json(ProbeResponse {
        status: "ready".to_string(),
        timestamp: state.timestamp(),
    })
}

/// Metrics handler - Prometheus text exposition.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "probes",
    responses((status = 200, description = "Prometheus text exposition", body = String, content_type = "text/plain"))
)]
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        state.metrics.render(),
    )
}
