//! OpenAPI document for the service routes.

use utoipa::OpenApi;

use super::handlers::{self, ProbeResponse, ServiceInfo};
use crate::error::ErrorResponse;

/// Generated OpenAPI description served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::root, handlers::health, handlers::ready, handlers::metrics),
    components(schemas(ServiceInfo, ProbeResponse, ErrorResponse)),
    tags(
        (name = "service", description = "Service information"),
        (name = "probes", description = "Liveness, readiness and metrics")
    )
)]
pub struct ApiDoc;
