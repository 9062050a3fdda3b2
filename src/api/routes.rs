//! HTTP API route definitions.

use axum::middleware::from_fn_with_state;
use axum::{routing::get, Router};
use tower_http::catch_panic::CatchPanicLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::docs::ApiDoc;
use super::handlers::{health, metrics, ready, root};
use super::middleware::{observe_request, panic_response};
use crate::state::AppState;

/// Path of the generated OpenAPI document.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";
/// Path of the Swagger UI.
pub const DOCS_PATH: &str = "/docs";

/// Create the service router.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(root))
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Metrics endpoint
        .route("/metrics", get(metrics));

    if state.config.docs_enabled {
        router = router.merge(SwaggerUi::new(DOCS_PATH).url(OPENAPI_PATH, ApiDoc::openapi()));
    }

    with_dispatch(router.with_state(state.clone()), state)
}

/// Wrap a router in the error boundary and request observer.
///
/// Panics are converted to the generic 500 inside the observer so they are
/// logged and measured like any other handler error.
pub fn with_dispatch(router: Router, state: AppState) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn_with_state(state, observe_request))
}
