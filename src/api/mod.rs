//! HTTP API module for service info, health, readiness and metrics endpoints.

pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use routes::{create_router, with_dispatch};
