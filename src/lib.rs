//! Small HTTP microservice with probes, metrics and JSON logging.
//!
//! The service answers a fixed set of routes:
//!
//! ```text
//! GET /          service name, description, version, timestamp, hostname
//! GET /health    {"status":"healthy","timestamp":...}
//! GET /ready     {"status":"ready","timestamp":...}
//! GET /metrics   Prometheus text exposition
//! ```
//!
//! Every request passes through one dispatch wrapper that turns handler
//! errors and panics into a generic 500, records the request duration
//! histogram and writes one JSON access log line.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`clock`]: Injectable wall clock
//! - [`logging`]: JSON log record formatter and subscriber setup
//! - [`metrics`]: Prometheus metrics registry
//! - [`state`]: Explicit service context
//! - [`api`]: HTTP routes, handlers and dispatch middleware
//! - [`server`]: Binding and the serve loop
//! - [`utils`]: Utility functions

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod state;
pub mod utils;

pub use config::Config;
pub use error::{HandlerError, Result, ServiceError};
pub use state::AppState;
