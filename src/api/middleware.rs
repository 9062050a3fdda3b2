//! Request dispatch wrapper: error boundary, access log and request metrics.

use std::any::Any;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{error, info};

use crate::error::{FailureReport, HandlerError};
use crate::metrics::UNMATCHED_ROUTE;
use crate::state::AppState;

/// Wraps every request.
///
/// Runs after the handler returns: a [`FailureReport`] on the response is
/// logged as an unhandled error, then the request is measured and logged.
pub async fn observe_request(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status();

    if let Some(report) = response.extensions().get::<FailureReport>() {
        error!(
            error = %report.message,
            stack = %report.stack,
            path = %path,
            "Unhandled error"
        );
    }

    let route = if status == StatusCode::NOT_FOUND {
        UNMATCHED_ROUTE
    } else {
        path.as_str()
    };
    state
        .metrics
        .observe_request(method.as_str(), route, status.as_u16(), elapsed);

    info!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        duration_ms = duration_ms(elapsed),
        user_agent = %user_agent,
        "Request completed"
    );

    response
}

/// Whole milliseconds, saturating at `u64::MAX`.
pub fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Converts a caught handler panic into the generic 500 response.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    };
    HandlerError::Panic(message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_ms_rounds_down_and_saturates() {
        assert_eq!(duration_ms(Duration::from_micros(2_999)), 2);
        assert_eq!(duration_ms(Duration::MAX), u64::MAX);
    }

    #[test]
    fn panic_payloads_become_messages() {
        let response = panic_response(Box::new(format!("slot {} taken", 3)));
        let report = response.extensions().get::<FailureReport>().unwrap();
        assert_eq!(report.message, "handler panicked: slot 3 taken");

        let response = panic_response(Box::new(42u8));
        let report = response.extensions().get::<FailureReport>().unwrap();
        assert_eq!(report.stack, "panic: unknown panic payload");
    }
}
