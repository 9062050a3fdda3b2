//! Prometheus metrics registry for request and process monitoring.
//!
//! The registry is an explicit object owned by [`crate::state::AppState`]
//! rather than a process-global recorder, so each test can build its own
//! and read back exactly what it recorded.
//!
//! This module provides:
//! - HTTP request duration histogram and request counter
//! - Process start time and uptime gauges
//! - Text exposition rendering for `/metrics`

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};
use tracing::debug;

// === Metric Name Constants ===

/// HTTP request duration histogram metric name.
pub const METRIC_HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";
/// HTTP requests counter metric name.
pub const METRIC_HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
/// Process start time gauge metric name.
pub const METRIC_PROCESS_START_TIME: &str = "process_start_time_seconds";
/// Process uptime gauge metric name.
pub const METRIC_PROCESS_UPTIME: &str = "process_uptime_seconds";

/// Content type of the Prometheus text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Route label used for requests that matched no route.
pub const UNMATCHED_ROUTE: &str = "unmatched";

const HTTP_DURATION_BUCKETS: &[f64] = &[0.1, 0.5, 1.0, 2.0, 5.0];

const HTTP_REQUEST_DURATION_HELP: &str = "Duration of HTTP requests in seconds";
const HTTP_REQUESTS_TOTAL_HELP: &str = "Total HTTP requests";

/// Request metrics declared on every scrape, observed or not.
const DECLARED: &[(&str, &str, &str)] = &[
    (METRIC_HTTP_REQUEST_DURATION, "histogram", HTTP_REQUEST_DURATION_HELP),
    (METRIC_HTTP_REQUESTS_TOTAL, "counter", HTTP_REQUESTS_TOTAL_HELP),
];

/// Metrics registry shared by every request handler.
#[derive(Clone)]
pub struct MetricsRegistry {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
    started: Instant,
}

impl std::fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRegistry")
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl MetricsRegistry {
    /// Build a registry and register all metric descriptions.
    pub fn new() -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(METRIC_HTTP_REQUEST_DURATION.to_string()),
                HTTP_DURATION_BUCKETS,
            )?
            .build_recorder();
        let handle = recorder.handle();

        let registry = Self {
            recorder: Arc::new(recorder),
            handle,
            started: Instant::now(),
        };
        registry.describe();
        registry.record_start_time();

        debug!("Metrics registry initialized");
        Ok(registry)
    }

    fn describe(&self) {
        self.scoped(|| {
            describe_histogram!(
                METRIC_HTTP_REQUEST_DURATION,
                Unit::Seconds,
                HTTP_REQUEST_DURATION_HELP
            );
            describe_counter!(METRIC_HTTP_REQUESTS_TOTAL, HTTP_REQUESTS_TOTAL_HELP);
            describe_gauge!(
                METRIC_PROCESS_START_TIME,
                Unit::Seconds,
                "Start time of the process since unix epoch in seconds"
            );
            describe_gauge!(
                METRIC_PROCESS_UPTIME,
                Unit::Seconds,
                "Seconds since the process started"
            );
        });
    }

    fn record_start_time(&self) {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();
        self.scoped(|| gauge!(METRIC_PROCESS_START_TIME).set(since_epoch));
    }

    /// Run `f` with this registry as the active recorder.
    fn scoped<T>(&self, f: impl FnOnce() -> T) -> T {
        metrics::with_local_recorder(&*self.recorder, f)
    }

    /// Record one completed HTTP request.
    pub fn observe_request(&self, method: &str, route: &str, status_code: u16, elapsed: Duration) {
        let method = method.to_string();
        let route = route.to_string();
        let status_code = status_code.to_string();

        self.scoped(|| {
            counter!(
                METRIC_HTTP_REQUESTS_TOTAL,
                "method" => method.clone(),
                "route" => route.clone(),
                "status_code" => status_code.clone()
            )
            .increment(1);
            histogram!(
                METRIC_HTTP_REQUEST_DURATION,
                "method" => method,
                "route" => route,
                "status_code" => status_code
            )
            .record(elapsed.as_secs_f64());
        });
    }

    /// Render the registry in the Prometheus text exposition format.
    ///
    /// The exporter skips series with no samples, so the request metrics
    /// get their `# HELP`/`# TYPE` header appended until first observed.
    pub fn render(&self) -> String {
        let uptime = self.started.elapsed().as_secs_f64();
        self.scoped(|| gauge!(METRIC_PROCESS_UPTIME).set(uptime));

        let mut rendered = self.handle.render();
        for (name, kind, help) in DECLARED {
            if rendered.contains(&format!("# TYPE {name} ")) {
                continue;
            }
            if !rendered.is_empty() && !rendered.ends_with('\n') {
                rendered.push('\n');
            }
            rendered.push_str(&format!("# HELP {name} {help}\n# TYPE {name} {kind}\n"));
        }
        rendered
    }

    /// Drain buffered histogram samples into their buckets.
    pub fn run_upkeep(&self) {
        self.handle.run_upkeep();
    }
}
