//! Shared helpers for the HTTP service integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use probe_service::clock::FixedClock;
use probe_service::logging::{self, JsonLogFormat};
use probe_service::metrics::MetricsRegistry;
use probe_service::{AppState, Config};
use serde_json::Value;
use time::macros::datetime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Port that was free a moment ago.
pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// State with a pinned clock and host name.
pub fn test_state(config: Config) -> AppState {
    AppState::with_parts(
        config,
        MetricsRegistry::new().unwrap(),
        Arc::new(FixedClock(datetime!(2024-05-01 12:00:00 UTC))),
        "test-host",
    )
}

/// Sum of every `http_request_duration_seconds_count` series.
pub fn observation_count(rendered: &str) -> u64 {
    rendered
        .lines()
        .filter(|line| line.starts_with("http_request_duration_seconds_count"))
        .filter_map(|line| line.rsplit(' ').next())
        .filter_map(|value| value.parse::<f64>().ok())
        .sum::<f64>() as u64
}

/// In-memory log sink.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Subscriber writing JSON records into this sink.
    pub fn subscriber(&self, service: &str) -> impl tracing::Subscriber + Send + Sync + 'static {
        let format = JsonLogFormat::new(
            service,
            "test-host",
            Arc::new(FixedClock(datetime!(2024-05-01 12:00:00 UTC))),
        );
        logging::subscriber(format, EnvFilter::new("info"), self.clone())
    }

    /// Every record written so far.
    pub fn records(&self) -> Vec<Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    /// Records at the given level.
    pub fn at_level(&self, level: &str) -> Vec<Value> {
        self.records()
            .into_iter()
            .filter(|record| record["level"] == level)
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
