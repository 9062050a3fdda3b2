//! Structured JSON logging.
//!
//! Every event is written as one flat JSON object per line:
//!
//! ```text
//! {"level":"info","msg":"Request completed","timestamp":"2024-05-01T12:30:00.123Z",
//!  "hostname":"web-1","service":"microservice","method":"GET","path":"/health",...}
//! ```
//!
//! Event fields are merged into the top level next to the fixed keys.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::clock::Clock;

/// Event formatter producing the flat JSON log record.
#[derive(Debug, Clone)]
pub struct JsonLogFormat {
    service: String,
    hostname: String,
    clock: Arc<dyn Clock>,
}

impl JsonLogFormat {
    /// Create a formatter stamping records with the given identity.
    pub fn new(service: impl Into<String>, hostname: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            service: service.into(),
            hostname: hostname.into(),
            clock,
        }
    }

    /// Build the JSON record for one event.
    pub fn record(&self, event: &Event<'_>) -> Map<String, Value> {
        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        let mut record = Map::new();
        record.insert("level".into(), level_name(event.metadata().level()).into());
        record.insert("msg".into(), fields.message.unwrap_or_default().into());
        record.insert("timestamp".into(), self.clock.timestamp().into());
        record.insert("hostname".into(), self.hostname.clone().into());
        record.insert("service".into(), self.service.clone().into());
        record.extend(fields.values);
        record
    }
}

impl<S, N> FormatEvent<S, N> for JsonLogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let line = serde_json::to_string(&self.record(event)).map_err(|_| fmt::Error)?;
        writeln!(writer, "{line}")
    }
}

fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "error",
        Level::WARN => "warn",
        Level::INFO => "info",
        Level::DEBUG => "debug",
        Level::TRACE => "trace",
    }
}

/// Collects event fields as JSON primitives.
#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    values: Map<String, Value>,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.values.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldCollector {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::from(format!("{value:?}")));
    }
}

/// Build the service subscriber writing JSON lines to `writer`.
pub fn subscriber<W>(
    format: JsonLogFormat,
    filter: EnvFilter,
    writer: W,
) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .event_format(format)
            .with_writer(writer),
    )
}

/// Filter from the configured `RUST_LOG` directives.
///
/// Blank or unparsable directives fall back to `info`; `verbose` raises
/// this crate to debug.
pub fn env_filter(directives: &str, verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("probe_service=debug,info");
    }
    if directives.trim().is_empty() {
        return EnvFilter::new("info");
    }
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the JSON subscriber for the whole process, writing to stdout.
pub fn init(format: JsonLogFormat, filter: EnvFilter) {
    subscriber(format, filter, std::io::stdout).init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use std::io;
    use std::sync::Mutex;
    use time::macros::datetime;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Buffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(f: impl FnOnce()) -> Vec<Value> {
        let buffer = Buffer::default();
        let format = JsonLogFormat::new(
            "orders",
            "web-1",
            Arc::new(FixedClock(datetime!(2024-05-01 12:30:00.5 UTC))),
        );
        let subscriber = subscriber(format, EnvFilter::new("trace"), buffer.clone());
        tracing::subscriber::with_default(subscriber, f);

        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn writes_flat_record_with_identity() {
        let records = capture(|| tracing::info!(port = 3000u64, "Server started"));
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record["level"], "info");
        assert_eq!(record["msg"], "Server started");
        assert_eq!(record["timestamp"], "2024-05-01T12:30:00.500Z");
        assert_eq!(record["hostname"], "web-1");
        assert_eq!(record["service"], "orders");
        assert_eq!(record["port"], 3000);
    }

    #[test]
    fn keeps_field_types_and_lowercases_level() {
        let records = capture(|| {
            tracing::error!(path = "/boom", status = 500u16, retried = false, "Unhandled error")
        });

        let record = &records[0];
        assert_eq!(record["level"], "error");
        assert_eq!(record["path"], "/boom");
        assert_eq!(record["status"], 500);
        assert_eq!(record["retried"], false);
    }

    fn max_level(filter: &EnvFilter) -> Option<tracing::level_filters::LevelFilter> {
        <EnvFilter as tracing_subscriber::Layer<tracing_subscriber::Registry>>::max_level_hint(filter)
    }

    #[test]
    fn empty_rust_log_keeps_info_logging() {
        let config = crate::config::Config::from_vars(vec![(
            "RUST_LOG".to_string(),
            String::new(),
        )])
        .unwrap();
        assert_eq!(config.rust_log, "info");

        use tracing::level_filters::LevelFilter;
        assert_eq!(max_level(&env_filter(&config.rust_log, false)), Some(LevelFilter::INFO));
        assert_eq!(max_level(&env_filter("", false)), Some(LevelFilter::INFO));
        assert_eq!(max_level(&env_filter("warn", false)), Some(LevelFilter::WARN));
        assert_eq!(max_level(&env_filter("not a[valid filter", false)), Some(LevelFilter::INFO));
    }

    #[test]
    fn display_fields_become_strings() {
        let records = capture(|| tracing::info!(method = %"GET", "Request completed"));
        assert_eq!(records[0]["method"], "GET");
    }
}
