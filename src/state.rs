//! Explicit service context shared with every handler.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::Config;
use crate::metrics::MetricsRegistry;

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Resolved configuration.
    pub config: Arc<Config>,
    /// Metrics registry updated on every request.
    pub metrics: MetricsRegistry,
    /// Source of response timestamps.
    pub clock: Arc<dyn Clock>,
    /// Host name reported by `/`.
    pub hostname: Arc<str>,
}

impl AppState {
    /// Create state from explicit parts.
    pub fn with_parts(
        config: Config,
        metrics: MetricsRegistry,
        clock: Arc<dyn Clock>,
        hostname: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            metrics,
            clock,
            hostname: hostname.into(),
        }
    }

    /// Current instant formatted for response bodies.
    pub fn timestamp(&self) -> String {
        self.clock.timestamp()
    }
}

/// Machine host name, or "unknown" when it cannot be read.
pub fn resolve_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use time::macros::datetime;

    #[test]
    fn timestamp_comes_from_injected_clock() {
        let state = AppState::with_parts(
            Config::default(),
            MetricsRegistry::new().unwrap(),
            Arc::new(FixedClock(datetime!(2024-02-29 23:59:59.999 UTC))),
            "web-1",
        );
        assert_eq!(state.timestamp(), "2024-02-29T23:59:59.999Z");
        assert_eq!(&*state.hostname, "web-1");
    }

    #[test]
    fn resolves_some_hostname() {
        assert!(!resolve_hostname().is_empty());
    }
}
