//! Application configuration loaded from environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    // === Server Configuration ===
    /// HTTP listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds in-flight requests may take to finish after a shutdown signal.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,

    /// Serve the OpenAPI document and Swagger UI.
    #[serde(default = "default_true")]
    pub docs_enabled: bool,

    // === Service Identity ===
    /// Service name reported by `/` and stamped on every log record.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Human readable description reported by `/`.
    #[serde(default = "default_app_description")]
    pub app_description: String,

    /// Version reported by `/`.
    #[serde(default = "default_app_version")]
    pub app_version: String,

    // === Logging ===
    /// Log filter directives (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_port() -> u16 {
    3000
}

fn default_shutdown_grace() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_app_name() -> String {
    "microservice".to_string()
}

fn default_app_description() -> String {
    "default microservice".to_string()
}

fn default_app_version() -> String {
    "1.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            shutdown_grace_seconds: default_shutdown_grace(),
            docs_enabled: default_true(),
            app_name: default_app_name(),
            app_description: default_app_description(),
            app_version: default_app_version(),
            rust_log: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Build configuration from explicit key/value pairs.
    ///
    /// Empty values are treated as unset so `APP_NAME=` falls back to the
    /// default instead of producing a blank service name.
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars.into_iter().filter(|(_, value)| !value.is_empty()))
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.app_name.trim().is_empty() {
            return Err("APP_NAME must not be blank".to_string());
        }

        if self.app_version.trim().is_empty() {
            return Err("APP_VERSION must not be blank".to_string());
        }

        if self.shutdown_grace_seconds == 0 {
            return Err("SHUTDOWN_GRACE_SECONDS must be at least 1".to_string());
        }

        Ok(())
    }

    /// Drain bound applied after a shutdown signal.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_seconds)
    }
}
