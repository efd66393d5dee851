//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every line
    pub service_name: String,

    /// Log filter directive (trace, debug, info, warn, error, or a full
    /// `EnvFilter` directive such as `lm_03_anchor_storage=debug`)
    pub log_level: String,

    /// Emit one JSON object per line instead of the human format
    pub json_logs: bool,

    /// Include the module path of each event
    pub with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "enterprise-ledger".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            with_target: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LEDGER_SERVICE_NAME`: Service name (default: enterprise-ledger)
    /// - `LEDGER_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `LEDGER_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            service_name: lookup("LEDGER_SERVICE_NAME").unwrap_or(defaults.service_name),
            log_level: lookup("LEDGER_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            json_logs: lookup("LEDGER_JSON_LOGS")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(defaults.json_logs),
            with_target: defaults.with_target,
        }
    }

    /// Quiet configuration for test binaries.
    pub fn for_testing() -> Self {
        Self {
            log_level: "warn".to_string(),
            with_target: false,
            ..Default::default()
        }
    }
}
