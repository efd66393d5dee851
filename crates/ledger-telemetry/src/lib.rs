//! # Ledger Telemetry
//!
//! Structured logging for the enterprise ledger modules.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledger_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(TelemetryConfig::from_env())?;
//!     // Application code here
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LEDGER_SERVICE_NAME` | `enterprise-ledger` | Service name |
//! | `LEDGER_LOG_LEVEL` | `info` | Log filter, falls back to `RUST_LOG` |
//! | `LEDGER_JSON_LOGS` | `false` | One JSON object per line |

mod config;
mod logging;

pub use config::TelemetryConfig;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(String),

    #[error("a global subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}

/// Install the global tracing subscriber described by `config`.
///
/// Fails if the filter does not parse or a subscriber is already set.
pub fn init_telemetry(config: TelemetryConfig) -> Result<(), TelemetryError> {
    logging::init_logging(&config)
}

/// Best-effort initialisation for test binaries. Repeated calls are ignored.
pub fn init_test_telemetry() {
    let _ = logging::init_logging(&TelemetryConfig::for_testing());
}
