//! # Transaction Telemetry
//!
//! Structured logging for processes that schedule or dispatch transactions.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use txn_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_logging(&config).expect("Failed to init logging");
//!     let _root = config.service_span().entered();
//!
//!     // Envelope and dispatcher events are now emitted with `service`
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TXN_SERVICE_NAME` | `txn-envelope` | Service name on log lines |
//! | `TXN_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `TXN_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `TXN_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("Invalid log filter {directive:?}: {reason}")]
    Filter { directive: String, reason: String },

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Convenience macro for creating a span around one dispatch.
///
/// # Example
///
/// ```rust,ignore
/// use txn_telemetry::dispatch_span;
///
/// let _span = dispatch_span!("dispatch", endpoint = %handle).entered();
/// ```
#[macro_export]
macro_rules! dispatch_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
