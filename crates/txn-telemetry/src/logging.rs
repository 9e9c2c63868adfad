//! Subscriber installation.
//!
//! JSON lines carry consistent fields for log shippers:
//! - `timestamp`, `level`, `target`
//! - `fields.message`
//! - span fields such as `service`
//! - event fields such as `target_endpoint`, `tag`, `phase`

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global `tracing` subscriber described by `config`.
///
/// `RUST_LOG` style directives in the environment take precedence over
/// `config.log_level`. Fails if a global subscriber is already set.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = build_filter(config)?;

    if !config.console_output {
        tracing_subscriber::registry()
            .with(env_filter)
            .try_init()
            .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;
        return Ok(());
    }

    if config.json_logs {
        // JSON output for containers/production
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;
    } else {
        // Pretty output for development
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;
    }

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Logging initialized"
    );

    Ok(())
}

fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::Filter {
            directive: config.log_level.clone(),
            reason: e.to_string(),
        })
}

/// Helper to create structured log entries tagged with the service name.
#[macro_export]
macro_rules! log_event {
    ($level:ident, $service:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            service = $service,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a transaction-related event with the endpoint it concerns.
#[macro_export]
macro_rules! log_txn_event {
    ($level:ident, $service:expr, $msg:expr, $endpoint:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            service = $service,
            target_endpoint = %$endpoint,
            $($($field)*,)?
            $msg
        )
    };
}
