use std::time::Duration;

use leadflow_domain::{LeadflowError, LoggingConfig, Result as DomainResult};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set. Calling this twice is
/// an error because the global subscriber can only be set once.
pub fn init_tracing(config: &LoggingConfig) -> DomainResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| LeadflowError::Config(format!("Invalid log level '{}': {e}", config.level)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let result = if config.json { builder.json().try_init() } else { builder.try_init() };
    result.map_err(|e| LeadflowError::Internal(format!("failed to install tracing subscriber: {e}")))
}

/// Log the outcome of a command execution with structured fields.
///
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, error_type: Option<&str>) {
    let duration_ms = elapsed.as_millis() as u64;

    match error_type {
        None => info!(command, duration_ms, "command_execution_success"),
        Some(error_type) => warn!(command, duration_ms, error_type, "command_execution_failure"),
    }
}

/// Stable label for an error, suitable for logs.
#[inline]
pub fn error_label(error: &LeadflowError) -> &'static str {
    match error {
        LeadflowError::Database(_) => "database",
        LeadflowError::Config(_) => "config",
        LeadflowError::Network(_) => "network",
        LeadflowError::Auth(_) => "auth",
        LeadflowError::Validation(_) => "validation",
        LeadflowError::NotFound(_) => "not_found",
        LeadflowError::InvalidInput(_) => "invalid_input",
        LeadflowError::Internal(_) => "internal",
    }
}
