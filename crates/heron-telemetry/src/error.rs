//! Telemetry error types.

use thiserror::Error;

/// Errors raised while setting up telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The log filter directive could not be parsed.
    #[error("invalid log filter '{filter}': {reason}")]
    InvalidFilter {
        /// The rejected directive.
        filter: String,
        /// Parser message.
        reason: String,
    },

    /// A global subscriber could not be installed.
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),
}
