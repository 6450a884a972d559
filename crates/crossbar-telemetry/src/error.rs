//! Telemetry error types.

use thiserror::Error;

/// Telemetry initialization failure.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The logging subscriber could not be installed.
    #[error("logging initialization failed: {0}")]
    LoggingInit(String),
}
