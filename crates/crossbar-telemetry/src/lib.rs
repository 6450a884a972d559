//! Structured logging bootstrap for the crossbar RPC substrate.
//!
//! Both transports log through `tracing`; this crate initializes the
//! subscriber once per process, JSON-formatted for production or pretty
//! for development.

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};

/// Result type alias using [`TelemetryError`].
pub type TelemetryResult<T> = Result<T, TelemetryError>;
