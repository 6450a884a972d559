//! Error types shared across the substrate.
//!
//! [`HandlerError`] is the failure type business methods return; its
//! message string is what the fault resolver matches against a handler's
//! fault table. The collaborator error types ([`AuthError`],
//! [`RequestServiceError`]) model the failure modes the gateway and worker
//! must distinguish at their boundaries.

use thiserror::Error;

/// A business-method failure.
///
/// The message is the domain's error identifier (e.g. `"order-missing"`)
/// and is what a handler's fault table maps to a caller-visible code. An
/// optional source error is carried for logging only; it never reaches a
/// caller.
///
/// # Example
///
/// ```
/// use crossbar_core::HandlerError;
///
/// let err = HandlerError::new("out-of-stock");
/// assert_eq!(err.message(), "out-of-stock");
/// ```
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<anyhow::Error>,
}

impl HandlerError {
    /// Creates a handler error with a domain message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a handler error with a domain message and an underlying
    /// cause for logging.
    #[must_use]
    pub fn with_source(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The domain message the fault resolver matches on.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Authorization-service failure.
///
/// `InvalidToken` (from `authenticate`) and `NotAuthorized` (from
/// `authorize`) are expected rejections and are handled silently; `Other`
/// is logged at error level. All three produce a `not-authorized` response.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The presented credentials could not be verified.
    #[error("invalid-token")]
    InvalidToken,

    /// The verified principal is not permitted to perform the action.
    #[error("not-authorized")]
    NotAuthorized,

    /// An unexpected authorization-service failure.
    #[error("{0}")]
    Other(String),
}

/// Durable-request-service failure.
///
/// Opaque to callers; the gateway logs it and degrades to
/// `internal-error` where a response is still owed.
#[derive(Debug, Error)]
#[error("request service error: {message}")]
pub struct RequestServiceError {
    message: String,
    #[source]
    source: Option<anyhow::Error>,
}

impl RequestServiceError {
    /// Creates a request-service error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a request-service error with an underlying cause.
    #[must_use]
    pub fn with_source(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}
