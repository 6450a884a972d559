//! Queue-transport seam.
//!
//! The transport delivers messages at least once: a message that is
//! received but not deleted becomes visible again after the transport's
//! visibility timeout and is redelivered. Consumers must therefore be
//! idempotent; nothing in this layer enforces that.

use std::time::Duration;

use thiserror::Error;

use crate::BoxFuture;

/// A received queue message.
///
/// The body is an opaque string on the wire; the worker parses it as JSON
/// (`{type, headers?, content}`) during structural validation.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    /// Transport-assigned message id, used for logging.
    pub message_id: String,

    /// The handle `delete` needs to acknowledge this delivery.
    pub receipt_handle: String,

    /// The raw message body.
    pub body: String,
}

/// Queue-transport failure, categorized for poll-loop logging.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The configured queue does not exist. A known transient condition
    /// (the queue may be provisioning); logged without a backtrace.
    #[error("queue does not exist: {0}")]
    QueueMissing(String),

    /// The transport endpoint could not be resolved. Also known transient.
    #[error("unknown endpoint: {0}")]
    Endpoint(String),

    /// Any other transport failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TransportError {
    /// Returns `true` for the known transient categories that are logged
    /// by message only.
    #[must_use]
    pub fn is_known_transient(&self) -> bool {
        matches!(self, Self::QueueMissing(_) | Self::Endpoint(_))
    }
}

/// Receives and acknowledges queue messages.
pub trait QueueTransport: Send + Sync {
    /// Receives at most `max_messages` messages, long-polling up to `wait`.
    ///
    /// An empty list is a normal poll timeout, not an error.
    fn receive(
        &self,
        max_messages: u32,
        wait: Duration,
    ) -> BoxFuture<'_, Result<Vec<QueueMessage>, TransportError>>;

    /// Deletes (acknowledges) a delivery by receipt handle.
    fn delete(&self, receipt_handle: &str) -> BoxFuture<'_, Result<(), TransportError>>;
}
