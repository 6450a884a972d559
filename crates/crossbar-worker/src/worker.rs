//! The queue worker.
//!
//! [`Worker::run`] polls the transport for one message at a time and hands
//! each received message to [`Worker::process_message`] on its own task, so
//! message processing runs concurrently while only one receive is ever in
//! flight. Transport errors never terminate the loop; they are logged by
//! category and followed by a fixed cooldown.
//!
//! A message is acknowledged (deleted) when it was handled, or when it is
//! poison: structurally invalid, or failed with a fault its handler's
//! table marks non-retriable. Any other failure leaves the message
//! untouched for the transport's visibility-timeout redelivery.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crossbar_core::fault::is_poison;
use crossbar_core::{
    is_ident_token, ExecutionContext, QueueMessage, QueueTransport, SchemaValidator,
};

use crate::config::WorkerConfig;
use crate::routes::{MessageDescriptor, MessageRoutes};

/// The queue-transport entry point.
///
/// Holds no shared mutable state across messages beyond the in-flight
/// gauge; each invocation is self-contained over its own message.
pub struct Worker {
    transport: Arc<dyn QueueTransport>,
    validator: Arc<dyn SchemaValidator>,
    routes: Arc<MessageRoutes>,
    config: WorkerConfig,
    active: AtomicU64,
}

impl Worker {
    /// Creates a worker over its collaborators and message table.
    #[must_use]
    pub fn new(
        transport: Arc<dyn QueueTransport>,
        validator: Arc<dyn SchemaValidator>,
        routes: Arc<MessageRoutes>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            transport,
            validator,
            routes,
            config,
            active: AtomicU64::new(0),
        }
    }

    /// The number of messages currently being processed.
    #[must_use]
    pub fn active_count(&self) -> u64 {
        self.active.load(Ordering::Relaxed)
    }

    /// Runs the poll loop indefinitely.
    ///
    /// Requests exactly one message per poll with the configured long-poll
    /// wait. A received message is processed on a spawned task; the loop
    /// does not wait for processing before the next poll.
    pub async fn run(self: Arc<Self>) {
        loop {
            let messages = match self.transport.receive(1, self.config.wait()).await {
                Ok(messages) => messages,
                Err(err) => {
                    if err.is_known_transient() {
                        tracing::warn!("{err}");
                    } else {
                        tracing::warn!(error = %err, "cannot receive message");
                    }
                    tokio::time::sleep(self.config.cooldown()).await;
                    continue;
                }
            };

            // An empty list is a normal long-poll timeout. More than one
            // message violates the single-receive contract; the batch is
            // treated as empty and left to redelivery.
            if messages.is_empty() {
                continue;
            }
            if messages.len() > 1 {
                tracing::warn!(count = messages.len(), "received more than one message");
                continue;
            }
            let Some(message) = messages.into_iter().next() else {
                continue;
            };

            let worker = Arc::clone(&self);
            tokio::spawn(worker.process_message(message));
        }
    }

    /// Processes one received message to its disposition.
    ///
    /// Structural failures are logged and classified poison before any
    /// business logic runs; the message is deleted and never retried.
    pub async fn process_message(self: Arc<Self>, message: QueueMessage) {
        tracing::trace!(message_id = %message.message_id, "process message");

        let Some((descriptor, ctx, content)) = self.validate_message(&message) else {
            self.delete_message(&message).await;
            return;
        };

        self.active.fetch_add(1, Ordering::Relaxed);

        match (descriptor.method)(ctx, content).await {
            Ok(_) => {
                self.delete_message(&message).await;
                self.active.fetch_sub(1, Ordering::Relaxed);
            }
            Err(err) => {
                if is_poison(err.message(), descriptor.fault_table.as_ref()) {
                    tracing::warn!(error = %err, message_id = %message.message_id, "deleting message upon non-retriable fault");
                    self.delete_message(&message).await;
                    self.active.fetch_sub(1, Ordering::Relaxed);
                } else {
                    tracing::warn!(error = %err, message_id = %message.message_id, "will retry message");
                    self.active.fetch_sub(1, Ordering::Relaxed);
                }
            }
        }
    }

    /// Structurally validates a message and resolves its descriptor.
    ///
    /// Every rejection is logged; `None` means the message is poison.
    fn validate_message(
        &self,
        message: &QueueMessage,
    ) -> Option<(&MessageDescriptor, ExecutionContext, Option<Value>)> {
        let item: Value = match serde_json::from_str(&message.body) {
            Ok(item) => item,
            Err(err) => {
                tracing::warn!(error = %err, "cannot parse message body");
                return None;
            }
        };

        let Value::Object(item) = item else {
            tracing::warn!("message item is not an object");
            return None;
        };

        let Some(message_type) = item.get("type").and_then(Value::as_str) else {
            tracing::warn!("message type is not a string");
            return None;
        };

        tracing::debug!(message_type, "message type");

        let Some(descriptor) = self.routes.lookup(message_type) else {
            tracing::warn!(message_type, "no handler for message type");
            return None;
        };

        let mut ctx = ExecutionContext::new();
        match item.get("headers") {
            None => {}
            Some(Value::Object(headers)) => {
                if let Some(principal_id) = headers.get("principalId") {
                    match principal_id.as_str() {
                        Some(principal_id) if is_ident_token(principal_id) => {
                            ctx.principal_id = Some(principal_id.to_string());
                        }
                        _ => {
                            tracing::warn!("principalId is not an identifier token");
                            return None;
                        }
                    }
                }
                if let Some(request_id) = headers.get("requestId") {
                    match request_id.as_str() {
                        Some(request_id) if is_ident_token(request_id) => {
                            ctx.request_id = Some(request_id.to_string());
                        }
                        _ => {
                            tracing::warn!("requestId is not an identifier token");
                            return None;
                        }
                    }
                }
            }
            Some(_) => {
                tracing::warn!("message headers is not an object");
                return None;
            }
        }

        let content = item.get("content").cloned();

        if let Some(schema) = &descriptor.request_schema {
            let errors = self.validator.validate(schema, content.as_ref(), "content");
            if !errors.is_empty() {
                for error in &errors {
                    tracing::warn!("{error}");
                }
                return None;
            }
        }

        Some((descriptor, ctx, content))
    }

    /// Deletes a message, retrying a bounded number of times.
    ///
    /// After the final failed attempt the delete is abandoned silently;
    /// the message may reappear and be reprocessed later.
    async fn delete_message(&self, message: &QueueMessage) {
        for _ in 0..self.config.delete_attempts() {
            tracing::trace!(message_id = %message.message_id, "delete message");

            match self.transport.delete(&message.receipt_handle).await {
                Ok(()) => return,
                Err(err) => {
                    tracing::warn!(error = %err, "cannot delete message");
                    tokio::time::sleep(self.config.delete_pause()).await;
                }
            }
        }
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("routes", &self.routes.len())
            .field("active", &self.active_count())
            .finish()
    }
}
