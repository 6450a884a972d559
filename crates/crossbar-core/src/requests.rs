//! Durable-request-service seam.
//!
//! Deferred operations acknowledge the caller with an opaque request id
//! while their true outcome is recorded later. The record store is
//! external; the substrate only begins records and completes them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RequestServiceError;
use crate::BoxFuture;

/// Parameters for opening a durable request record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeginRequest {
    /// The principal on whose behalf the operation runs.
    pub principal_id: String,

    /// The owning service of the operation.
    pub service_id: String,

    /// The operation name.
    pub action: String,
}

/// The acknowledgment returned to the caller of a deferred operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestTicket {
    /// The opaque id the caller polls or is notified with.
    #[serde(rename = "requestId")]
    pub request_id: String,
}

/// Parameters for recording a deferred operation's terminal outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteRequest {
    /// The record to complete.
    pub request_id: String,

    /// The terminal fault code (`"ok"` on success).
    pub code: String,

    /// The result payload, when the operation produced one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Creates and completes durable request records.
///
/// A record transitions to terminal exactly once via `complete_request`
/// and is never mutated afterward; the store enforces that invariant.
pub trait DurableRequestService: Send + Sync {
    /// Opens a record and returns its id.
    fn begin_request(
        &self,
        begin: BeginRequest,
    ) -> BoxFuture<'_, Result<RequestTicket, RequestServiceError>>;

    /// Records the terminal outcome for a request id.
    fn complete_request(
        &self,
        complete: CompleteRequest,
    ) -> BoxFuture<'_, Result<(), RequestServiceError>>;
}
