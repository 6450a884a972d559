//! Handler descriptors for HTTP routes.
//!
//! A [`HandlerDescriptor`] is the static configuration describing how one
//! route is authorized, validated, dispatched, and how its failures map to
//! fault codes. Descriptors are plain data built at startup; the dispatch
//! target is already a bound callable, so nothing is looked up by name at
//! request time.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::request::Parts;
use serde_json::Value;

use crossbar_core::{BoundMethod, FaultTable, HandlerError, Schema};

use crate::respond::ResponseWriter;

/// The request view a raw handler receives.
///
/// Raw handlers get the request head and the parsed body (when the route
/// carried one) instead of a typed payload.
#[derive(Debug)]
pub struct RawRequest {
    /// Request head: method, uri, headers.
    pub parts: Parts,

    /// The parsed request body, if any.
    pub body: Option<Value>,
}

/// Boxed future returned by a raw handler.
pub type RawFuture = Pin<Box<dyn Future<Output = Result<Option<Value>, HandlerError>> + Send>>;

/// A handler that receives the raw request and may write the response
/// itself through the [`ResponseWriter`].
///
/// If the handler does not write, its returned value goes through the same
/// response-schema/envelope path as a bound method's.
pub type RawHandler = Arc<dyn Fn(RawRequest, ResponseWriter) -> RawFuture + Send + Sync>;

/// The dispatch target of a route.
pub enum HandlerTarget {
    /// A business method bound from the registry.
    Method(BoundMethod),

    /// A raw handler with direct response access.
    Raw(RawHandler),
}

impl std::fmt::Debug for HandlerTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Method(_) => f.write_str("Method"),
            Self::Raw(_) => f.write_str("Raw"),
        }
    }
}

/// Static per-route configuration.
///
/// # Example
///
/// ```rust,ignore
/// use crossbar_gateway::HandlerDescriptor;
///
/// let descriptor = HandlerDescriptor::method(place_order)
///     .requires_auth(true)
///     .cors(true)
///     .action("orders.place")
///     .request_schema(schema)
///     .build();
/// ```
#[derive(Debug)]
pub struct HandlerDescriptor {
    /// Whether authentication and authorization run for this route.
    pub requires_auth: bool,

    /// Whether responses carry `Access-Control-Allow-Origin: *`.
    pub cors: bool,

    /// Schema the parsed request body must satisfy, if declared.
    pub request_schema: Option<Schema>,

    /// Schema the handler's result must satisfy, if declared.
    pub response_schema: Option<Schema>,

    /// Mapping from business-error messages to caller-visible codes.
    pub fault_table: Option<FaultTable>,

    /// Deferred mode: acknowledge with a durable request id, record the
    /// outcome later.
    pub deferred: bool,

    /// Owning service of a deferred operation.
    pub service_id: Option<String>,

    /// The operation name, used by authorization and by deferred records.
    pub action: Option<String>,

    /// The dispatch target.
    pub target: HandlerTarget,
}

impl HandlerDescriptor {
    /// Starts a descriptor for a bound business method.
    #[must_use]
    pub fn method(method: BoundMethod) -> DescriptorBuilder {
        DescriptorBuilder::new(HandlerTarget::Method(method))
    }

    /// Starts a descriptor for a raw handler.
    #[must_use]
    pub fn raw<F>(handler: F) -> DescriptorBuilder
    where
        F: Fn(RawRequest, ResponseWriter) -> RawFuture + Send + Sync + 'static,
    {
        DescriptorBuilder::new(HandlerTarget::Raw(Arc::new(handler)))
    }
}

/// Builder for [`HandlerDescriptor`].
pub struct DescriptorBuilder {
    descriptor: HandlerDescriptor,
}

impl DescriptorBuilder {
    fn new(target: HandlerTarget) -> Self {
        Self {
            descriptor: HandlerDescriptor {
                requires_auth: false,
                cors: false,
                request_schema: None,
                response_schema: None,
                fault_table: None,
                deferred: false,
                service_id: None,
                action: None,
                target,
            },
        }
    }

    /// Requires authentication and authorization.
    #[must_use]
    pub fn requires_auth(mut self, requires_auth: bool) -> Self {
        self.descriptor.requires_auth = requires_auth;
        self
    }

    /// Enables the CORS response header.
    #[must_use]
    pub fn cors(mut self, cors: bool) -> Self {
        self.descriptor.cors = cors;
        self
    }

    /// Declares the request-body schema.
    #[must_use]
    pub fn request_schema(mut self, schema: Schema) -> Self {
        self.descriptor.request_schema = Some(schema);
        self
    }

    /// Declares the response schema.
    #[must_use]
    pub fn response_schema(mut self, schema: Schema) -> Self {
        self.descriptor.response_schema = Some(schema);
        self
    }

    /// Declares the fault table.
    #[must_use]
    pub fn fault_table(mut self, table: FaultTable) -> Self {
        self.descriptor.fault_table = Some(table);
        self
    }

    /// Names the operation for authorization and deferred records.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.descriptor.action = Some(action.into());
        self
    }

    /// Switches the route to deferred mode under the given service.
    ///
    /// Deferred routes must also require auth and carry an action; the
    /// route-table builder enforces those preconditions.
    #[must_use]
    pub fn deferred(mut self, service_id: impl Into<String>) -> Self {
        self.descriptor.deferred = true;
        self.descriptor.service_id = Some(service_id.into());
        self
    }

    /// Finishes the descriptor.
    #[must_use]
    pub fn build(self) -> HandlerDescriptor {
        self.descriptor
    }
}
