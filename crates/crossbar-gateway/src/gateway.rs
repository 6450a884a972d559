//! The HTTP dispatch pipeline.
//!
//! [`Gateway::handle`] runs one request through six steps: routing,
//! authentication, body acquisition, request validation, authorization,
//! dispatch. Each step either advances or records a fault envelope and
//! stops; every business or collaborator failure is caught here and
//! converted to a caller-visible code, so nothing escapes the boundary.
//!
//! Dispatch is one pipeline parameterized by the target shape (bound
//! method or raw handler) and by the route's deferred flag. Deferred
//! routes acknowledge with a durable request id and record the true
//! outcome through the request service from a spawned continuation; the
//! acknowledgment is the only response the HTTP caller ever sees.

use std::sync::Arc;

use http::request::Parts;
use http::{header, Method, Request};
use http_body_util::BodyExt;
use serde_json::{json, Map, Value};

use crossbar_core::fault::{codes, resolve_fault};
use crossbar_core::{
    AuthError, AuthorizationService, BeginRequest, CompleteRequest, DurableRequestService,
    ExecutionContext, SchemaValidator,
};

use crate::body::parse_request_body;
use crate::descriptor::{HandlerDescriptor, HandlerTarget, RawRequest};
use crate::respond::{self, HttpResponse, ResponseWriter};
use crate::routes::{RouteEntry, RouteTable};

/// The collaborators a gateway is constructed with.
#[derive(Clone)]
pub struct GatewayDeps {
    /// Authenticates and authorizes requests.
    pub authorization: Arc<dyn AuthorizationService>,

    /// Validates request and response payloads against declared schemas.
    pub validator: Arc<dyn SchemaValidator>,

    /// Records deferred operations; required when any route is deferred.
    pub request_service: Option<Arc<dyn DurableRequestService>>,
}

impl GatewayDeps {
    /// Returns `true` if a durable request service is configured.
    ///
    /// Pass this to [`RouteTableBuilder::build`] so deferred routes are
    /// validated against the actual configuration.
    ///
    /// [`RouteTableBuilder::build`]: crate::routes::RouteTableBuilder::build
    #[must_use]
    pub fn has_request_service(&self) -> bool {
        self.request_service.is_some()
    }
}

/// The HTTP-transport entry point.
pub struct Gateway {
    routes: RouteTable,
    authorization: Arc<dyn AuthorizationService>,
    validator: Arc<dyn SchemaValidator>,
    request_service: Option<Arc<dyn DurableRequestService>>,
}

impl Gateway {
    /// Creates a gateway over a built route table and its collaborators.
    #[must_use]
    pub fn new(routes: RouteTable, deps: GatewayDeps) -> Self {
        Self {
            routes,
            authorization: deps.authorization,
            validator: deps.validator,
            request_service: deps.request_service,
        }
    }

    /// Handles one HTTP request end to end.
    ///
    /// Always produces a response; handled outcomes are HTTP 200 envelopes
    /// regardless of the fault code inside.
    pub async fn handle<B>(&self, request: Request<B>) -> HttpResponse
    where
        B: hyper::body::Body + Send,
        B::Data: Send,
        B::Error: std::fmt::Display,
    {
        let (parts, body) = request.into_parts();

        // 1. Routing. A miss responds invalid-request without CORS; the
        // CORS flag belongs to the descriptor we failed to find.
        let Some(entry) = self.routes.lookup(&parts.method, parts.uri.path()) else {
            tracing::warn!(method = %parts.method, path = %parts.uri.path(), "no route");
            return respond::envelope(codes::INVALID_REQUEST, None, false);
        };

        let descriptor = match entry {
            RouteEntry::Preflight => return respond::preflight(),
            RouteEntry::Handler(descriptor) => Arc::clone(descriptor),
        };

        let writer = ResponseWriter::new(descriptor.cors);

        // 2. Authentication.
        let mut auth_info = None;
        if descriptor.requires_auth {
            match self.authorization.authenticate(&parts).await {
                Ok(info) => auth_info = Some(info),
                Err(err) => {
                    if !matches!(err, AuthError::InvalidToken) {
                        tracing::error!(error = %err, "authentication failed");
                    }
                    writer.send_fault(codes::NOT_AUTHORIZED, None);
                    return Self::finish(&writer);
                }
            }
        }

        // 3. Body acquisition, POST only.
        let mut body_value = None;
        if parts.method == Method::POST {
            let bytes = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(err) => {
                    tracing::warn!(error = %err, "cannot read request body");
                    writer.send_fault(codes::INVALID_REQUEST, None);
                    return Self::finish(&writer);
                }
            };

            let content_type = parts
                .headers
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok());

            match parse_request_body(content_type, &bytes) {
                Ok(value) => body_value = value,
                Err(err) => {
                    tracing::warn!(error = %err, "cannot parse request body");
                    writer.send_fault(codes::INVALID_REQUEST, None);
                    return Self::finish(&writer);
                }
            }
        }

        // 4. Request validation.
        if let Some(schema) = &descriptor.request_schema {
            let errors = self.validator.validate(schema, body_value.as_ref(), "body");
            if !errors.is_empty() {
                for error in &errors {
                    tracing::warn!("{error}");
                }
                writer.send_fault(codes::INVALID_REQUEST, Some(Value::from(errors)));
                return Self::finish(&writer);
            }
        }

        // 5. Authorization.
        let mut ctx = ExecutionContext::new();
        if descriptor.requires_auth {
            let Some(info) = auth_info.as_ref() else {
                // Unreachable: authentication ran above for this route.
                writer.send_fault(codes::NOT_AUTHORIZED, None);
                return Self::finish(&writer);
            };

            let authorize_body = body_value
                .clone()
                .unwrap_or_else(|| Value::Object(Map::new()));

            match self
                .authorization
                .authorize(&parts, info, descriptor.action.as_deref(), &authorize_body)
                .await
            {
                Ok(result) => {
                    ctx.principal_id = Some(result.principal_id);
                    ctx.claims = result.claims;
                }
                Err(err) => {
                    if !matches!(err, AuthError::NotAuthorized) {
                        tracing::error!(error = %err, "authorization failed");
                    }
                    writer.send_fault(codes::NOT_AUTHORIZED, None);
                    return Self::finish(&writer);
                }
            }
        }

        // 6. Dispatch.
        if descriptor.deferred {
            self.dispatch_deferred(descriptor, ctx, body_value, parts, &writer)
                .await;
        } else {
            self.dispatch_immediate(&descriptor, ctx, body_value, parts, &writer)
                .await;
        }

        Self::finish(&writer)
    }

    /// Immediate dispatch: the handler's outcome is this request's
    /// response, unless the handler already wrote one itself.
    async fn dispatch_immediate(
        &self,
        descriptor: &HandlerDescriptor,
        ctx: ExecutionContext,
        body: Option<Value>,
        parts: Parts,
        writer: &ResponseWriter,
    ) {
        let outcome = match &descriptor.target {
            HandlerTarget::Method(method) => method(ctx, body).await,
            HandlerTarget::Raw(handler) => {
                handler(RawRequest { parts, body }, writer.clone()).await
            }
        };

        match outcome {
            Err(err) => {
                tracing::warn!(error = %err, "handler failed");
                if !writer.is_sent() {
                    let code = resolve_fault(err.message(), descriptor.fault_table.as_ref());
                    writer.send_fault(&code, None);
                }
            }
            Ok(data) => {
                if writer.is_sent() {
                    return;
                }
                match &descriptor.response_schema {
                    None => writer.send_ok(data),
                    Some(schema) => {
                        let errors = self.validator.validate(schema, data.as_ref(), "response");
                        if errors.is_empty() {
                            writer.send_ok(data);
                        } else {
                            writer.send_fault(codes::INTERNAL_ERROR, None);
                        }
                    }
                }
            }
        }
    }

    /// Deferred dispatch: open a durable record, acknowledge with its id,
    /// and record the outcome from a spawned continuation.
    async fn dispatch_deferred(
        &self,
        descriptor: Arc<HandlerDescriptor>,
        ctx: ExecutionContext,
        body: Option<Value>,
        parts: Parts,
        writer: &ResponseWriter,
    ) {
        // Enforced when the route table was built; degrade instead of
        // panicking if the invariant is somehow violated.
        let Some(service) = self.request_service.clone() else {
            writer.send_fault(codes::INTERNAL_ERROR, None);
            return;
        };
        let (Some(principal_id), Some(service_id), Some(action)) = (
            ctx.principal_id.clone(),
            descriptor.service_id.clone(),
            descriptor.action.clone(),
        ) else {
            writer.send_fault(codes::INTERNAL_ERROR, None);
            return;
        };

        let ticket = match service
            .begin_request(BeginRequest {
                principal_id,
                service_id,
                action,
            })
            .await
        {
            Ok(ticket) => ticket,
            Err(err) => {
                tracing::error!(error = %err, "cannot begin request");
                writer.send_fault(codes::INTERNAL_ERROR, None);
                return;
            }
        };

        // The acknowledgment is the only response this call ever sends;
        // the operation's true outcome goes to the durable record.
        writer.send_ok(Some(json!({ "requestId": ticket.request_id })));

        let ctx = ctx.with_request_id(ticket.request_id.clone());
        let validator = Arc::clone(&self.validator);
        let writer = writer.clone();

        tokio::spawn(async move {
            let outcome = match &descriptor.target {
                HandlerTarget::Method(method) => method(ctx, body).await,
                HandlerTarget::Raw(handler) => {
                    // The writer is already sent; direct writes are no-ops.
                    handler(RawRequest { parts, body }, writer).await
                }
            };

            let completion = match outcome {
                Err(err) => {
                    tracing::warn!(error = %err, request_id = %ticket.request_id, "deferred handler failed");
                    Some(CompleteRequest {
                        request_id: ticket.request_id.clone(),
                        code: resolve_fault(err.message(), descriptor.fault_table.as_ref()),
                        data: None,
                    })
                }
                // No value: completion belongs to a later actor that
                // knows the request id.
                Ok(None) => None,
                Ok(Some(data)) => match &descriptor.response_schema {
                    None => Some(CompleteRequest {
                        request_id: ticket.request_id.clone(),
                        code: codes::OK.to_string(),
                        data: Some(data),
                    }),
                    Some(schema) => {
                        let errors = validator.validate(schema, Some(&data), "response");
                        if errors.is_empty() {
                            Some(CompleteRequest {
                                request_id: ticket.request_id.clone(),
                                code: codes::OK.to_string(),
                                data: Some(data),
                            })
                        } else {
                            Some(CompleteRequest {
                                request_id: ticket.request_id.clone(),
                                code: codes::INTERNAL_ERROR.to_string(),
                                data: None,
                            })
                        }
                    }
                },
            };

            if let Some(complete) = completion {
                if let Err(err) = service.complete_request(complete).await {
                    tracing::error!(error = %err, request_id = %ticket.request_id, "cannot complete request");
                }
            }
        });
    }

    /// Takes the recorded response; every pipeline path records one, so
    /// the fallback is defensive only.
    fn finish(writer: &ResponseWriter) -> HttpResponse {
        writer
            .take()
            .unwrap_or_else(|| respond::envelope(codes::INTERNAL_ERROR, None, false))
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("routes", &self.routes.len())
            .field("request_service", &self.request_service.is_some())
            .finish()
    }
}
