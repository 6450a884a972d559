//! Execution context and authorization data types.
//!
//! The [`ExecutionContext`] is the only state a business method receives
//! besides its payload. The gateway fills it from the authorization result
//! (and, for deferred operations, the durable request id); the worker fills
//! it from validated message headers.

use serde_json::Value;

/// Per-invocation context passed to every business method.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// The authorized principal, when the route required authorization or
    /// the message carried a principal header.
    pub principal_id: Option<String>,

    /// Claims attached by the authorization service.
    pub claims: Option<Value>,

    /// The durable request id, when the invocation participates in a
    /// deferred-completion operation.
    pub request_id: Option<String>,
}

impl ExecutionContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a principal id.
    #[must_use]
    pub fn with_principal_id(mut self, principal_id: impl Into<String>) -> Self {
        self.principal_id = Some(principal_id.into());
        self
    }

    /// Attaches authorization claims.
    #[must_use]
    pub fn with_claims(mut self, claims: Value) -> Self {
        self.claims = Some(claims);
        self
    }

    /// Attaches a durable request id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Credentials extracted from a request by authentication.
///
/// Produced by [`AuthorizationService::authenticate`] and consumed by
/// [`AuthorizationService::authorize`].
///
/// [`AuthorizationService::authenticate`]: crate::authz::AuthorizationService::authenticate
/// [`AuthorizationService::authorize`]: crate::authz::AuthorizationService::authorize
#[derive(Debug, Clone)]
pub struct AuthInfo {
    /// The principal the credentials identify.
    pub principal_id: String,

    /// The account the principal belongs to, when applicable.
    pub account_id: Option<String>,

    /// The session the credentials were issued for, when applicable.
    pub session_id: Option<String>,

    /// The credential kind (e.g. bearer session, service key).
    pub kind: String,

    /// The raw presented token.
    pub token: String,
}

/// The outcome of a successful authorization decision.
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// The authorized principal.
    pub principal_id: String,

    /// Claims the authorization service attaches for the business method.
    pub claims: Option<Value>,
}
