//! Authorization-service seam.
//!
//! Token and key verification are external to this layer; the gateway only
//! orchestrates the two calls and maps rejections to `not-authorized`.

use http::request::Parts;
use serde_json::Value;

use crate::context::{AuthInfo, AuthResult};
use crate::error::AuthError;
use crate::BoxFuture;

/// Authenticates and authorizes inbound HTTP requests.
///
/// `authenticate` extracts and verifies the presented credentials;
/// `authorize` decides whether the authenticated principal may perform the
/// route's action against the parsed body.
///
/// Expected rejections are [`AuthError::InvalidToken`] from `authenticate`
/// and [`AuthError::NotAuthorized`] from `authorize`; any other failure is
/// treated as unexpected and logged by the caller.
pub trait AuthorizationService: Send + Sync {
    /// Extracts and verifies credentials from the request head.
    fn authenticate<'a>(&'a self, request: &'a Parts) -> BoxFuture<'a, Result<AuthInfo, AuthError>>;

    /// Decides whether the principal may perform `action` with `body`.
    fn authorize<'a>(
        &'a self,
        request: &'a Parts,
        info: &'a AuthInfo,
        action: Option<&'a str>,
        body: &'a Value,
    ) -> BoxFuture<'a, Result<AuthResult, AuthError>>;
}
