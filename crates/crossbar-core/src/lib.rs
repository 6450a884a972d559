//! Core types and collaborator traits for the crossbar RPC substrate.
//!
//! This crate defines the contract shared by the HTTP gateway and the
//! queue worker:
//!
//! - [`fault`]: the closed set of caller-visible fault codes and the
//!   fault-resolution algorithm both transports apply to business failures
//! - [`context`]: the execution context passed to every business-method
//!   invocation, plus the authorization data types
//! - [`registry`]: the method registry that binds named business methods
//!   to callable entries at startup
//! - [`ident`]: the restricted identifier-token check used for message
//!   headers
//! - collaborator traits for the authorization service ([`authz`]), the
//!   schema validator ([`validator`]), the durable request service
//!   ([`requests`]), and the queue transport ([`transport`])
//!
//! Business logic, storage, and cryptographic verification live behind the
//! collaborator traits; this crate only defines the seams.

pub mod authz;
pub mod context;
pub mod error;
pub mod fault;
pub mod ident;
pub mod registry;
pub mod requests;
pub mod transport;
pub mod validator;

pub use authz::AuthorizationService;
pub use context::{AuthInfo, AuthResult, ExecutionContext};
pub use error::{AuthError, HandlerError, RequestServiceError};
pub use fault::{codes, resolve_fault, FaultTable};
pub use ident::is_ident_token;
pub use registry::{BoundMethod, MethodFuture, MethodRegistry};
pub use requests::{BeginRequest, CompleteRequest, DurableRequestService, RequestTicket};
pub use transport::{QueueMessage, QueueTransport, TransportError};
pub use validator::{Schema, SchemaValidator};

use std::future::Future;
use std::pin::Pin;

/// Boxed future type used by the dyn-safe collaborator traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
