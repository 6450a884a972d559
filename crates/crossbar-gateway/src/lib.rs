//! HTTP ingress for the crossbar RPC substrate.
//!
//! The gateway is the HTTP-transport entry point: it routes requests
//! through an immutable [`RouteTable`], orchestrates authentication,
//! body parsing, schema validation and authorization, dispatches to the
//! route's target (a bound business method or a raw handler, in immediate
//! or deferred mode), and maps failures onto the shared fault codes.
//!
//! # Response discipline
//!
//! Every handled response is HTTP 200 carrying a `{"code", "data"?}`
//! envelope; a response is written at most once per request, enforced by
//! [`ResponseWriter`]. Deferred routes respond with an acknowledgment
//! ticket before the business method resolves; the true outcome goes to
//! the durable request service, never to the HTTP caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use crossbar_gateway::{Gateway, GatewayConfig, HandlerDescriptor, RouteTable};
//! use http::Method;
//!
//! let routes = RouteTable::builder()
//!     .route(Method::POST, "/orders/place", place_order_descriptor)
//!     .build(&deps)?;
//!
//! let gateway = Gateway::new(routes, deps);
//! crossbar_gateway::serve(gateway, &GatewayConfig::default()).await?;
//! ```

pub mod body;
pub mod config;
pub mod descriptor;
pub mod gateway;
pub mod respond;
pub mod routes;
pub mod server;
pub mod shutdown;

pub use body::parse_request_body;
pub use config::{GatewayConfig, GatewayConfigBuilder};
pub use descriptor::{
    DescriptorBuilder, HandlerDescriptor, HandlerTarget, RawFuture, RawHandler, RawRequest,
};
pub use gateway::{Gateway, GatewayDeps};
pub use respond::{HttpResponse, ResponseWriter};
pub use routes::{RouteEntry, RouteError, RouteTable, RouteTableBuilder};
pub use server::{serve, serve_with_shutdown, ServerError};
pub use shutdown::{ConnectionTracker, ShutdownSignal};
