//! The route table.
//!
//! Routes map (HTTP method, exact path) to a [`HandlerDescriptor`]. The
//! table is built once at startup and never mutated while serving; building
//! is also where deferred-mode preconditions are enforced, so a
//! misconfigured descriptor is a startup error rather than a request-time
//! surprise.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use thiserror::Error;

use crate::descriptor::HandlerDescriptor;

/// One entry in the route table.
#[derive(Debug, Clone)]
pub enum RouteEntry {
    /// An auto-registered OPTIONS preflight responder.
    Preflight,

    /// A configured handler.
    Handler(Arc<HandlerDescriptor>),
}

/// A route-table construction error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    /// Two descriptors were registered for the same method and path.
    #[error("duplicate route: {method} {path}")]
    Duplicate {
        /// The HTTP method.
        method: Method,
        /// The route path.
        path: String,
    },

    /// A deferred route is missing its owning service id.
    #[error("deferred route {path} has no service id")]
    MissingServiceId {
        /// The route path.
        path: String,
    },

    /// A deferred route is missing its action name.
    #[error("deferred route {path} has no action")]
    MissingAction {
        /// The route path.
        path: String,
    },

    /// A deferred route does not require authorization, so no principal
    /// would be available to open the durable record with.
    #[error("deferred route {path} must require auth")]
    MissingAuth {
        /// The route path.
        path: String,
    },

    /// A deferred route was registered but the gateway has no durable
    /// request service.
    #[error("deferred route {path} requires a durable request service")]
    MissingRequestService {
        /// The route path.
        path: String,
    },
}

/// Immutable mapping from (method, path) to handler descriptors.
///
/// # Example
///
/// ```rust,ignore
/// let routes = RouteTable::builder()
///     .route(Method::POST, "/orders/place", descriptor)
///     .build(true)?;
///
/// assert!(routes.lookup(&Method::POST, "/orders/place").is_some());
/// // OPTIONS preflight is registered automatically for POST paths.
/// assert!(routes.lookup(&Method::OPTIONS, "/orders/place").is_some());
/// ```
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<Method, HashMap<String, RouteEntry>>,
}

impl RouteTable {
    /// Creates a route-table builder.
    #[must_use]
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// Looks up the entry for a method and exact path.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&RouteEntry> {
        self.routes.get(method)?.get(path)
    }

    /// Returns the number of registered entries, preflights included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    /// Returns `true` if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Builder for [`RouteTable`].
#[derive(Default)]
pub struct RouteTableBuilder {
    entries: Vec<(Method, String, HandlerDescriptor)>,
}

impl RouteTableBuilder {
    /// Registers a descriptor at (method, path).
    #[must_use]
    pub fn route(
        mut self,
        method: Method,
        path: impl Into<String>,
        descriptor: HandlerDescriptor,
    ) -> Self {
        self.entries.push((method, path.into(), descriptor));
        self
    }

    /// Validates every descriptor and builds the immutable table.
    ///
    /// `request_service_configured` states whether the hosting gateway was
    /// constructed with a durable request service; deferred routes are
    /// rejected without one.
    ///
    /// An OPTIONS preflight entry is auto-registered for every POST path
    /// that does not already have one.
    pub fn build(self, request_service_configured: bool) -> Result<RouteTable, RouteError> {
        let mut routes: HashMap<Method, HashMap<String, RouteEntry>> = HashMap::new();
        let mut post_paths = Vec::new();

        for (method, path, descriptor) in self.entries {
            if descriptor.deferred {
                if descriptor.service_id.is_none() {
                    return Err(RouteError::MissingServiceId { path });
                }
                if descriptor.action.is_none() {
                    return Err(RouteError::MissingAction { path });
                }
                if !descriptor.requires_auth {
                    return Err(RouteError::MissingAuth { path });
                }
                if !request_service_configured {
                    return Err(RouteError::MissingRequestService { path });
                }
            }

            if method == Method::POST {
                post_paths.push(path.clone());
            }

            let table = routes.entry(method.clone()).or_default();
            if table
                .insert(path.clone(), RouteEntry::Handler(Arc::new(descriptor)))
                .is_some()
            {
                return Err(RouteError::Duplicate { method, path });
            }
        }

        let options = routes.entry(Method::OPTIONS).or_default();
        for path in post_paths {
            options.entry(path).or_insert(RouteEntry::Preflight);
        }

        Ok(RouteTable { routes })
    }
}
