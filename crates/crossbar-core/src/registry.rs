//! Method registry: named business methods bound to callable entries.
//!
//! Route tables and message tables refer to business logic as
//! `instance.method` names. The registry resolves those names to
//! [`BoundMethod`] callables exactly once, when the tables are built, so no
//! string lookup happens at request time.
//!
//! # Example
//!
//! ```
//! use crossbar_core::{ExecutionContext, HandlerError, MethodRegistry};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct PlaceOrder {
//!     item: String,
//! }
//!
//! #[derive(Serialize)]
//! struct Placed {
//!     order_id: String,
//! }
//!
//! async fn place_order(
//!     _ctx: ExecutionContext,
//!     req: PlaceOrder,
//! ) -> Result<Option<Placed>, HandlerError> {
//!     Ok(Some(Placed {
//!         order_id: format!("order-{}", req.item),
//!     }))
//! }
//!
//! let mut registry = MethodRegistry::new();
//! registry.register("orders", "place", place_order);
//! assert!(registry.resolve("orders", "place").is_some());
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::context::ExecutionContext;
use crate::error::HandlerError;
use crate::fault::codes;

/// Boxed future returned by a bound method.
pub type MethodFuture = Pin<Box<dyn Future<Output = Result<Option<Value>, HandlerError>> + Send>>;

/// A business method bound to a callable entry.
///
/// `None` payloads model bodyless invocations; a `None` result models a
/// method that produced no value (in deferred mode this leaves completion
/// to a later actor).
pub type BoundMethod = Arc<dyn Fn(ExecutionContext, Option<Value>) -> MethodFuture + Send + Sync>;

/// Registry mapping `instance.method` names to bound callables.
///
/// Populated at startup; the gateway's route-table builder and the
/// worker's message-table builder resolve from it once and hold the
/// resulting [`BoundMethod`]s directly.
#[derive(Default)]
pub struct MethodRegistry {
    methods: HashMap<(String, String), BoundMethod>,
}

impl MethodRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    /// Registers a typed method under `instance.method`.
    ///
    /// The payload is deserialized into `Req` (an absent payload
    /// deserializes from JSON null) and the response serialized from `Res`.
    /// A payload that does not match `Req` after the declared request
    /// schema passed is an internal fault, not a caller error.
    pub fn register<Req, Res, F, Fut>(&mut self, instance: &str, method: &str, handler: F)
    where
        Req: DeserializeOwned + Send + 'static,
        Res: Serialize + Send + 'static,
        F: Fn(ExecutionContext, Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Res>, HandlerError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let bound: BoundMethod = Arc::new(move |ctx: ExecutionContext, payload: Option<Value>| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let request: Req = serde_json::from_value(payload.unwrap_or(Value::Null))
                    .map_err(|e| HandlerError::with_source(codes::INTERNAL_ERROR, e))?;

                let response = handler(ctx, request).await?;

                match response {
                    None => Ok(None),
                    Some(value) => serde_json::to_value(value)
                        .map(Some)
                        .map_err(|e| HandlerError::with_source(codes::INTERNAL_ERROR, e)),
                }
            })
        });

        self.insert(instance, method, bound);
    }

    /// Registers a method that works on raw JSON values.
    ///
    /// Useful when the payload shape is dynamic or the method forwards the
    /// value unchanged.
    pub fn register_value<F, Fut>(&mut self, instance: &str, method: &str, handler: F)
    where
        F: Fn(ExecutionContext, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>, HandlerError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let bound: BoundMethod = Arc::new(move |ctx, payload| {
            let handler = Arc::clone(&handler);
            Box::pin(async move { handler(ctx, payload).await })
        });

        self.insert(instance, method, bound);
    }

    fn insert(&mut self, instance: &str, method: &str, bound: BoundMethod) {
        self.methods
            .insert((instance.to_string(), method.to_string()), bound);
    }

    /// Resolves `instance.method` to its bound callable.
    #[must_use]
    pub fn resolve(&self, instance: &str, method: &str) -> Option<BoundMethod> {
        self.methods
            .get(&(instance.to_string(), method.to_string()))
            .map(Arc::clone)
    }

    /// Returns the number of registered methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns `true` if no methods are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl std::fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}
