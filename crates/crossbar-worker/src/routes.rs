//! Message-type descriptors.
//!
//! Each queue-message type maps to a [`MessageDescriptor`]: the schema its
//! content must satisfy, the fault table classifying handler failures, and
//! the bound business method to invoke. The table is built at startup from
//! the method registry; no name lookup happens per message.

use std::collections::HashMap;

use crossbar_core::{BoundMethod, FaultTable, Schema};

/// Static configuration for one message type.
pub struct MessageDescriptor {
    /// Schema the message content must satisfy, if declared.
    pub request_schema: Option<Schema>,

    /// Mapping from business-error messages to caller-visible codes; an
    /// explicit `None` entry marks the failure poison (delete, no retry).
    pub fault_table: Option<FaultTable>,

    /// The bound business method.
    pub method: BoundMethod,
}

impl MessageDescriptor {
    /// Creates a descriptor for a bound method.
    #[must_use]
    pub fn new(method: BoundMethod) -> Self {
        Self {
            request_schema: None,
            fault_table: None,
            method,
        }
    }

    /// Declares the content schema.
    #[must_use]
    pub fn with_request_schema(mut self, schema: Schema) -> Self {
        self.request_schema = Some(schema);
        self
    }

    /// Declares the fault table.
    #[must_use]
    pub fn with_fault_table(mut self, table: FaultTable) -> Self {
        self.fault_table = Some(table);
        self
    }
}

impl std::fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageDescriptor")
            .field("request_schema", &self.request_schema.is_some())
            .field("fault_table", &self.fault_table.is_some())
            .finish()
    }
}

/// Immutable mapping from message type to descriptor.
#[derive(Debug, Default)]
pub struct MessageRoutes {
    routes: HashMap<String, MessageDescriptor>,
}

impl MessageRoutes {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Registers a descriptor for a message type.
    #[must_use]
    pub fn route(mut self, message_type: impl Into<String>, descriptor: MessageDescriptor) -> Self {
        self.routes.insert(message_type.into(), descriptor);
        self
    }

    /// Looks up the descriptor for a message type.
    #[must_use]
    pub fn lookup(&self, message_type: &str) -> Option<&MessageDescriptor> {
        self.routes.get(message_type)
    }

    /// Returns the number of registered message types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no message types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
