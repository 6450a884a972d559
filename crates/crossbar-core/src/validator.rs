//! Schema-validator seam.
//!
//! The validation algorithm is external; the substrate only hands it a
//! declared schema, a value, and a root path, and acts on the returned
//! error list.

use serde_json::Value;

/// A declared request or response schema.
///
/// Schemas are data, not code; their interpretation belongs to the
/// validator implementation.
pub type Schema = Value;

/// Validates values against declared schemas.
///
/// Returns an ordered list of path-prefixed, human-readable error strings;
/// an empty list means the value conforms. Validation is synchronous and
/// must not block.
pub trait SchemaValidator: Send + Sync {
    /// Validates `value` against `schema`, prefixing error paths with
    /// `root` (e.g. `"body"`, `"response"`, `"content"`).
    ///
    /// An absent value is passed as `None` and validated as such; whether
    /// that conforms is the schema's decision.
    fn validate(&self, schema: &Schema, value: Option<&Value>, root: &str) -> Vec<String>;
}
