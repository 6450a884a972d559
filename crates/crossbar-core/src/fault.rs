//! Fault codes and fault resolution.
//!
//! Every handled response carries an application-level outcome string (a
//! *fault code*) distinct from the transport status. Business failures are
//! mapped onto the closed set in [`codes`] through a per-handler
//! [`FaultTable`]; the mapping algorithm in [`resolve_fault`] is applied
//! identically by the HTTP gateway and the queue worker.

use std::collections::HashMap;

/// The caller-visible outcome codes owned by this layer.
///
/// Handler fault tables may additionally surface custom domain codes; the
/// constants here are the codes the substrate itself produces.
pub mod codes {
    /// Successful completion.
    pub const OK: &str = "ok";

    /// Malformed input: unknown route, unparseable body, failed request
    /// schema.
    pub const INVALID_REQUEST: &str = "invalid-request";

    /// Authentication or authorization rejection.
    pub const NOT_AUTHORIZED: &str = "not-authorized";

    /// Unmapped handler failure or response-schema violation.
    pub const INTERNAL_ERROR: &str = "internal-error";
}

/// A handler's mapping from business-error messages to caller-visible codes.
///
/// - An entry of `Some(code)` maps the error message to that code.
/// - An entry of `None` passes the error message through verbatim as the
///   code.
/// - A missing entry (or a missing table) resolves to
///   [`codes::INTERNAL_ERROR`].
pub type FaultTable = HashMap<String, Option<String>>;

/// Resolves a caught business error's message to a caller-visible code.
///
/// This is a pure function; both transports call it with the failing
/// handler's declared fault table.
///
/// # Example
///
/// ```
/// use crossbar_core::fault::{resolve_fault, FaultTable};
///
/// let mut table = FaultTable::new();
/// table.insert("order-missing".to_string(), Some("not-found".to_string()));
/// table.insert("out-of-stock".to_string(), None);
///
/// assert_eq!(resolve_fault("order-missing", Some(&table)), "not-found");
/// assert_eq!(resolve_fault("out-of-stock", Some(&table)), "out-of-stock");
/// assert_eq!(resolve_fault("anything-else", Some(&table)), "internal-error");
/// assert_eq!(resolve_fault("anything-else", None), "internal-error");
/// ```
#[must_use]
pub fn resolve_fault(message: &str, table: Option<&FaultTable>) -> String {
    let Some(table) = table else {
        return codes::INTERNAL_ERROR.to_string();
    };

    match table.get(message) {
        None => codes::INTERNAL_ERROR.to_string(),
        Some(None) => message.to_string(),
        Some(Some(code)) => code.clone(),
    }
}

/// Returns `true` if the handler's fault table explicitly marks the message
/// as non-retriable (an entry of `None`).
///
/// The queue worker uses this to classify a handler failure as poison
/// (delete without retry) rather than retryable.
#[must_use]
pub fn is_poison(message: &str, table: Option<&FaultTable>) -> bool {
    matches!(table.and_then(|t| t.get(message)), Some(None))
}
