//! Request-body acquisition and parsing.
//!
//! Bodies are carried only by POST routes. A
//! `application/x-www-form-urlencoded` body is decoded as flat key/value
//! pairs in wire order (plus-as-space, percent-decoding per pair, no
//! nesting); anything else is parsed as JSON. An empty body yields no
//! value.

use serde_json::{Map, Value};
use thiserror::Error;

/// Content type that selects form decoding.
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// A request body that could not be parsed.
#[derive(Debug, Error)]
pub enum BodyError {
    /// The body did not parse as JSON.
    #[error("cannot parse body as JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The body did not decode as form pairs.
    #[error("cannot decode form body: {0}")]
    Form(#[from] serde_urlencoded::de::Error),
}

/// Parses a request body per its content type.
///
/// Returns `Ok(None)` for an empty body. Form bodies decode to a flat JSON
/// object of string values; duplicate keys overwrite in wire order, and a
/// key without `=` gets an empty value.
///
/// # Example
///
/// ```
/// use crossbar_gateway::parse_request_body;
/// use serde_json::json;
///
/// let body = parse_request_body(
///     Some("application/x-www-form-urlencoded"),
///     b"item=book&note=hello+world",
/// )
/// .unwrap();
/// assert_eq!(body, Some(json!({"item": "book", "note": "hello world"})));
///
/// let body = parse_request_body(Some("application/json"), br#"{"n": 1}"#).unwrap();
/// assert_eq!(body, Some(json!({"n": 1})));
///
/// assert_eq!(parse_request_body(None, b"").unwrap(), None);
/// ```
pub fn parse_request_body(
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<Option<Value>, BodyError> {
    if bytes.is_empty() {
        return Ok(None);
    }

    let is_form = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim() == FORM_URLENCODED)
        .unwrap_or(false);

    if is_form {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(bytes)?;

        let mut object = Map::new();
        for (key, value) in pairs {
            object.insert(key, Value::String(value));
        }

        Ok(Some(Value::Object(object)))
    } else {
        Ok(Some(serde_json::from_slice(bytes)?))
    }
}
