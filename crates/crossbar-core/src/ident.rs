//! Restricted identifier tokens.
//!
//! Principal and request ids carried in queue-message headers must match a
//! restricted token shape before they are trusted: lowercase alphanumeric
//! segments joined by `-`, `_` or `.`, at most 1024 characters total.

use std::sync::LazyLock;

use regex::Regex;

static IDENT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-z]+(?:[-_.][0-9a-z]+)*$").expect("identifier-token pattern compiles")
});

/// Maximum accepted token length.
pub const MAX_IDENT_LEN: usize = 1024;

/// Returns `true` if `value` is a well-formed identifier token.
///
/// # Example
///
/// ```
/// use crossbar_core::is_ident_token;
///
/// assert!(is_ident_token("acct-1.user-42"));
/// assert!(!is_ident_token("Not A Token"));
/// assert!(!is_ident_token(""));
/// ```
#[must_use]
pub fn is_ident_token(value: &str) -> bool {
    !value.is_empty() && value.len() <= MAX_IDENT_LEN && IDENT_TOKEN.is_match(value)
}
