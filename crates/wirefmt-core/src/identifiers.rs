//! SQL identifier quoting utilities.
//!
//! Type and namespace names are rendered into diagnostics and generated SQL.
//! Names that the server would fold or reject unquoted are double-quoted;
//! everything else is left bare so common names stay readable.

use std::sync::OnceLock;

use regex::Regex;

/// Identifiers matching this pattern survive the server's case folding unchanged.
const PLAIN_IDENTIFIER: &str = r"^[a-z_][a-z0-9_$]*$";

fn plain_identifier() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(PLAIN_IDENTIFIER).ok())
        .as_ref()
}

/// Quote a SQL identifier using ANSI double-quoting.
///
/// Embedded double-quotes are escaped by doubling them (`"` → `""`).
/// This function is safe against SQL injection for any input string.
///
/// # Examples
///
/// ```
/// use wirefmt_core::quote_ident;
///
/// assert_eq!(quote_ident("users"), "\"users\"");
/// assert_eq!(quote_ident("user\"name"), "\"user\"\"name\"");
/// ```
#[inline]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Does `name` need quoting to be read back verbatim?
///
/// Upper-case letters, punctuation, spaces, a leading digit and the empty
/// string all require quoting.
pub fn needs_quoting(name: &str) -> bool {
    plain_identifier().is_none_or(|pattern| !pattern.is_match(name))
}

/// Quote `name` only when [`needs_quoting`] says so.
///
/// # Examples
///
/// ```
/// use wirefmt_core::quote_if_needed;
///
/// assert_eq!(quote_if_needed("timetz"), "timetz");
/// assert_eq!(quote_if_needed("MyType"), "\"MyType\"");
/// ```
pub fn quote_if_needed(name: &str) -> String {
    if needs_quoting(name) {
        quote_ident(name)
    } else {
        name.to_string()
    }
}
