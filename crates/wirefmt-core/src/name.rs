//! Namespace-qualified names of database types and objects.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::identifiers::quote_if_needed;

/// Namespace holding the server's built-in types.
pub const CATALOG_NAMESPACE: &str = "pg_catalog";

/// Default namespace for user objects.
pub const PUBLIC_NAMESPACE: &str = "public";

/// Two-part identity of a database type: `namespace.local_name`.
///
/// Equality and hashing cover both parts. Values are immutable once built.
///
/// # Examples
///
/// ```
/// use wirefmt_core::QualifiedName;
///
/// let name = QualifiedName::new("public", "foo");
/// assert_eq!(name.to_string_with(true), "foo");
/// assert_eq!(name.to_string_with(false), "public.foo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    namespace: String,
    local_name: String,
}

impl QualifiedName {
    /// Create a name from parts that are known to be present.
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }

    /// Create a name from parts that may be absent, e.g. nullable catalog columns.
    ///
    /// Fails with [`Error::InvalidArgument`] when either part is missing.
    pub fn from_parts(namespace: Option<&str>, local_name: Option<&str>) -> Result<Self> {
        let namespace =
            namespace.ok_or_else(|| Error::invalid_argument("namespace", "must not be absent"))?;
        let local_name = local_name
            .ok_or_else(|| Error::invalid_argument("local_name", "must not be absent"))?;
        Ok(Self::new(namespace, local_name))
    }

    /// A name in the built-in catalog namespace.
    pub fn catalog(local_name: impl Into<String>) -> Self {
        Self::new(CATALOG_NAMESPACE, local_name)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Is the namespace one that is searched by default (`pg_catalog` or `public`)?
    pub fn is_common_namespace(&self) -> bool {
        self.namespace == CATALOG_NAMESPACE || self.namespace == PUBLIC_NAMESPACE
    }

    /// Render the name, quoting each part only when required.
    ///
    /// With `elide_common_namespaces`, names in `pg_catalog` or `public`
    /// render as the local name alone.
    pub fn to_string_with(&self, elide_common_namespaces: bool) -> String {
        if elide_common_namespaces && self.is_common_namespace() {
            return quote_if_needed(&self.local_name);
        }
        format!(
            "{}.{}",
            quote_if_needed(&self.namespace),
            quote_if_needed(&self.local_name)
        )
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(true))
    }
}

impl FromStr for QualifiedName {
    type Err = Error;

    /// Parse `name`, `ns.name` or quoted forms such as `"My Schema"."T"`.
    ///
    /// Unquoted parts are folded to lower case like the server does. A bare
    /// name lands in the `public` namespace.
    fn from_str(s: &str) -> Result<Self> {
        let parts = split_identifier_parts(s)?;
        match parts.as_slice() {
            [local] => Ok(Self::new(PUBLIC_NAMESPACE, local.clone())),
            [namespace, local] => Ok(Self::new(namespace.clone(), local.clone())),
            _ => Err(Error::invalid_argument(
                "qualified_name",
                format!("expected at most two parts in '{s}'"),
            )),
        }
    }
}

/// Split a dotted identifier into its parts, honouring double quotes.
fn split_identifier_parts(s: &str) -> Result<Vec<String>> {
    let malformed = || Error::invalid_argument("qualified_name", format!("malformed name '{s}'"));

    let mut parts = Vec::new();
    let mut chars = s.chars().peekable();

    loop {
        let mut part = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            loop {
                match chars.next() {
                    Some('"') if chars.peek() == Some(&'"') => {
                        chars.next();
                        part.push('"');
                    }
                    Some('"') => break,
                    Some(c) => part.push(c),
                    None => return Err(malformed()),
                }
            }
            if part.is_empty() {
                return Err(malformed());
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                if c == '"' {
                    return Err(malformed());
                }
                part.extend(c.to_lowercase());
                chars.next();
            }
            if part.is_empty() {
                return Err(malformed());
            }
        }
        parts.push(part);

        match chars.next() {
            None => return Ok(parts),
            Some('.') => {}
            Some(_) => return Err(malformed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(name: &QualifiedName) -> u64 {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_equal_names_hash_equal() {
        let a = QualifiedName::new("myschema", "foo");
        let b = QualifiedName::new(String::from("myschema"), String::from("foo"));
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, QualifiedName::new("other", "foo"));
        assert_ne!(a, QualifiedName::new("myschema", "bar"));
    }

    #[test]
    fn test_common_namespaces_elided() {
        assert_eq!(QualifiedName::new("public", "foo").to_string_with(true), "foo");
        assert_eq!(QualifiedName::catalog("timetz").to_string_with(true), "timetz");
        assert_eq!(QualifiedName::new("myschema", "foo").to_string_with(true), "myschema.foo");
    }

    #[test]
    fn test_namespace_kept_when_not_eliding() {
        assert_eq!(QualifiedName::new("public", "foo").to_string_with(false), "public.foo");
        assert_eq!(
            QualifiedName::catalog("int4").to_string_with(false),
            "pg_catalog.int4"
        );
    }

    #[test]
    fn test_parts_quoted_when_needed() {
        let name = QualifiedName::new("My Schema", "Point");
        assert_eq!(name.to_string_with(true), "\"My Schema\".\"Point\"");
        let name = QualifiedName::new("public", "Point");
        assert_eq!(name.to_string(), "\"Point\"");
    }

    #[test]
    fn test_from_parts_rejects_absent() {
        let err = QualifiedName::from_parts(None, Some("foo")).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref e) if e.argument == "namespace"));

        let err = QualifiedName::from_parts(Some("public"), None).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref e) if e.argument == "local_name"));

        let name = QualifiedName::from_parts(Some("public"), Some("foo")).unwrap();
        assert_eq!(name, QualifiedName::new("public", "foo"));
    }

    #[test]
    fn test_parse_forms() {
        let name: QualifiedName = "foo".parse().unwrap();
        assert_eq!(name, QualifiedName::new("public", "foo"));

        let name: QualifiedName = "MySchema.Foo".parse().unwrap();
        assert_eq!(name, QualifiedName::new("myschema", "foo"));

        let name: QualifiedName = "\"My Schema\".\"a\"\"b\"".parse().unwrap();
        assert_eq!(name, QualifiedName::new("My Schema", "a\"b"));

        let name: QualifiedName = "\"x.y\".z".parse().unwrap();
        assert_eq!(name, QualifiedName::new("x.y", "z"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["", "a.", ".a", "a.b.c", "\"open", "a\"b", "\"\".x", "\"a\"b"] {
            assert!(input.parse::<QualifiedName>().is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn test_render_then_parse_is_identity() {
        for name in [
            QualifiedName::new("myschema", "foo"),
            QualifiedName::new("My Schema", "Mixed\"Case"),
            QualifiedName::new("public", "bar"),
        ] {
            let parsed: QualifiedName = name.to_string_with(false).parse().unwrap();
            assert_eq!(parsed, name);
        }
    }
}
