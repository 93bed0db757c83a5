//! PostgreSQL type identity and the type registry.
//!
//! This module provides:
//! - OID constants for the built-in types this crate handles
//! - Primitive type tags that codecs declare
//! - The host [`Value`] model codecs produce and consume
//! - A registry keyed by OID and by [`QualifiedName`] that also resolves the
//!   codec provider of each type
//!
//! # Example
//!
//! ```rust,ignore
//! use wirefmt_postgres::types::{TypeRegistry, oid};
//!
//! let registry = TypeRegistry::new();
//! let timetz = registry.get(oid::TIMETZ).unwrap();
//! assert_eq!(timetz.name.to_string(), "timetz");
//! ```

pub mod oid;
pub mod value;

use std::collections::HashMap;
use std::sync::Arc;

use wirefmt_core::QualifiedName;

use crate::codec::CodecProvider;

pub use value::{HostType, Value};

/// Wire-level identity a codec declares it handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Date,
    Time,
    TimeTz,
    Timestamp,
    TimestampTz,
    Money,
}

impl PrimitiveType {
    /// The catalog name of the type.
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveType::Date => "date",
            PrimitiveType::Time => "time",
            PrimitiveType::TimeTz => "timetz",
            PrimitiveType::Timestamp => "timestamp",
            PrimitiveType::TimestampTz => "timestamptz",
            PrimitiveType::Money => "money",
        }
    }

    pub const fn oid(self) -> u32 {
        match self {
            PrimitiveType::Date => oid::DATE,
            PrimitiveType::Time => oid::TIME,
            PrimitiveType::TimeTz => oid::TIMETZ,
            PrimitiveType::Timestamp => oid::TIMESTAMP,
            PrimitiveType::TimestampTz => oid::TIMESTAMPTZ,
            PrimitiveType::Money => oid::MONEY,
        }
    }
}

/// Category of a PostgreSQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    /// Date/time types (date, time, timetz, timestamp, timestamptz)
    DateTime,
    /// Numeric types (money)
    Numeric,
    /// Array types
    Array,
    /// Unknown or custom types
    Unknown,
}

/// The four I/O procedure names the server associates with a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcNames {
    pub input: String,
    pub output: String,
    pub receive: String,
    pub send: String,
}

impl ProcNames {
    /// Names following the server convention `<prefix>in`, `<prefix>out`, ...
    pub fn from_prefix(prefix: &str) -> Self {
        Self {
            input: format!("{prefix}in"),
            output: format!("{prefix}out"),
            receive: format!("{prefix}recv"),
            send: format!("{prefix}send"),
        }
    }
}

/// Information about a PostgreSQL type.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    /// The type's OID
    pub oid: u32,
    /// The type's namespace-qualified name
    pub name: QualifiedName,
    /// OID of the array type for this element type (if any)
    pub array_oid: Option<u32>,
    /// OID of the element type (if this is an array type)
    pub element_oid: Option<u32>,
    /// Type category
    pub category: TypeCategory,
    /// Size in bytes (-1 for variable)
    pub size: i16,
    /// I/O procedures used to find the type's codec provider
    pub procs: ProcNames,
}

impl TypeInfo {
    /// Create type info for a scalar type whose procs share `proc_prefix`.
    pub fn new(
        oid: u32,
        name: QualifiedName,
        category: TypeCategory,
        size: i16,
        proc_prefix: &str,
    ) -> Self {
        Self {
            oid,
            name,
            array_oid: oid::array_oid(oid),
            element_oid: None,
            category,
            size,
            procs: ProcNames::from_prefix(proc_prefix),
        }
    }

    /// Create type info for an array type.
    pub fn array(oid: u32, name: QualifiedName, element_oid: u32) -> Self {
        Self {
            oid,
            name,
            array_oid: None,
            element_oid: Some(element_oid),
            category: TypeCategory::Array,
            size: -1,
            procs: ProcNames::from_prefix("array_"),
        }
    }
}

/// Registry of PostgreSQL types and their codec providers.
///
/// Types are found by OID or qualified name. A type's provider is the
/// registered provider whose base names match the type's receive procedure.
pub struct TypeRegistry {
    by_oid: HashMap<u32, TypeInfo>,
    by_name: HashMap<QualifiedName, u32>,
    providers: Vec<Arc<dyn CodecProvider>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.by_oid.len())
            .field("providers", &self.providers.len())
            .finish()
    }
}

impl TypeRegistry {
    /// Create a new registry with all built-in types and providers.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for provider in crate::procs::builtin_providers() {
            registry.register_provider(provider);
        }
        registry.register_builtins();
        registry
    }

    /// Create a registry with no types or providers.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            by_oid: HashMap::new(),
            by_name: HashMap::new(),
            providers: Vec::new(),
        }
    }

    /// Look up type info by OID.
    #[must_use]
    pub fn get(&self, oid: u32) -> Option<&TypeInfo> {
        self.by_oid.get(&oid)
    }

    /// Look up type info by qualified name.
    #[must_use]
    pub fn by_name(&self, name: &QualifiedName) -> Option<&TypeInfo> {
        self.by_name.get(name).and_then(|oid| self.by_oid.get(oid))
    }

    /// Get the type category for an OID.
    #[must_use]
    pub fn category(&self, oid: u32) -> TypeCategory {
        self.get(oid).map_or(TypeCategory::Unknown, |t| t.category)
    }

    /// Register (or replace) a type.
    pub fn register(&mut self, info: TypeInfo) {
        if let Some(previous) = self.by_oid.get(&info.oid) {
            self.by_name.remove(&previous.name);
        }
        self.by_name.insert(info.name.clone(), info.oid);
        self.by_oid.insert(info.oid, info);
    }

    /// Register a codec provider. Later registrations win over earlier ones.
    pub fn register_provider(&mut self, provider: Arc<dyn CodecProvider>) {
        self.providers.push(provider);
    }

    /// Find the provider answering to a procedure name.
    pub fn provider_for_proc(&self, proc_name: &str) -> Option<&Arc<dyn CodecProvider>> {
        self.providers.iter().rev().find(|p| p.handles(proc_name))
    }

    /// Find the codec provider of a registered type.
    pub fn provider(&self, oid: u32) -> Option<&Arc<dyn CodecProvider>> {
        let info = self.get(oid)?;
        let provider = self.provider_for_proc(&info.procs.receive);
        if provider.is_none() {
            tracing::trace!(oid, name = %info.name, "No codec provider for type");
        }
        provider
    }

    fn register_builtins(&mut self) {
        let scalars = [
            (oid::DATE, "date", TypeCategory::DateTime, 4, "date_"),
            (oid::TIME, "time", TypeCategory::DateTime, 8, "time_"),
            (oid::TIMETZ, "timetz", TypeCategory::DateTime, 12, "timetz_"),
            (oid::TIMESTAMP, "timestamp", TypeCategory::DateTime, 8, "timestamp_"),
            (oid::TIMESTAMPTZ, "timestamptz", TypeCategory::DateTime, 8, "timestamptz_"),
            (oid::MONEY, "money", TypeCategory::Numeric, 8, "cash_"),
        ];
        for (oid, name, category, size, prefix) in scalars {
            self.register(TypeInfo::new(
                oid,
                QualifiedName::catalog(name),
                category,
                size,
                prefix,
            ));
        }

        let arrays = [
            (oid::DATE_ARRAY, "_date", oid::DATE),
            (oid::TIME_ARRAY, "_time", oid::TIME),
            (oid::TIMETZ_ARRAY, "_timetz", oid::TIMETZ),
            (oid::TIMESTAMP_ARRAY, "_timestamp", oid::TIMESTAMP),
            (oid::TIMESTAMPTZ_ARRAY, "_timestamptz", oid::TIMESTAMPTZ),
            (oid::MONEY_ARRAY, "_money", oid::MONEY),
        ];
        for (oid, name, element) in arrays {
            self.register(TypeInfo::array(oid, QualifiedName::catalog(name), element));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_registry_creation() {
        let registry = TypeRegistry::new();

        assert!(registry.get(oid::TIMETZ).is_some());
        assert!(registry.get(oid::DATE).is_some());
        assert!(
            registry
                .by_name(&QualifiedName::catalog("timestamptz"))
                .is_some()
        );
        assert!(registry.by_name(&QualifiedName::new("public", "timetz")).is_none());
    }

    #[test]
    fn test_type_categories() {
        let registry = TypeRegistry::new();

        assert_eq!(registry.category(oid::TIME), TypeCategory::DateTime);
        assert_eq!(registry.category(oid::MONEY), TypeCategory::Numeric);
        assert_eq!(registry.category(oid::DATE_ARRAY), TypeCategory::Array);
        assert_eq!(registry.category(999_999), TypeCategory::Unknown);
    }

    #[test]
    fn test_array_types() {
        let registry = TypeRegistry::new();

        let timetz = registry.get(oid::TIMETZ).unwrap();
        assert_eq!(timetz.array_oid, Some(oid::TIMETZ_ARRAY));

        let timetz_array = registry.get(oid::TIMETZ_ARRAY).unwrap();
        assert_eq!(timetz_array.element_oid, Some(oid::TIMETZ));
    }

    #[test]
    fn test_every_scalar_has_a_provider() {
        let registry = TypeRegistry::new();
        for primitive in [
            PrimitiveType::Date,
            PrimitiveType::Time,
            PrimitiveType::TimeTz,
            PrimitiveType::Timestamp,
            PrimitiveType::TimestampTz,
            PrimitiveType::Money,
        ] {
            assert!(
                registry.provider(primitive.oid()).is_some(),
                "no provider for {}",
                primitive.name()
            );
        }
        assert!(registry.provider(oid::DATE_ARRAY).is_none());
    }

    #[test]
    fn test_prefix_does_not_capture_longer_names() {
        let registry = TypeRegistry::new();
        let time = registry.provider_for_proc("time_recv").unwrap();
        let timetz = registry.provider_for_proc("timetz_recv").unwrap();
        assert!(!Arc::ptr_eq(time, timetz));
        assert!(!time.handles("timetz_recv"));
    }

    #[test]
    fn test_reregistering_replaces_name() {
        let mut registry = TypeRegistry::empty();
        registry.register(TypeInfo::new(
            90_001,
            QualifiedName::new("app", "old_name"),
            TypeCategory::Unknown,
            -1,
            "old_",
        ));
        registry.register(TypeInfo::new(
            90_001,
            QualifiedName::new("app", "new_name"),
            TypeCategory::Unknown,
            -1,
            "new_",
        ));
        assert!(registry.by_name(&QualifiedName::new("app", "old_name")).is_none());
        assert_eq!(
            registry
                .by_name(&QualifiedName::new("app", "new_name"))
                .map(|t| t.oid),
            Some(90_001)
        );
    }
}
