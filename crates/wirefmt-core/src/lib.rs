//! Core types shared by the wirefmt codec crates.
//!
//! This crate holds the pieces that do not depend on a particular wire
//! protocol:
//!
//! - `Error` and the `Result` alias used by every codec and context call
//! - `QualifiedName`, the namespace-qualified identity of database types
//! - SQL identifier quoting helpers

pub mod error;
pub mod identifiers;
pub mod name;

pub use error::{
    ConfigError, Error, InvalidArgumentError, ProtocolError, Result, TypeError,
};
pub use identifiers::{needs_quoting, quote_ident, quote_if_needed};
pub use name::{CATALOG_NAMESPACE, PUBLIC_NAMESPACE, QualifiedName};
