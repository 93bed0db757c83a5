//! PostgreSQL value codecs for wirefmt.
//!
//! `wirefmt-postgres` is the **value-serialization core** of a PostgreSQL
//! wire-protocol client. It converts host values to and from the server's
//! text and binary representations and carries the per-connection
//! configuration those conversions depend on.
//!
//! # Role In The Architecture
//!
//! - Defines the codec contract the request layer calls for every parameter
//!   and result column
//! - Provides the codec context: time zone, charset, locale formats, settings
//! - Implements the built-in temporal and `money` codecs
//!
//! Transport, authentication and statement execution live elsewhere; they
//! reach this crate through [`Context`], [`TypeRegistry`] and the
//! [`RequestExecutor`] trait.
//!
//! # Type System
//!
//! The `types` module maps OIDs and qualified names to [`TypeInfo`], and
//! each type to the [`CodecProvider`] answering to its I/O procedures.
//! Providers may pick different codecs per call from a context setting; see
//! [`SettingSelectProvider`].
//!
//! # Example
//!
//! ```rust,ignore
//! use wirefmt_postgres::{BasicContext, ContextConfig, ContextDecorator, Zone, types::oid};
//!
//! let mut ctx = BasicContext::new(ContextConfig::new().time_zone("+01:00"))?;
//! let timetz = ctx.registry().provider(oid::TIMETZ).unwrap().clone();
//!
//! let value = timetz.decode_text("12:30:00", &ctx)?;
//! let utc = ContextDecorator::new(&ctx).with_zone(Zone::utc());
//! let bytes = wirefmt_postgres::codec::encode_binary_value(timetz.as_ref(), Some(&value), &utc)?;
//! ```

pub mod codec;
pub mod config;
pub mod context;
pub mod datetime;
pub mod procs;
pub mod types;

pub use codec::{
    BinaryDecoder, BinaryEncoder, Codec, CodecProvider, CodecSet, FixedProvider,
    SettingSelectProvider, TextDecoder, TextEncoder,
};
pub use config::ContextConfig;
pub use context::{
    BasicContext, BufferAllocator, Charset, Context, ContextDecorator, DateTimeEncoding,
    FIELD_DATETIME_FORMAT, HeapAllocator, KeyData, NumberFormat, RequestExecutor, ServerInfo,
    ServerVersion, Setting,
};
pub use datetime::{Instant, InstantKind, Zone};
pub use types::{HostType, PrimitiveType, TypeCategory, TypeInfo, TypeRegistry, Value};
pub use wirefmt_core::{Error, QualifiedName, Result};
