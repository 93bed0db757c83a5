//! The codec contract.
//!
//! A codec converts between a host [`Value`] and one wire representation of
//! one primitive type. There are four roles:
//!
//! | role             | input                      | output                      |
//! |------------------|----------------------------|-----------------------------|
//! | [`TextEncoder`]  | `&Value`                   | text appended to a `String` |
//! | [`TextDecoder`]  | `&str`                     | `Value`                     |
//! | [`BinaryEncoder`]| `Option<&Value>`           | length-prefixed bytes       |
//! | [`BinaryDecoder`]| length-prefixed bytes      | `Option<Value>`             |
//!
//! Binary values are framed by a 4-byte big-endian signed length; `-1` is SQL
//! NULL and carries no payload. Codecs are stateless and shared through
//! [`Arc`] by every connection. A [`CodecProvider`] groups the codecs of one
//! type and picks the set to use for a given context.

pub mod select;

use std::borrow::Cow;
use std::sync::Arc;

use bytes::{Buf, BufMut, BytesMut};
use wirefmt_core::{Error, Result};

use crate::context::Context;
use crate::types::{HostType, PrimitiveType, Value};

pub use select::SettingSelectProvider;

/// Length prefix that marks SQL NULL.
pub const NULL_LENGTH: i32 = -1;

/// Size of the length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Procedure name suffixes a provider's base names are combined with.
const PROC_SUFFIXES: [&str; 4] = ["in", "out", "recv", "send"];

/// Identity every codec declares.
pub trait Codec: Send + Sync {
    /// The wire type handled.
    fn primitive_type(&self) -> PrimitiveType;

    /// The host value type produced or consumed.
    fn host_type(&self) -> HostType;
}

pub trait TextEncoder: Codec {
    /// Append the text form of `value` to `buf`.
    fn encode(&self, buf: &mut String, value: &Value, ctx: &dyn Context) -> Result<()>;
}

pub trait TextDecoder: Codec {
    fn decode(&self, text: &str, ctx: &dyn Context) -> Result<Value>;
}

pub trait BinaryEncoder: Codec {
    /// Write the length prefix and payload of `value`, or the NULL marker.
    fn encode(&self, buf: &mut BytesMut, value: Option<&Value>, ctx: &dyn Context) -> Result<()>;

    /// The exact number of bytes [`encode`](Self::encode) writes for `value`.
    fn length(&self, value: Option<&Value>, ctx: &dyn Context) -> Result<usize>;
}

pub trait BinaryDecoder: Codec {
    /// Read one length-prefixed value, advancing `buf` past it.
    fn decode(&self, buf: &mut &[u8], ctx: &dyn Context) -> Result<Option<Value>>;
}

/// The codecs of one type under one configuration.
///
/// Text roles are always present. Binary roles are absent for
/// configurations that can only be exchanged as text.
#[derive(Clone)]
pub struct CodecSet {
    pub text_encoder: Arc<dyn TextEncoder>,
    pub text_decoder: Arc<dyn TextDecoder>,
    pub binary_encoder: Option<Arc<dyn BinaryEncoder>>,
    pub binary_decoder: Option<Arc<dyn BinaryDecoder>>,
}

impl CodecSet {
    /// A text-only set from one codec implementing both text roles.
    pub fn text<C>(codec: C) -> Self
    where
        C: TextEncoder + TextDecoder + 'static,
    {
        let codec = Arc::new(codec);
        Self {
            text_encoder: codec.clone(),
            text_decoder: codec,
            binary_encoder: None,
            binary_decoder: None,
        }
    }

    /// Add binary roles from one codec implementing both.
    #[must_use]
    pub fn with_binary<C>(mut self, codec: C) -> Self
    where
        C: BinaryEncoder + BinaryDecoder + 'static,
    {
        let codec = Arc::new(codec);
        self.binary_encoder = Some(codec.clone());
        self.binary_decoder = Some(codec);
        self
    }

    pub fn supports_binary(&self) -> bool {
        self.binary_encoder.is_some() && self.binary_decoder.is_some()
    }

    pub fn primitive_type(&self) -> PrimitiveType {
        self.text_decoder.primitive_type()
    }
}

impl std::fmt::Debug for CodecSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecSet")
            .field("type", &self.primitive_type())
            .field("binary", &self.supports_binary())
            .finish()
    }
}

/// Supplies the codecs of a type.
///
/// The registry finds a provider by matching a type's I/O procedure names
/// (`timetz_recv`, ...) against the provider's base names (`timetz_`).
pub trait CodecProvider: Send + Sync {
    /// Procedure name prefixes this provider answers to.
    fn base_names(&self) -> &[&'static str];

    /// The codecs to use under `ctx`.
    fn select(&self, ctx: &dyn Context) -> Result<&CodecSet>;

    /// Whether `proc_name` is one of this provider's I/O procedures.
    fn handles(&self, proc_name: &str) -> bool {
        self.base_names().iter().any(|base| {
            proc_name
                .strip_prefix(base)
                .is_some_and(|suffix| PROC_SUFFIXES.contains(&suffix))
        })
    }

    fn supports_binary(&self, ctx: &dyn Context) -> Result<bool> {
        Ok(self.select(ctx)?.supports_binary())
    }

    /// Error returned when binary codecs are requested but not available.
    fn binary_unsupported(&self, _ctx: &dyn Context) -> Error {
        Error::config(
            "format",
            format!("binary format is not supported by {}", self.base_names().join("/")),
        )
    }

    fn text_encoder(&self, ctx: &dyn Context) -> Result<&dyn TextEncoder> {
        Ok(self.select(ctx)?.text_encoder.as_ref())
    }

    fn text_decoder(&self, ctx: &dyn Context) -> Result<&dyn TextDecoder> {
        Ok(self.select(ctx)?.text_decoder.as_ref())
    }

    fn binary_encoder(&self, ctx: &dyn Context) -> Result<&dyn BinaryEncoder> {
        self.select(ctx)?
            .binary_encoder
            .as_deref()
            .ok_or_else(|| self.binary_unsupported(ctx))
    }

    fn binary_decoder(&self, ctx: &dyn Context) -> Result<&dyn BinaryDecoder> {
        self.select(ctx)?
            .binary_decoder
            .as_deref()
            .ok_or_else(|| self.binary_unsupported(ctx))
    }

    fn encode_text(&self, buf: &mut String, value: &Value, ctx: &dyn Context) -> Result<()> {
        self.text_encoder(ctx)?.encode(buf, value, ctx)
    }

    fn decode_text(&self, text: &str, ctx: &dyn Context) -> Result<Value> {
        self.text_decoder(ctx)?.decode(text, ctx)
    }

    fn encode_binary(
        &self,
        buf: &mut BytesMut,
        value: Option<&Value>,
        ctx: &dyn Context,
    ) -> Result<()> {
        self.binary_encoder(ctx)?.encode(buf, value, ctx)
    }

    fn binary_length(&self, value: Option<&Value>, ctx: &dyn Context) -> Result<usize> {
        self.binary_encoder(ctx)?.length(value, ctx)
    }

    fn decode_binary(&self, buf: &mut &[u8], ctx: &dyn Context) -> Result<Option<Value>> {
        self.binary_decoder(ctx)?.decode(buf, ctx)
    }
}

/// A provider with one codec set regardless of configuration.
#[derive(Debug, Clone)]
pub struct FixedProvider {
    base_names: Vec<&'static str>,
    codecs: CodecSet,
}

impl FixedProvider {
    pub fn new(base_names: &[&'static str], codecs: CodecSet) -> Self {
        Self {
            base_names: base_names.to_vec(),
            codecs,
        }
    }
}

impl CodecProvider for FixedProvider {
    fn base_names(&self) -> &[&'static str] {
        &self.base_names
    }

    fn select(&self, _ctx: &dyn Context) -> Result<&CodecSet> {
        Ok(&self.codecs)
    }
}

/// Binary length of a fixed-size value, NULL included.
pub const fn fixed_length(value: Option<&Value>, payload_size: usize) -> usize {
    match value {
        Some(_) => LENGTH_PREFIX_SIZE + payload_size,
        None => LENGTH_PREFIX_SIZE,
    }
}

/// Read the length prefix of a fixed-size value and split off its payload.
///
/// Returns `None` for SQL NULL, having consumed only the prefix. Any length
/// other than `-1` or `size`, and a buffer too short for what it declares,
/// is a protocol error.
pub fn take_fixed_payload<'b>(
    buf: &mut &'b [u8],
    type_name: &str,
    size: usize,
) -> Result<Option<&'b [u8]>> {
    if buf.len() < LENGTH_PREFIX_SIZE {
        return Err(Error::protocol(format!(
            "truncated {type_name} value: {} bytes, no room for a length prefix",
            buf.len()
        ))
        .with_raw_data(*buf));
    }
    let length = buf.get_i32();
    if length == NULL_LENGTH {
        return Ok(None);
    }

    let expected = i32::try_from(size).unwrap_or(i32::MAX);
    if length != expected {
        tracing::debug!(
            type_name,
            expected,
            actual = length,
            "Rejected binary value with wrong length"
        );
        let declared = usize::try_from(length).map_or(0, |len| len.min(buf.len()));
        return Err(
            Error::invalid_length(type_name, expected, length).with_raw_data(&buf[..declared]),
        );
    }
    if buf.len() < size {
        return Err(Error::protocol(format!(
            "truncated {type_name} value: expected {size} bytes, got {}",
            buf.len()
        ))
        .with_raw_data(*buf));
    }

    let whole: &'b [u8] = buf;
    let (payload, rest) = whole.split_at(size);
    *buf = rest;
    Ok(Some(payload))
}

/// Write the NULL marker.
pub fn put_null(buf: &mut BytesMut) {
    buf.put_i32(NULL_LENGTH);
}

/// Write the length prefix of a fixed-size payload.
pub fn put_length(buf: &mut BytesMut, size: usize) -> Result<()> {
    let length = i32::try_from(size)
        .map_err(|_| Error::protocol(format!("value of {size} bytes exceeds the wire limit")))?;
    buf.put_i32(length);
    Ok(())
}

/// Convert raw text bytes from the wire using the context charset.
pub fn decode_text_bytes<'b>(ctx: &dyn Context, bytes: &'b [u8]) -> Result<Cow<'b, str>> {
    ctx.charset().decode(bytes)
}

/// Encode `value` in binary into a buffer from the context allocator.
///
/// The buffer is sized up front with the encoder's `length`.
pub fn encode_binary_value(
    provider: &dyn CodecProvider,
    value: Option<&Value>,
    ctx: &dyn Context,
) -> Result<BytesMut> {
    let encoder = provider.binary_encoder(ctx)?;
    let length = encoder.length(value, ctx)?;
    let mut buf = ctx.allocator().buffer(length);
    encoder.encode(&mut buf, value, ctx)?;
    debug_assert_eq!(buf.len(), length, "binary length disagrees with encoding");
    tracing::trace!(
        codec = encoder.primitive_type().name(),
        length,
        "Encoded binary value"
    );
    Ok(buf)
}
