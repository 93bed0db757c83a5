//! `timestamptz`: an absolute moment, stored as UTC.
//!
//! Binary payload is UTC microseconds since 2000-01-01T00:00Z. Decoded values
//! carry the context zone; values without a zone are read in it.

use std::sync::Arc;

use bytes::{Buf, BufMut, BytesMut};
use chrono::{FixedOffset, Offset, Utc};
use wirefmt_core::Result;

use super::{instant_of, parse_text, timestamp_from_wire, timestamp_infinity, timestamp_to_wire};
use crate::codec::{
    BinaryDecoder, BinaryEncoder, CodecProvider, TextDecoder, TextEncoder, fixed_length,
    put_length, put_null, take_fixed_payload,
};
use crate::context::Context;
use crate::datetime::{Instant, InstantKind};
use crate::types::Value;

const TYPE_NAME: &str = "timestamptz";
const PAYLOAD_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampTzText;

#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampTzBinary;

codec_identity!(TimestampTzText, TimestampTzBinary => TimestampTz, Instant);

pub fn provider() -> Arc<dyn CodecProvider> {
    super::datetime_provider("timestamptz_", TimestampTzText, TimestampTzBinary)
}

fn utc() -> FixedOffset {
    Utc.fix()
}

impl TextDecoder for TimestampTzText {
    fn decode(&self, text: &str, ctx: &dyn Context) -> Result<Value> {
        let pieces = parse_text(ctx.timestamp_format(), text, TYPE_NAME)?;
        let zone = ctx.time_zone();
        Instant::from_pieces(InstantKind::Timestamp, &pieces, Some(zone))?
            .switch_zone(zone)
            .map(Value::Instant)
    }
}

impl TextEncoder for TimestampTzText {
    fn encode(&self, buf: &mut String, value: &Value, ctx: &dyn Context) -> Result<()> {
        let instant =
            instant_of(value, TYPE_NAME, InstantKind::Timestamp)?.assume_zone(ctx.time_zone());
        buf.push_str(&ctx.timestamp_format().printer().format(&instant)?);
        Ok(())
    }
}

impl BinaryDecoder for TimestampTzBinary {
    fn decode(&self, buf: &mut &[u8], ctx: &dyn Context) -> Result<Option<Value>> {
        let Some(mut payload) = take_fixed_payload(buf, TYPE_NAME, PAYLOAD_SIZE)? else {
            return Ok(None);
        };
        let instant = timestamp_from_wire(payload.get_i64(), TYPE_NAME)?
            .assume_zone(utc())
            .switch_zone(ctx.time_zone())?;
        Ok(Some(Value::Instant(instant)))
    }
}

impl BinaryEncoder for TimestampTzBinary {
    fn encode(&self, buf: &mut BytesMut, value: Option<&Value>, ctx: &dyn Context) -> Result<()> {
        let Some(value) = value else {
            put_null(buf);
            return Ok(());
        };
        let instant = instant_of(value, TYPE_NAME, InstantKind::Timestamp)?;
        let wire = match timestamp_infinity(&instant) {
            Some(sentinel) => sentinel,
            None => timestamp_to_wire(instant.micros_utc(ctx.time_zone())?, TYPE_NAME)?,
        };
        put_length(buf, PAYLOAD_SIZE)?;
        buf.put_i64(wire);
        Ok(())
    }

    fn length(&self, value: Option<&Value>, _ctx: &dyn Context) -> Result<usize> {
        Ok(fixed_length(value, PAYLOAD_SIZE))
    }
}
