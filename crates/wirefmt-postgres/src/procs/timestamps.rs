//! `timestamp`: date and time without zone.
//!
//! Binary payload is the local wall clock in microseconds since
//! 2000-01-01T00:00; `i64::MAX` and `i64::MIN` are `infinity` and `-infinity`.

use std::sync::Arc;

use bytes::{Buf, BufMut, BytesMut};
use wirefmt_core::Result;

use super::{
    instant_of, parse_text, timestamp_from_wire, timestamp_infinity, timestamp_to_wire,
    without_zone,
};
use crate::codec::{
    BinaryDecoder, BinaryEncoder, CodecProvider, TextDecoder, TextEncoder, fixed_length,
    put_length, put_null, take_fixed_payload,
};
use crate::context::Context;
use crate::datetime::{Instant, InstantKind};
use crate::types::Value;

const TYPE_NAME: &str = "timestamp";
const PAYLOAD_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampText;

#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampBinary;

codec_identity!(TimestampText, TimestampBinary => Timestamp, Instant);

pub fn provider() -> Arc<dyn CodecProvider> {
    super::datetime_provider("timestamp_", TimestampText, TimestampBinary)
}

impl TextDecoder for TimestampText {
    fn decode(&self, text: &str, ctx: &dyn Context) -> Result<Value> {
        let mut pieces = parse_text(ctx.timestamp_format(), text, TYPE_NAME)?;
        pieces.offset = None;
        Instant::from_pieces(InstantKind::Timestamp, &pieces, None).map(Value::Instant)
    }
}

impl TextEncoder for TimestampText {
    fn encode(&self, buf: &mut String, value: &Value, ctx: &dyn Context) -> Result<()> {
        let instant = without_zone(instant_of(value, TYPE_NAME, InstantKind::Timestamp)?);
        buf.push_str(&ctx.timestamp_format().printer().format(&instant)?);
        Ok(())
    }
}

impl BinaryDecoder for TimestampBinary {
    fn decode(&self, buf: &mut &[u8], _ctx: &dyn Context) -> Result<Option<Value>> {
        let Some(mut payload) = take_fixed_payload(buf, TYPE_NAME, PAYLOAD_SIZE)? else {
            return Ok(None);
        };
        timestamp_from_wire(payload.get_i64(), TYPE_NAME).map(|instant| Some(Value::Instant(instant)))
    }
}

impl BinaryEncoder for TimestampBinary {
    fn encode(&self, buf: &mut BytesMut, value: Option<&Value>, _ctx: &dyn Context) -> Result<()> {
        let Some(value) = value else {
            put_null(buf);
            return Ok(());
        };
        let instant = instant_of(value, TYPE_NAME, InstantKind::Timestamp)?;
        let wire = match timestamp_infinity(&instant) {
            Some(sentinel) => sentinel,
            None => timestamp_to_wire(instant.micros_local(), TYPE_NAME)?,
        };
        put_length(buf, PAYLOAD_SIZE)?;
        buf.put_i64(wire);
        Ok(())
    }

    fn length(&self, value: Option<&Value>, _ctx: &dyn Context) -> Result<usize> {
        Ok(fixed_length(value, PAYLOAD_SIZE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BasicContext;
    use crate::datetime::PG_EPOCH_OFFSET_MICROS;

    fn encode(value: &Value) -> Vec<u8> {
        let ctx = BasicContext::default();
        let mut buf = BytesMut::new();
        BinaryEncoder::encode(&TimestampBinary, &mut buf, Some(value), &ctx).unwrap();
        buf.to_vec()
    }

    #[test]
    fn test_pg_epoch_is_zero() {
        let value = Value::Instant(Instant::ambiguous(
            InstantKind::Timestamp,
            PG_EPOCH_OFFSET_MICROS,
        ));
        assert_eq!(encode(&value), [0, 0, 0, 8, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_infinity_sentinels() {
        let ctx = BasicContext::default();
        for instant in [
            Instant::future(InstantKind::Timestamp),
            Instant::past(InstantKind::Timestamp),
        ] {
            let bytes = encode(&Value::Instant(instant));
            let decoded = BinaryDecoder::decode(&TimestampBinary, &mut &bytes[..], &ctx).unwrap();
            assert_eq!(decoded, Some(Value::Instant(instant)));
        }
        assert_eq!(
            encode(&Value::Instant(Instant::future(InstantKind::Timestamp)))[4..],
            i64::MAX.to_be_bytes()
        );
    }

    #[test]
    fn test_text_round_trip() {
        let ctx = BasicContext::default();
        let value = TextDecoder::decode(&TimestampText, "2024-02-29 13:45:00.25", &ctx).unwrap();
        let mut out = String::new();
        TextEncoder::encode(&TimestampText, &mut out, &value, &ctx).unwrap();
        assert_eq!(out, "2024-02-29 13:45:00.25");

        let bc = TextDecoder::decode(&TimestampText, "0044-03-15 12:00:00 BC", &ctx).unwrap();
        let mut out = String::new();
        TextEncoder::encode(&TimestampText, &mut out, &bc, &ctx).unwrap();
        assert_eq!(out, "0044-03-15 12:00:00 BC");
    }

    #[test]
    fn test_text_infinity() {
        let ctx = BasicContext::default();
        let value = TextDecoder::decode(&TimestampText, "-infinity", &ctx).unwrap();
        assert_eq!(value, Value::Instant(Instant::past(InstantKind::Timestamp)));
    }
}
