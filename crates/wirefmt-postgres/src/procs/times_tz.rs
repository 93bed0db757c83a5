//! `timetz`: time of day with a UTC offset.
//!
//! Binary payload is 12 bytes: microseconds since local midnight (`i64`)
//! followed by the zone offset in seconds *west* of UTC (`i32`), the
//! negation of the usual offset east.

use std::sync::Arc;

use bytes::{Buf, BufMut, BytesMut};
use chrono::FixedOffset;
use wirefmt_core::{Error, Result};

use super::{instant_of, parse_text};
use crate::codec::{
    BinaryDecoder, BinaryEncoder, CodecProvider, TextDecoder, TextEncoder, fixed_length,
    put_length, put_null, take_fixed_payload,
};
use crate::context::Context;
use crate::datetime::{Instant, InstantKind, MICROS_PER_DAY};
use crate::types::Value;

const TYPE_NAME: &str = "timetz";
const PAYLOAD_SIZE: usize = 12;

/// Text codec through the context time format.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeTzText;

/// Binary codec for integer-datetime servers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeTzBinary;

codec_identity!(TimeTzText, TimeTzBinary => TimeTz, Instant);

pub fn provider() -> Arc<dyn CodecProvider> {
    super::datetime_provider("timetz_", TimeTzText, TimeTzBinary)
}

impl TextDecoder for TimeTzText {
    fn decode(&self, text: &str, ctx: &dyn Context) -> Result<Value> {
        let pieces = parse_text(ctx.time_format(), text, TYPE_NAME)?;
        Instant::from_pieces(InstantKind::Time, &pieces, Some(ctx.time_zone())).map(Value::Instant)
    }
}

impl TextEncoder for TimeTzText {
    fn encode(&self, buf: &mut String, value: &Value, ctx: &dyn Context) -> Result<()> {
        let instant = instant_of(value, TYPE_NAME, InstantKind::Time)?.assume_zone(ctx.time_zone());
        buf.push_str(&ctx.time_format().printer().format(&instant)?);
        Ok(())
    }
}

impl BinaryDecoder for TimeTzBinary {
    fn decode(&self, buf: &mut &[u8], _ctx: &dyn Context) -> Result<Option<Value>> {
        let Some(mut payload) = take_fixed_payload(buf, TYPE_NAME, PAYLOAD_SIZE)? else {
            return Ok(None);
        };
        let micros = payload.get_i64();
        let wire_offset = payload.get_i32();
        let offset = wire_offset
            .checked_neg()
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                Error::protocol(format!("{TYPE_NAME} offset of {wire_offset} seconds is out of range"))
            })?;
        Ok(Some(Value::Instant(Instant::precise(
            InstantKind::Time,
            micros,
            offset,
        ))))
    }
}

impl BinaryEncoder for TimeTzBinary {
    fn encode(&self, buf: &mut BytesMut, value: Option<&Value>, ctx: &dyn Context) -> Result<()> {
        let Some(value) = value else {
            put_null(buf);
            return Ok(());
        };
        let instant = instant_of(value, TYPE_NAME, InstantKind::Time)?;
        let micros = instant.micros_local().rem_euclid(MICROS_PER_DAY);
        let offset = instant.zone_offset_secs(ctx.time_zone());

        buf.reserve(fixed_length(Some(value), PAYLOAD_SIZE));
        put_length(buf, PAYLOAD_SIZE)?;
        buf.put_i64(micros);
        buf.put_i32(-offset);
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
    use crate::datetime::{MICROS_PER_SECOND, Zone};

    fn offset(secs: i32) -> FixedOffset {
        FixedOffset::east_opt(secs).unwrap()
    }

    fn encode(value: Option<&Value>, ctx: &dyn Context) -> BytesMut {
        let mut buf = BytesMut::new();
        BinaryEncoder::encode(&TimeTzBinary, &mut buf, value, ctx).unwrap();
        buf
    }

    #[test]
    fn test_binary_layout() {
        let ctx = BasicContext::default();
        let value = Value::Instant(Instant::precise(
            InstantKind::Time,
            MICROS_PER_SECOND,
            offset(3_600),
        ));
        let buf = encode(Some(&value), &ctx);
        assert_eq!(
            &buf[..],
            &[
                0, 0, 0, 12, // length
                0, 0, 0, 0, 0, 0x0f, 0x42, 0x40, // 1_000_000 micros
                0xff, 0xff, 0xf1, 0xf0, // -3600
            ]
        );
    }

    #[test]
    fn test_decode_negates_offset() {
        let ctx = BasicContext::default();
        let bytes = [0, 0, 0, 12, 0, 0, 0, 0, 0, 0, 0, 5, 0, 0, 0x0e, 0x10];
        let mut buf = &bytes[..];
        let value = BinaryDecoder::decode(&TimeTzBinary, &mut buf, &ctx).unwrap();
        assert_eq!(
            value,
            Some(Value::Instant(Instant::precise(InstantKind::Time, 5, offset(-3_600))))
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_encode_reduces_modulo_day() {
        let ctx = BasicContext::default();
        let past_midnight = Value::Instant(Instant::precise(
            InstantKind::Time,
            MICROS_PER_DAY + 7,
            offset(0),
        ));
        let before_midnight =
            Value::Instant(Instant::precise(InstantKind::Time, -1, offset(0)));

        let encoded = encode(Some(&past_midnight), &ctx);
        let mut buf = &encoded[..];
        buf.advance(4);
        assert_eq!(buf.get_i64(), 7);

        let encoded = encode(Some(&before_midnight), &ctx);
        let mut buf = &encoded[..];
        buf.advance(4);
        assert_eq!(buf.get_i64(), MICROS_PER_DAY - 1);
    }

    #[test]
    fn test_ambiguous_uses_context_zone() {
        let mut ctx = BasicContext::default();
        ctx.set_zone(Zone::from_offset_secs(-18_000).unwrap());
        let value = Value::Instant(Instant::ambiguous(InstantKind::Time, 0));
        let encoded = encode(Some(&value), &ctx);
        let mut buf = &encoded[..];
        buf.advance(12);
        assert_eq!(buf.get_i32(), 18_000);
    }

    #[test]
    fn test_out_of_range_wire_offset() {
        let ctx = BasicContext::default();
        let mut bytes = vec![0, 0, 0, 12, 0, 0, 0, 0, 0, 0, 0, 0];
        bytes.extend_from_slice(&i32::MIN.to_be_bytes());
        let err = BinaryDecoder::decode(&TimeTzBinary, &mut &bytes[..], &ctx).unwrap_err();
        assert!(err.is_protocol_error());

        let mut bytes = vec![0, 0, 0, 12, 0, 0, 0, 0, 0, 0, 0, 0];
        bytes.extend_from_slice(&90_000_i32.to_be_bytes());
        assert!(BinaryDecoder::decode(&TimeTzBinary, &mut &bytes[..], &ctx).is_err());
    }

    #[test]
    fn test_text_uses_context_zone() {
        let mut ctx = BasicContext::default();
        ctx.set_zone(Zone::from_offset_secs(19_800).unwrap());

        let parsed = TextDecoder::decode(&TimeTzText, "13:45:00", &ctx).unwrap();
        assert_eq!(
            parsed,
            Value::Instant(Instant::precise(
                InstantKind::Time,
                (13 * 3_600 + 45 * 60) * MICROS_PER_SECOND,
                offset(19_800)
            ))
        );

        let explicit = TextDecoder::decode(&TimeTzText, "13:45:00-08", &ctx).unwrap();
        assert_eq!(
            explicit.as_instant("timetz").unwrap().offset(),
            Some(offset(-28_800))
        );

        let mut out = String::new();
        TextEncoder::encode(&TimeTzText, &mut out, &parsed, &ctx).unwrap();
        assert_eq!(out, "13:45:00+05:30");
    }

    #[test]
    fn test_wrong_host_type() {
        let ctx = BasicContext::default();
        let mut buf = BytesMut::new();
        let err = BinaryEncoder::encode(&TimeTzBinary, &mut buf, Some(&Value::Money(1)), &ctx)
            .unwrap_err();
        assert!(matches!(err, Error::Type(_)));
        assert!(buf.is_empty());
    }
}
