//! `time`: time of day without zone, as microseconds since midnight.

use std::sync::Arc;

use bytes::{Buf, BufMut, BytesMut};
use wirefmt_core::Result;

use super::{instant_of, parse_text, without_zone};
use crate::codec::{
    BinaryDecoder, BinaryEncoder, CodecProvider, TextDecoder, TextEncoder, fixed_length,
    put_length, put_null, take_fixed_payload,
};
use crate::context::Context;
use crate::datetime::{Instant, InstantKind, time_of_day};
use crate::types::Value;

const TYPE_NAME: &str = "time";
const PAYLOAD_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, Default)]
pub struct TimeText;

#[derive(Debug, Clone, Copy, Default)]
pub struct TimeBinary;

codec_identity!(TimeText, TimeBinary => Time, Instant);

pub fn provider() -> Arc<dyn CodecProvider> {
    super::datetime_provider("time_", TimeText, TimeBinary)
}

impl TextDecoder for TimeText {
    fn decode(&self, text: &str, ctx: &dyn Context) -> Result<Value> {
        let mut pieces = parse_text(ctx.time_format(), text, TYPE_NAME)?;
        // The server ignores a zone in time input.
        pieces.offset = None;
        Instant::from_pieces(InstantKind::Time, &pieces, None).map(Value::Instant)
    }
}

impl TextEncoder for TimeText {
    fn encode(&self, buf: &mut String, value: &Value, ctx: &dyn Context) -> Result<()> {
        let instant = without_zone(instant_of(value, TYPE_NAME, InstantKind::Time)?);
        buf.push_str(&ctx.time_format().printer().format(&instant)?);
        Ok(())
    }
}

impl BinaryDecoder for TimeBinary {
    fn decode(&self, buf: &mut &[u8], _ctx: &dyn Context) -> Result<Option<Value>> {
        let Some(mut payload) = take_fixed_payload(buf, TYPE_NAME, PAYLOAD_SIZE)? else {
            return Ok(None);
        };
        let micros = payload.get_i64();
        Ok(Some(Value::Instant(Instant::ambiguous(InstantKind::Time, micros))))
    }
}

impl BinaryEncoder for TimeBinary {
    fn encode(&self, buf: &mut BytesMut, value: Option<&Value>, _ctx: &dyn Context) -> Result<()> {
        let Some(value) = value else {
            put_null(buf);
            return Ok(());
        };
        let instant = instant_of(value, TYPE_NAME, InstantKind::Time)?;
        put_length(buf, PAYLOAD_SIZE)?;
        buf.put_i64(time_of_day(instant.micros_local()));
        Ok(())
    }

    fn length(&self, value: Option<&Value>, _ctx: &dyn Context) -> Result<usize> {
        Ok(fixed_length(value, PAYLOAD_SIZE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    use crate::context::BasicContext;
    use crate::datetime::{MICROS_PER_DAY, MICROS_PER_SECOND};

    #[test]
    fn test_binary_round_trip() {
        let ctx = BasicContext::default();
        let value = Value::Instant(Instant::ambiguous(InstantKind::Time, 45_296_789_012));
        let mut buf = BytesMut::new();
        BinaryEncoder::encode(&TimeBinary, &mut buf, Some(&value), &ctx).unwrap();
        assert_eq!(buf.len(), 12);

        let mut read = &buf[..];
        let decoded = BinaryDecoder::decode(&TimeBinary, &mut read, &ctx).unwrap();
        assert_eq!(decoded, Some(value));
    }

    #[test]
    fn test_text_drops_zone() {
        let ctx = BasicContext::default();
        let decoded = TextDecoder::decode(&TimeText, "04:05:06.5+02", &ctx).unwrap();
        assert_eq!(
            decoded,
            Value::Instant(Instant::ambiguous(
                InstantKind::Time,
                (4 * 3_600 + 5 * 60 + 6) * MICROS_PER_SECOND + 500_000
            ))
        );

        let precise = Value::Instant(Instant::precise(
            InstantKind::Time,
            3_600 * MICROS_PER_SECOND,
            FixedOffset::east_opt(7_200).unwrap(),
        ));
        let mut out = String::new();
        TextEncoder::encode(&TimeText, &mut out, &precise, &ctx).unwrap();
        assert_eq!(out, "01:00:00");
    }

    #[test]
    fn test_rejects_bad_text() {
        let ctx = BasicContext::default();
        assert!(TextDecoder::decode(&TimeText, "25:00:00", &ctx).is_err());
        assert!(TextDecoder::decode(&TimeText, "infinity", &ctx).is_err());
    }

    #[test]
    fn test_end_of_day_survives_both_formats() {
        let ctx = BasicContext::default();
        let value = TextDecoder::decode(&TimeText, "24:00:00", &ctx).unwrap();
        assert_eq!(value, Value::Instant(Instant::ambiguous(InstantKind::Time, MICROS_PER_DAY)));

        let mut buf = BytesMut::new();
        BinaryEncoder::encode(&TimeBinary, &mut buf, Some(&value), &ctx).unwrap();
        let decoded = BinaryDecoder::decode(&TimeBinary, &mut &buf[..], &ctx)
            .unwrap()
            .unwrap();
        assert_eq!(decoded, value);

        let mut out = String::new();
        TextEncoder::encode(&TimeText, &mut out, &decoded, &ctx).unwrap();
        assert_eq!(out, "24:00:00");
    }
}
