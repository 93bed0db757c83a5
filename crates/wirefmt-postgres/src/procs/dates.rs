//! `date`: calendar days.
//!
//! Binary payload is signed days since 2000-01-01; `i32::MAX` and `i32::MIN`
//! are `infinity` and `-infinity`. The layout is the same with integer and
//! float datetimes, so the provider does not depend on any setting.

use std::sync::Arc;

use bytes::{Buf, BufMut, BytesMut};
use wirefmt_core::{Error, Result};

use super::{instant_of, parse_text};
use crate::codec::{
    BinaryDecoder, BinaryEncoder, CodecProvider, CodecSet, FixedProvider, TextDecoder,
    TextEncoder, fixed_length, put_length, put_null, take_fixed_payload,
};
use crate::context::Context;
use crate::datetime::{Instant, InstantKind, MICROS_PER_DAY, PG_EPOCH_OFFSET_DAYS};
use crate::types::Value;

const TYPE_NAME: &str = "date";
const PAYLOAD_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct DateText;

#[derive(Debug, Clone, Copy, Default)]
pub struct DateBinary;

codec_identity!(DateText, DateBinary => Date, Instant);

pub fn provider() -> Arc<dyn CodecProvider> {
    Arc::new(FixedProvider::new(
        &["date_"],
        CodecSet::text(DateText).with_binary(DateBinary),
    ))
}

impl TextDecoder for DateText {
    fn decode(&self, text: &str, ctx: &dyn Context) -> Result<Value> {
        let pieces = parse_text(ctx.date_format(), text, TYPE_NAME)?;
        Instant::from_pieces(InstantKind::Date, &pieces, None).map(Value::Instant)
    }
}

impl TextEncoder for DateText {
    fn encode(&self, buf: &mut String, value: &Value, ctx: &dyn Context) -> Result<()> {
        let instant = instant_of(value, TYPE_NAME, InstantKind::Date)?;
        buf.push_str(&ctx.date_format().printer().format(&instant)?);
        Ok(())
    }
}

impl BinaryDecoder for DateBinary {
    fn decode(&self, buf: &mut &[u8], _ctx: &dyn Context) -> Result<Option<Value>> {
        let Some(mut payload) = take_fixed_payload(buf, TYPE_NAME, PAYLOAD_SIZE)? else {
            return Ok(None);
        };
        let instant = match payload.get_i32() {
            i32::MAX => Instant::future(InstantKind::Date),
            i32::MIN => Instant::past(InstantKind::Date),
            days => {
                let micros = (i64::from(days) + i64::from(PG_EPOCH_OFFSET_DAYS))
                    .checked_mul(MICROS_PER_DAY)
                    .ok_or_else(|| Error::type_mismatch(TYPE_NAME, format_args!("{days} days")))?;
                Instant::ambiguous(InstantKind::Date, micros)
            }
        };
        Ok(Some(Value::Instant(instant)))
    }
}

impl BinaryEncoder for DateBinary {
    fn encode(&self, buf: &mut BytesMut, value: Option<&Value>, _ctx: &dyn Context) -> Result<()> {
        let Some(value) = value else {
            put_null(buf);
            return Ok(());
        };
        let wire = match instant_of(value, TYPE_NAME, InstantKind::Date)? {
            Instant::Infinity { positive: true, .. } => i32::MAX,
            Instant::Infinity { positive: false, .. } => i32::MIN,
            instant => {
                let days = instant.micros_local().div_euclid(MICROS_PER_DAY)
                    - i64::from(PG_EPOCH_OFFSET_DAYS);
                i32::try_from(days)
                    .ok()
                    .filter(|d| *d != i32::MAX && *d != i32::MIN)
                    .ok_or_else(|| Error::type_mismatch(TYPE_NAME, format_args!("{days} days")))?
            }
        };
        put_length(buf, PAYLOAD_SIZE)?;
        buf.put_i32(wire);
        Ok(())
    }

    fn length(&self, value: Option<&Value>, _ctx: &dyn Context) -> Result<usize> {
        Ok(fixed_length(value, PAYLOAD_SIZE))
    }
}
