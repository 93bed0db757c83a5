//! `money`: signed cents.
//!
//! Text goes through the context currency formatter (`$1,234.50`); binary
//! is the 8-byte cent count.

use std::sync::Arc;

use bytes::{Buf, BufMut, BytesMut};
use wirefmt_core::Result;

use crate::codec::{
    BinaryDecoder, BinaryEncoder, CodecProvider, CodecSet, FixedProvider, TextDecoder,
    TextEncoder, fixed_length, put_length, put_null, take_fixed_payload,
};
use crate::context::Context;
use crate::types::Value;

const TYPE_NAME: &str = "money";
const PAYLOAD_SIZE: usize = 8;

/// Digits after the decimal point.
const SCALE: u32 = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct MoneyText;

#[derive(Debug, Clone, Copy, Default)]
pub struct MoneyBinary;

codec_identity!(MoneyText, MoneyBinary => Money, Money);

pub fn provider() -> Arc<dyn CodecProvider> {
    Arc::new(FixedProvider::new(
        &["cash_"],
        CodecSet::text(MoneyText).with_binary(MoneyBinary),
    ))
}

impl TextDecoder for MoneyText {
    fn decode(&self, text: &str, ctx: &dyn Context) -> Result<Value> {
        ctx.currency_formatter()
            .parse_scaled(text, SCALE)
            .map(Value::Money)
    }
}

impl TextEncoder for MoneyText {
    fn encode(&self, buf: &mut String, value: &Value, ctx: &dyn Context) -> Result<()> {
        let cents = value.as_money()?;
        buf.push_str(&ctx.currency_formatter().format_scaled(cents, SCALE));
        Ok(())
    }
}

impl BinaryDecoder for MoneyBinary {
    fn decode(&self, buf: &mut &[u8], _ctx: &dyn Context) -> Result<Option<Value>> {
        let Some(mut payload) = take_fixed_payload(buf, TYPE_NAME, PAYLOAD_SIZE)? else {
            return Ok(None);
        };
        Ok(Some(Value::Money(payload.get_i64())))
    }
}

impl BinaryEncoder for MoneyBinary {
    fn encode(&self, buf: &mut BytesMut, value: Option<&Value>, _ctx: &dyn Context) -> Result<()> {
        let Some(value) = value else {
            put_null(buf);
            return Ok(());
        };
        let cents = value.as_money()?;
        put_length(buf, PAYLOAD_SIZE)?;
        buf.put_i64(cents);
        Ok(())
    }

    fn length(&self, value: Option<&Value>, _ctx: &dyn Context) -> Result<usize> {
        Ok(fixed_length(value, PAYLOAD_SIZE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirefmt_core::Error;

    use crate::context::{BasicContext, NumberFormat};
    use crate::datetime::{Instant, InstantKind};

    #[test]
    fn test_text_uses_currency_formatter() {
        let mut ctx = BasicContext::default();
        let value = TextDecoder::decode(&MoneyText, "-$1,234.50", &ctx).unwrap();
        assert_eq!(value, Value::Money(-123_450));

        ctx.set_currency_formatter(NumberFormat {
            grouping_separator: Some('.'),
            decimal_separator: ',',
            min_fraction_digits: 2,
            currency_symbol: Some("€".to_string()),
        });
        let mut out = String::new();
        TextEncoder::encode(&MoneyText, &mut out, &value, &ctx).unwrap();
        assert_eq!(out, "-€1.234,50");
    }

    #[test]
    fn test_text_beyond_range_is_type_error() {
        let ctx = BasicContext::default();
        for text in [
            "$100000000000000000000000000000000000000.00",
            "$92,233,720,368,547,758.08",
            "-$92,233,720,368,547,758.09",
        ] {
            let err = TextDecoder::decode(&MoneyText, text, &ctx).unwrap_err();
            assert!(matches!(err, Error::Type(_)), "{text}: {err}");
        }
    }

    #[test]
    fn test_binary_round_trip() {
        let ctx = BasicContext::default();
        for cents in [0, 1, -1, i64::MAX, i64::MIN] {
            let mut buf = BytesMut::new();
            BinaryEncoder::encode(&MoneyBinary, &mut buf, Some(&Value::Money(cents)), &ctx)
                .unwrap();
            let decoded = BinaryDecoder::decode(&MoneyBinary, &mut &buf[..], &ctx).unwrap();
            assert_eq!(decoded, Some(Value::Money(cents)));
        }
    }

    #[test]
    fn test_rejects_instant() {
        let ctx = BasicContext::default();
        let value = Value::Instant(Instant::ambiguous(InstantKind::Date, 0));
        let mut out = String::new();
        assert!(TextEncoder::encode(&MoneyText, &mut out, &value, &ctx).is_err());
    }
}
