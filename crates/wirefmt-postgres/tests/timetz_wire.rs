use bytes::{Buf, BytesMut};
use chrono::FixedOffset;
use proptest::prelude::*;
use wirefmt_postgres::codec::encode_binary_value;
use wirefmt_postgres::types::oid;
use wirefmt_postgres::{BasicContext, CodecProvider, Context, Instant, InstantKind, Value};

const MICROS_PER_DAY: i64 = 86_400_000_000;

fn timetz(ctx: &BasicContext) -> &dyn CodecProvider {
    ctx.registry()
        .provider(oid::TIMETZ)
        .expect("timetz provider")
        .as_ref()
}

fn timetz_value(micros: i64, offset_secs: i32) -> Value {
    Value::Instant(Instant::precise(
        InstantKind::Time,
        micros,
        FixedOffset::east_opt(offset_secs).expect("offset in range"),
    ))
}

fn wire(length: i32, payload: &[u8]) -> Vec<u8> {
    let mut bytes = length.to_be_bytes().to_vec();
    bytes.extend_from_slice(payload);
    bytes
}

proptest! {
    #[test]
    fn binary_round_trip_preserves_micros_and_offset(
        micros in 0..MICROS_PER_DAY,
        offset in -86_399..=86_399_i32,
    ) {
        let ctx = BasicContext::default();
        let provider = timetz(&ctx);
        let value = timetz_value(micros, offset);

        let encoded = encode_binary_value(provider, Some(&value), &ctx).unwrap();
        prop_assert_eq!(encoded.len(), 16);

        let mut buf = &encoded[..];
        let decoded = provider.decode_binary(&mut buf, &ctx).unwrap().unwrap();
        prop_assert!(buf.is_empty());
        let instant = decoded.as_instant("timetz").unwrap();
        prop_assert_eq!(instant.micros_local(), micros);
        prop_assert_eq!(instant.offset().map(|o| o.local_minus_utc()), Some(offset));
    }

    #[test]
    fn length_matches_encoding(micros in any::<i64>(), offset in -86_399..=86_399_i32) {
        let ctx = BasicContext::default();
        let provider = timetz(&ctx);
        let value = timetz_value(micros, offset);

        let mut buf = BytesMut::new();
        provider.encode_binary(&mut buf, Some(&value), &ctx).unwrap();
        prop_assert_eq!(provider.binary_length(Some(&value), &ctx).unwrap(), buf.len());

        let mut payload = &buf[4..];
        let stored = payload.get_i64();
        prop_assert!((0..MICROS_PER_DAY).contains(&stored));
        prop_assert_eq!(stored, micros.rem_euclid(MICROS_PER_DAY));
    }

    #[test]
    fn wrong_declared_length_is_protocol_error(length in any::<i32>()) {
        prop_assume!(length != -1 && length != 12);
        let ctx = BasicContext::default();
        let bytes = wire(length, &[0; 12]);
        let err = timetz(&ctx).decode_binary(&mut &bytes[..], &ctx).unwrap_err();
        prop_assert!(err.is_protocol_error());
    }
}

#[test]
fn null_is_four_bytes_of_minus_one() {
    let ctx = BasicContext::default();
    let provider = timetz(&ctx);

    let encoded = encode_binary_value(provider, None, &ctx).unwrap();
    assert_eq!(&encoded[..], &[0xff, 0xff, 0xff, 0xff]);
    assert_eq!(provider.binary_length(None, &ctx).unwrap(), 4);

    let mut bytes = encoded.to_vec();
    bytes.extend_from_slice(&[0xaa, 0xbb]);
    let mut buf = &bytes[..];
    assert_eq!(provider.decode_binary(&mut buf, &ctx).unwrap(), None);
    assert_eq!(buf, &[0xaa, 0xbb]);
}

#[test]
fn lengths_other_than_twelve_are_rejected() {
    let ctx = BasicContext::default();
    for length in [0, 11, 13] {
        let bytes = wire(length, &[0; 13]);
        let err = timetz(&ctx)
            .decode_binary(&mut &bytes[..], &ctx)
            .unwrap_err();
        assert!(err.is_protocol_error(), "length {length}: {err}");
    }
}

#[test]
fn truncated_payload_is_rejected() {
    let ctx = BasicContext::default();
    let bytes = wire(12, &[0; 8]);
    assert!(
        timetz(&ctx)
            .decode_binary(&mut &bytes[..], &ctx)
            .unwrap_err()
            .is_protocol_error()
    );
    assert!(
        timetz(&ctx)
            .decode_binary(&mut &[0_u8, 0][..], &ctx)
            .unwrap_err()
            .is_protocol_error()
    );
}

#[test]
fn east_offsets_are_stored_negated() {
    let ctx = BasicContext::default();
    let provider = timetz(&ctx);

    let encoded = encode_binary_value(provider, Some(&timetz_value(0, 3_600)), &ctx).unwrap();
    let mut offset_field = &encoded[12..];
    assert_eq!(offset_field.get_i32(), -3_600);

    let mut payload = 0_i64.to_be_bytes().to_vec();
    payload.extend_from_slice(&(-3_600_i32).to_be_bytes());
    let bytes = wire(12, &payload);
    let decoded = provider.decode_binary(&mut &bytes[..], &ctx).unwrap().unwrap();
    assert_eq!(
        decoded.as_instant("timetz").unwrap().offset(),
        FixedOffset::east_opt(3_600)
    );
}

#[test]
fn float_datetimes_have_no_binary_form() {
    let mut ctx = BasicContext::default();
    ctx.apply_parameter_status("integer_datetimes", "off");

    let provider = ctx.registry().provider(oid::TIMETZ).unwrap().clone();
    let dyn_ctx: &dyn Context = &ctx;
    assert!(!provider.supports_binary(dyn_ctx).unwrap());

    let err = encode_binary_value(provider.as_ref(), None, dyn_ctx).unwrap_err();
    assert!(err.is_config_error());
    assert_eq!(err.setting(), Some("field.datetime.format"));

    let value = provider.decode_text("08:00:00+02", dyn_ctx).unwrap();
    let mut text = String::new();
    provider.encode_text(&mut text, &value, dyn_ctx).unwrap();
    assert_eq!(text, "08:00:00+02");
}
