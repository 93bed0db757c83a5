//! Built-in codecs, grouped by the server I/O procedures they stand in for.
//!
//! Each module provides a text codec, a binary codec and a `provider()`
//! constructor for one type. Date/time types other than `date` are selected
//! on [`FIELD_DATETIME_FORMAT`]: servers built with float datetimes use a
//! different binary layout, which this crate exchanges as text only.

use std::sync::Arc;

use wirefmt_core::{Error, Result};

use crate::codec::{
    BinaryDecoder, BinaryEncoder, CodecProvider, CodecSet, SettingSelectProvider, TextDecoder,
    TextEncoder,
};
use crate::context::{DateTimeEncoding, FIELD_DATETIME_FORMAT};
use crate::datetime::{DateTimeFormat, DateTimePieces, Instant, InstantKind, PG_EPOCH_OFFSET_MICROS};
use crate::types::Value;

/// Implements [`Codec`](crate::codec::Codec) for codec structs.
macro_rules! codec_identity {
    ($($codec:ty),+ => $primitive:ident, $host:ident) => {
        $(
            impl $crate::codec::Codec for $codec {
                fn primitive_type(&self) -> $crate::types::PrimitiveType {
                    $crate::types::PrimitiveType::$primitive
                }

                fn host_type(&self) -> $crate::types::HostType {
                    $crate::types::HostType::$host
                }
            }
        )+
    };
}

pub mod dates;
pub mod money;
pub mod times;
pub mod times_tz;
pub mod timestamps;
pub mod timestamps_tz;

/// Providers for every built-in type.
pub fn builtin_providers() -> Vec<Arc<dyn CodecProvider>> {
    vec![
        dates::provider(),
        times::provider(),
        times_tz::provider(),
        timestamps::provider(),
        timestamps_tz::provider(),
        money::provider(),
    ]
}

/// A provider with binary codecs under integer datetimes and text only
/// under float datetimes.
fn datetime_provider<T, B>(base_name: &'static str, text: T, binary: B) -> Arc<dyn CodecProvider>
where
    T: TextEncoder + TextDecoder + Clone + 'static,
    B: BinaryEncoder + BinaryDecoder + 'static,
{
    Arc::new(
        SettingSelectProvider::new(FIELD_DATETIME_FORMAT, &[base_name])
            .branch(
                DateTimeEncoding::Integer,
                CodecSet::text(text.clone()).with_binary(binary),
            )
            .branch(DateTimeEncoding::Float, CodecSet::text(text)),
    )
}

/// Run the context parser over the whole of `text`.
fn parse_text(
    format: &dyn DateTimeFormat,
    text: &str,
    sql_type: &'static str,
) -> Result<DateTimePieces> {
    let mut pieces = DateTimePieces::default();
    let end = format.parser().parse(text, 0, &mut pieces)?;
    if end != text.len() {
        return Err(Error::type_mismatch(sql_type, text));
    }
    Ok(pieces)
}

/// The instant held by `value`, checked against the codec's kind.
fn instant_of(value: &Value, sql_type: &'static str, kind: InstantKind) -> Result<Instant> {
    let instant = *value.as_instant(sql_type)?;
    if instant.kind() != kind {
        return Err(Error::type_mismatch(
            sql_type,
            format_args!("{:?} instant", instant.kind()),
        ));
    }
    if kind == InstantKind::Time && instant.is_infinity() {
        return Err(Error::type_mismatch(sql_type, "infinity"));
    }
    Ok(instant)
}

/// Drop an attached offset, keeping the wall clock.
fn without_zone(instant: Instant) -> Instant {
    match instant {
        Instant::Precise {
            kind, micros_local, ..
        } => Instant::ambiguous(kind, micros_local),
        other => other,
    }
}

/// Unix-epoch microseconds to wire microseconds since 2000-01-01.
fn timestamp_to_wire(unix_micros: i64, sql_type: &'static str) -> Result<i64> {
    unix_micros
        .checked_sub(PG_EPOCH_OFFSET_MICROS)
        .filter(|wire| *wire != i64::MIN && *wire != i64::MAX)
        .ok_or_else(|| {
            Error::type_mismatch(sql_type, format_args!("{unix_micros} microseconds is out of range"))
        })
}

/// Wire microseconds since 2000-01-01 to an instant, honouring infinities.
fn timestamp_from_wire(wire: i64, sql_type: &str) -> Result<Instant> {
    match wire {
        i64::MAX => Ok(Instant::future(InstantKind::Timestamp)),
        i64::MIN => Ok(Instant::past(InstantKind::Timestamp)),
        _ => wire
            .checked_add(PG_EPOCH_OFFSET_MICROS)
            .map(|unix| Instant::ambiguous(InstantKind::Timestamp, unix))
            .ok_or_else(|| Error::protocol(format!("{sql_type} value {wire} is out of range"))),
    }
}

/// Wire sentinel for an infinite timestamp.
const fn timestamp_infinity(instant: &Instant) -> Option<i64> {
    match instant {
        Instant::Infinity { positive: true, .. } => Some(i64::MAX),
        Instant::Infinity { positive: false, .. } => Some(i64::MIN),
        _ => None,
    }
}
