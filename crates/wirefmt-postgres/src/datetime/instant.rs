//! The temporal payload exchanged with codecs.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use wirefmt_core::{Error, Result};

use super::format::DateTimePieces;

pub const MICROS_PER_SECOND: i64 = 1_000_000;
pub const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

/// What an instant denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstantKind {
    Date,
    Time,
    Timestamp,
}

impl InstantKind {
    const fn name(self) -> &'static str {
        match self {
            InstantKind::Date => "date",
            InstantKind::Time => "time",
            InstantKind::Timestamp => "timestamp",
        }
    }
}

/// A point on the local wall clock.
///
/// `micros_local` counts microseconds from 1970-01-01T00:00 *local* time (for
/// times of day, from local midnight). An offset, when present, is carried
/// beside the count and never folded into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instant {
    /// No zone attached; interpreted in whatever zone the reader assumes.
    Ambiguous { kind: InstantKind, micros_local: i64 },
    /// Explicit offset east of UTC.
    Precise {
        kind: InstantKind,
        micros_local: i64,
        offset: FixedOffset,
    },
    /// The server's `infinity` / `-infinity`.
    Infinity { kind: InstantKind, positive: bool },
}

impl Instant {
    pub const fn ambiguous(kind: InstantKind, micros_local: i64) -> Self {
        Instant::Ambiguous { kind, micros_local }
    }

    pub const fn precise(kind: InstantKind, micros_local: i64, offset: FixedOffset) -> Self {
        Instant::Precise {
            kind,
            micros_local,
            offset,
        }
    }

    pub const fn future(kind: InstantKind) -> Self {
        Instant::Infinity {
            kind,
            positive: true,
        }
    }

    pub const fn past(kind: InstantKind) -> Self {
        Instant::Infinity {
            kind,
            positive: false,
        }
    }

    pub const fn kind(&self) -> InstantKind {
        match self {
            Instant::Ambiguous { kind, .. }
            | Instant::Precise { kind, .. }
            | Instant::Infinity { kind, .. } => *kind,
        }
    }

    /// Local wall-clock microseconds. Infinities saturate to `i64::MAX` / `i64::MIN`.
    pub const fn micros_local(&self) -> i64 {
        match self {
            Instant::Ambiguous { micros_local, .. } | Instant::Precise { micros_local, .. } => {
                *micros_local
            }
            Instant::Infinity { positive: true, .. } => i64::MAX,
            Instant::Infinity { positive: false, .. } => i64::MIN,
        }
    }

    /// The attached offset, if any.
    pub const fn offset(&self) -> Option<FixedOffset> {
        match self {
            Instant::Precise { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    pub const fn is_infinity(&self) -> bool {
        matches!(self, Instant::Infinity { .. })
    }

    /// Offset in seconds east of UTC, using `default_zone` when none is attached.
    pub fn zone_offset_secs(&self, default_zone: FixedOffset) -> i32 {
        self.offset().unwrap_or(default_zone).local_minus_utc()
    }

    /// Microseconds since the Unix epoch in UTC, reading an ambiguous value
    /// in `default_zone`.
    pub fn micros_utc(&self, default_zone: FixedOffset) -> Result<i64> {
        if self.is_infinity() {
            return Ok(self.micros_local());
        }
        let shift = i64::from(self.zone_offset_secs(default_zone)) * MICROS_PER_SECOND;
        self.micros_local()
            .checked_sub(shift)
            .ok_or_else(|| Error::type_mismatch("instant within range", self.micros_local()))
    }

    /// Attach `offset` to an ambiguous value without moving its wall clock.
    /// Precise values and infinities are returned unchanged.
    pub fn assume_zone(self, offset: FixedOffset) -> Self {
        match self {
            Instant::Ambiguous { kind, micros_local } => Instant::precise(kind, micros_local, offset),
            other => other,
        }
    }

    /// Express the same absolute moment on the wall clock of `offset`.
    /// Ambiguous values are taken to already be in `offset`.
    pub fn switch_zone(self, offset: FixedOffset) -> Result<Self> {
        match self {
            Instant::Precise {
                kind,
                micros_local,
                offset: from,
            } => {
                let delta = i64::from(offset.local_minus_utc() - from.local_minus_utc())
                    * MICROS_PER_SECOND;
                let micros_local = micros_local
                    .checked_add(delta)
                    .ok_or_else(|| Error::type_mismatch("instant within range", micros_local))?;
                Ok(Instant::precise(kind, micros_local, offset))
            }
            other => Ok(other.assume_zone(offset)),
        }
    }

    /// Build an instant from parsed text fields.
    ///
    /// An offset found in the text wins over `default_zone`; with neither the
    /// result is ambiguous. Date instants never carry a zone.
    pub fn from_pieces(
        kind: InstantKind,
        pieces: &DateTimePieces,
        default_zone: Option<FixedOffset>,
    ) -> Result<Self> {
        if let Some(positive) = pieces.infinity {
            if kind == InstantKind::Time {
                return Err(Error::type_mismatch("time", "infinity"));
            }
            return Ok(Instant::Infinity { kind, positive });
        }

        let micros_local = match kind {
            InstantKind::Date => {
                let date = pieces.date.ok_or_else(|| missing_field(kind, "date"))?;
                return Ok(Instant::ambiguous(kind, date_to_micros(date)));
            }
            InstantKind::Time => {
                let time = pieces.time.ok_or_else(|| missing_field(kind, "time"))?;
                time_to_micros(time) + end_of_day_micros(pieces)
            }
            InstantKind::Timestamp => {
                let date = pieces.date.ok_or_else(|| missing_field(kind, "date"))?;
                let time = pieces.time.unwrap_or(NaiveTime::MIN);
                let micros = date.and_time(time).and_utc().timestamp_micros();
                micros
                    .checked_add(end_of_day_micros(pieces))
                    .ok_or_else(|| Error::type_mismatch("timestamp within range", micros))?
            }
        };

        Ok(match pieces.offset.or(default_zone) {
            Some(offset) => Instant::precise(kind, micros_local, offset),
            None => Instant::ambiguous(kind, micros_local),
        })
    }

    /// Split into text fields for a printer.
    pub fn to_pieces(&self) -> Result<DateTimePieces> {
        let mut pieces = DateTimePieces::default();
        if let Instant::Infinity { positive, .. } = self {
            pieces.infinity = Some(*positive);
            return Ok(pieces);
        }

        let micros = self.micros_local();
        match self.kind() {
            InstantKind::Time => {
                let micros = time_of_day(micros);
                if micros == MICROS_PER_DAY {
                    pieces.time = Some(NaiveTime::MIN);
                    pieces.end_of_day = true;
                } else {
                    pieces.time = Some(micros_to_time(micros)?);
                }
            }
            kind => {
                let local = micros_to_naive(micros, kind)?;
                pieces.date = Some(local.date());
                if kind == InstantKind::Timestamp {
                    pieces.time = Some(local.time());
                }
            }
        }
        pieces.offset = self.offset();
        Ok(pieces)
    }
}

/// Fold microseconds onto a single day, keeping `24:00:00` itself.
pub const fn time_of_day(micros: i64) -> i64 {
    if micros == MICROS_PER_DAY {
        micros
    } else {
        micros.rem_euclid(MICROS_PER_DAY)
    }
}

fn missing_field(kind: InstantKind, field: &'static str) -> Error {
    Error::type_mismatch(kind.name(), format_args!("text without a {field}"))
}

const fn end_of_day_micros(pieces: &DateTimePieces) -> i64 {
    if pieces.end_of_day { MICROS_PER_DAY } else { 0 }
}

fn date_to_micros(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_micros()
}

fn time_to_micros(time: NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight()) * MICROS_PER_SECOND
        + i64::from(time.nanosecond() / 1_000)
}

fn micros_to_time(micros: i64) -> Result<NaiveTime> {
    let secs = u32::try_from(micros / MICROS_PER_SECOND)
        .map_err(|_| Error::type_mismatch("time", micros))?;
    let nanos = u32::try_from(micros % MICROS_PER_SECOND)
        .map_err(|_| Error::type_mismatch("time", micros))?
        * 1_000;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
        .ok_or_else(|| Error::type_mismatch("time", micros))
}

fn micros_to_naive(micros: i64, kind: InstantKind) -> Result<NaiveDateTime> {
    DateTime::from_timestamp_micros(micros)
        .map(|utc| utc.naive_utc())
        .ok_or_else(|| Error::type_mismatch(kind.name(), format_args!("{micros} microseconds is out of range")))
}
