//! Temporal values and their text formats.
//!
//! - [`Instant`]: local wall-clock microseconds, optionally tagged with a
//!   fixed offset
//! - [`Zone`]: a session time zone in both id and fixed-offset form
//! - [`DateTimeFormat`]: pluggable parser/printer pairs used by text codecs

pub mod format;
pub mod instant;
pub mod zone;

pub use format::{
    DateTimeFormat, DateTimeParser, DateTimePieces, DateTimePrinter, IsoDateFormat, IsoTimeFormat,
    IsoTimestampFormat,
};
pub use instant::{Instant, InstantKind, MICROS_PER_DAY, MICROS_PER_SECOND, time_of_day};
pub use zone::{Zone, format_offset};

/// Days from 1970-01-01 to 2000-01-01, the server's date epoch.
pub const PG_EPOCH_OFFSET_DAYS: i32 = 10_957;

/// Microseconds from 1970-01-01 to 2000-01-01.
pub const PG_EPOCH_OFFSET_MICROS: i64 = 946_684_800_000_000;
