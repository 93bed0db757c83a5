//! Session time zones.

use std::fmt;

use chrono::{FixedOffset, Offset, Utc};
use wirefmt_core::{Error, Result};

/// Names the server and clients use for UTC itself.
const UTC_ALIASES: &[&str] = &[
    "utc",
    "gmt",
    "z",
    "zulu",
    "uct",
    "universal",
    "etc/utc",
    "etc/gmt",
    "etc/uct",
    "etc/universal",
];

/// A time zone as a session sees it.
///
/// The zone id and the fixed offset are stored together so the two forms a
/// context exposes always describe the same zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Zone {
    id: String,
    offset: FixedOffset,
}

impl Zone {
    /// The UTC zone.
    pub fn utc() -> Self {
        Self {
            id: "UTC".to_string(),
            offset: Utc.fix(),
        }
    }

    /// A fixed zone `offset_secs` seconds east of UTC.
    pub fn from_offset_secs(offset_secs: i32) -> Result<Self> {
        let offset = FixedOffset::east_opt(offset_secs).ok_or_else(|| {
            Error::invalid_argument("offset", format!("{offset_secs} seconds is out of range"))
        })?;
        Ok(Self::from_offset(offset))
    }

    /// A fixed zone for an existing offset.
    pub fn from_offset(offset: FixedOffset) -> Self {
        if offset.local_minus_utc() == 0 {
            return Self::utc();
        }
        Self {
            id: offset_id(offset.local_minus_utc()),
            offset,
        }
    }

    /// Parse a zone id as reported in the server's `TimeZone` parameter.
    ///
    /// Accepted forms are the UTC aliases, ISO offsets such as `+05:30` or
    /// `-0800`, and POSIX-style ids (`UTC+3`, `Etc/GMT+5`). POSIX ids count
    /// hours west of Greenwich, so `Etc/GMT+5` is five hours behind UTC.
    /// Region ids such as `Europe/Paris` need a zone database and are rejected.
    pub fn parse(id: &str) -> Result<Self> {
        let trimmed = id.trim();
        let lower = trimmed.to_ascii_lowercase();

        if UTC_ALIASES.contains(&lower.as_str()) {
            return Ok(Self {
                id: trimmed.to_string(),
                offset: Self::utc().offset,
            });
        }

        let (posix_rest, west_positive) = ["etc/gmt", "etc/utc", "gmt", "utc"]
            .iter()
            .find_map(|prefix| lower.strip_prefix(prefix))
            .map_or((lower.as_str(), false), |rest| (rest, true));

        let invalid = || Error::invalid_argument("time_zone", format!("unsupported zone id '{id}'"));

        let (secs, consumed) = scan_offset(posix_rest).ok_or_else(invalid)?;
        if consumed != posix_rest.len() {
            return Err(invalid());
        }
        let secs = if west_positive { -secs } else { secs };
        let offset = FixedOffset::east_opt(secs).ok_or_else(invalid)?;

        Ok(Self {
            id: trimmed.to_string(),
            offset,
        })
    }

    /// The zone id (modern representation).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The fixed offset (legacy representation).
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Seconds east of UTC.
    pub fn offset_secs(&self) -> i32 {
        self.offset.local_minus_utc()
    }
}

impl Default for Zone {
    fn default() -> Self {
        Self::utc()
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Format an offset the way the server prints it in text output:
/// `+05:30`, `-08`, `+00`, `+05:30:15`.
pub fn format_offset(offset_secs: i32) -> String {
    let sign = if offset_secs < 0 { '-' } else { '+' };
    let abs = offset_secs.unsigned_abs();
    let (hours, minutes, seconds) = (abs / 3600, (abs / 60) % 60, abs % 60);
    if seconds != 0 {
        format!("{sign}{hours:02}:{minutes:02}:{seconds:02}")
    } else if minutes != 0 {
        format!("{sign}{hours:02}:{minutes:02}")
    } else {
        format!("{sign}{hours:02}")
    }
}

fn offset_id(offset_secs: i32) -> String {
    let sign = if offset_secs < 0 { '-' } else { '+' };
    let abs = offset_secs.unsigned_abs();
    let (hours, minutes, seconds) = (abs / 3600, (abs / 60) % 60, abs % 60);
    if seconds == 0 {
        format!("{sign}{hours:02}:{minutes:02}")
    } else {
        format!("{sign}{hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// Scan a signed offset (`+5`, `-08`, `+05:30`, `+0530`, `+05:30:15`) at the
/// start of `s`. Returns the offset in seconds east and the bytes consumed.
pub(crate) fn scan_offset(s: &str) -> Option<(i32, usize)> {
    let bytes = s.as_bytes();
    let sign = match bytes.first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let mut pos = 1;

    let hour_digits = count_digits(&bytes[pos..]).min(2);
    if hour_digits == 0 {
        return None;
    }
    let hours = parse_digits(&bytes[pos..pos + hour_digits]);
    pos += hour_digits;

    let mut fields = [0_i32; 2];
    for field in &mut fields {
        let colon = bytes.get(pos) == Some(&b':');
        let start = pos + usize::from(colon);
        if count_digits(bytes.get(start..).unwrap_or_default()) < 2 {
            break;
        }
        *field = parse_digits(&bytes[start..start + 2]);
        pos = start + 2;
    }

    let [minutes, seconds] = fields;
    if minutes >= 60 || seconds >= 60 {
        return None;
    }
    Some((sign * (hours * 3600 + minutes * 60 + seconds), pos))
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn parse_digits(bytes: &[u8]) -> i32 {
    bytes
        .iter()
        .fold(0, |acc, b| acc * 10 + i32::from(b - b'0'))
}
