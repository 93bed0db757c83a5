//! Text formats for dates, times and timestamps.
//!
//! A [`DateTimeFormat`] pairs a parser, which fills [`DateTimePieces`] from
//! text, with a printer, which renders an [`Instant`]. Contexts hand out one
//! format per kind so that text codecs never hard-code a layout.
//!
//! The ISO formats here match the server's `DateStyle = ISO` output:
//!
//! | kind      | example                            |
//! |-----------|------------------------------------|
//! | date      | `2024-02-29`, `0044-03-15 BC`      |
//! | time      | `13:45:00.25`, `13:45:00+05:30`    |
//! | timestamp | `2024-02-29 13:45:00.000001-08`    |

use std::fmt::{self, Write as _};

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveTime, Timelike};
use wirefmt_core::{Error, Result};

use super::instant::Instant;
use super::zone::{format_offset, scan_offset};

/// Fields extracted from a text value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateTimePieces {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub offset: Option<FixedOffset>,
    /// The time read as `24:00:00`; `time` then holds midnight
    pub end_of_day: bool,
    /// `Some(true)` for `infinity`, `Some(false)` for `-infinity`
    pub infinity: Option<bool>,
}

/// Reads text into [`DateTimePieces`].
pub trait DateTimeParser: Send + Sync {
    /// Parse `text` starting at byte `pos`, returning the position just past
    /// the consumed input.
    fn parse(&self, text: &str, pos: usize, pieces: &mut DateTimePieces) -> Result<usize>;
}

/// Renders an [`Instant`] as text.
pub trait DateTimePrinter: Send + Sync {
    fn format(&self, instant: &Instant) -> Result<String>;
}

/// A parser/printer pair.
pub trait DateTimeFormat: Send + Sync + fmt::Debug {
    fn parser(&self) -> &dyn DateTimeParser;
    fn printer(&self) -> &dyn DateTimePrinter;
}

/// ISO dates: `YYYY-MM-DD[ BC]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoDateFormat;

/// ISO times: `HH:MM[:SS[.ffffff]][offset]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoTimeFormat;

/// ISO timestamps: date, a space or `T`, time, then an optional ` BC`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoTimestampFormat;

macro_rules! impl_format {
    ($($ty:ty),*) => {
        $(
            impl DateTimeFormat for $ty {
                fn parser(&self) -> &dyn DateTimeParser {
                    self
                }

                fn printer(&self) -> &dyn DateTimePrinter {
                    self
                }
            }
        )*
    };
}

impl_format!(IsoDateFormat, IsoTimeFormat, IsoTimestampFormat);

impl DateTimeParser for IsoDateFormat {
    fn parse(&self, text: &str, pos: usize, pieces: &mut DateTimePieces) -> Result<usize> {
        if let Some(end) = scan_infinity(text, pos, pieces) {
            return Ok(end);
        }
        let mut cursor = Cursor::new(text, pos, "date")?;
        let (year, month, day) = cursor.date_fields()?;
        let bc = cursor.era_suffix();
        pieces.date = Some(make_date(year, month, day, bc, text)?);
        Ok(cursor.pos)
    }
}

impl DateTimePrinter for IsoDateFormat {
    fn format(&self, instant: &Instant) -> Result<String> {
        let pieces = instant.to_pieces()?;
        if let Some(positive) = pieces.infinity {
            return Ok(infinity_text(positive).to_string());
        }
        let date = pieces
            .date
            .ok_or_else(|| Error::type_mismatch("date", "instant without a date"))?;
        let mut out = String::with_capacity(13);
        let bc = write_date(&mut out, date);
        if bc {
            out.push_str(" BC");
        }
        Ok(out)
    }
}

impl DateTimeParser for IsoTimeFormat {
    fn parse(&self, text: &str, pos: usize, pieces: &mut DateTimePieces) -> Result<usize> {
        let mut cursor = Cursor::new(text, pos, "time")?;
        let (time, end_of_day) = cursor.time_fields()?;
        pieces.time = Some(time);
        pieces.end_of_day = end_of_day;
        if let Some(offset) = cursor.offset()? {
            pieces.offset = Some(offset);
        }
        Ok(cursor.pos)
    }
}

impl DateTimePrinter for IsoTimeFormat {
    fn format(&self, instant: &Instant) -> Result<String> {
        let pieces = instant.to_pieces()?;
        let time = pieces
            .time
            .ok_or_else(|| Error::type_mismatch("time", "instant without a time of day"))?;
        let mut out = String::with_capacity(21);
        if pieces.end_of_day {
            out.push_str("24:00:00");
        } else {
            write_time(&mut out, time);
        }
        if let Some(offset) = pieces.offset {
            out.push_str(&format_offset(offset.local_minus_utc()));
        }
        Ok(out)
    }
}

impl DateTimeParser for IsoTimestampFormat {
    fn parse(&self, text: &str, pos: usize, pieces: &mut DateTimePieces) -> Result<usize> {
        if let Some(end) = scan_infinity(text, pos, pieces) {
            return Ok(end);
        }
        let mut cursor = Cursor::new(text, pos, "timestamp")?;
        let (year, month, day) = cursor.date_fields()?;
        if cursor.eat(b' ') || cursor.eat(b'T') {
            let (time, end_of_day) = cursor.time_fields()?;
            pieces.time = Some(time);
            pieces.end_of_day = end_of_day;
            if let Some(offset) = cursor.offset()? {
                pieces.offset = Some(offset);
            }
        }
        let bc = cursor.era_suffix();
        pieces.date = Some(make_date(year, month, day, bc, text)?);
        Ok(cursor.pos)
    }
}

impl DateTimePrinter for IsoTimestampFormat {
    fn format(&self, instant: &Instant) -> Result<String> {
        let pieces = instant.to_pieces()?;
        if let Some(positive) = pieces.infinity {
            return Ok(infinity_text(positive).to_string());
        }
        let (Some(date), Some(time)) = (pieces.date, pieces.time) else {
            return Err(Error::type_mismatch("timestamp", "instant without date and time"));
        };
        let mut out = String::with_capacity(32);
        let bc = write_date(&mut out, date);
        out.push(' ');
        write_time(&mut out, time);
        if let Some(offset) = pieces.offset {
            out.push_str(&format_offset(offset.local_minus_utc()));
        }
        if bc {
            out.push_str(" BC");
        }
        Ok(out)
    }
}

const fn infinity_text(positive: bool) -> &'static str {
    if positive { "infinity" } else { "-infinity" }
}

fn scan_infinity(text: &str, pos: usize, pieces: &mut DateTimePieces) -> Option<usize> {
    let rest = text.get(pos..)?;
    for (literal, positive) in [("infinity", true), ("+infinity", true), ("-infinity", false)] {
        if rest
            .get(..literal.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(literal))
        {
            pieces.infinity = Some(positive);
            return Some(pos + literal.len());
        }
    }
    None
}

/// Writes the date and reports whether it falls before year 1.
fn write_date(out: &mut String, date: NaiveDate) -> bool {
    let year = date.year();
    let (display_year, bc) = if year <= 0 { (1 - year, true) } else { (year, false) };
    let _ = write!(out, "{display_year:04}-{:02}-{:02}", date.month(), date.day());
    bc
}

fn write_time(out: &mut String, time: NaiveTime) {
    let _ = write!(
        out,
        "{:02}:{:02}:{:02}",
        time.hour(),
        time.minute(),
        time.second()
    );
    let micros = time.nanosecond() / 1_000;
    if micros != 0 {
        let digits = format!("{micros:06}");
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
}

fn make_date(year: i32, month: u32, day: u32, bc: bool, text: &str) -> Result<NaiveDate> {
    let year = if bc { 1 - year } else { year };
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| Error::type_mismatch("date", text))
}

/// Byte cursor over ASCII date/time text.
struct Cursor<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    expected: &'static str,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, pos: usize, expected: &'static str) -> Result<Self> {
        if pos > text.len() {
            return Err(Error::type_mismatch(expected, text));
        }
        Ok(Self {
            text,
            bytes: text.as_bytes(),
            pos,
            expected,
        })
    }

    fn error(&self) -> Error {
        Error::type_mismatch(self.expected, self.text)
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.bytes.get(self.pos) == Some(&byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.eat(byte) { Ok(()) } else { Err(self.error()) }
    }

    /// Read between `min` and `max` digits.
    fn number(&mut self, min: usize, max: usize) -> Result<u32> {
        let start = self.pos;
        let mut value: u32 = 0;
        while self.pos - start < max {
            match self.bytes.get(self.pos) {
                Some(b) if b.is_ascii_digit() => {
                    value = value * 10 + u32::from(b - b'0');
                    self.pos += 1;
                }
                _ => break,
            }
        }
        if self.pos - start < min {
            return Err(self.error());
        }
        Ok(value)
    }

    fn date_fields(&mut self) -> Result<(i32, u32, u32)> {
        let year = self.number(1, 7)?;
        self.expect(b'-')?;
        let month = self.number(1, 2)?;
        self.expect(b'-')?;
        let day = self.number(1, 2)?;
        let year = i32::try_from(year).map_err(|_| self.error())?;
        Ok((year, month, day))
    }

    /// Read a time of day, flagging `24:00:00` as the end of the day.
    fn time_fields(&mut self) -> Result<(NaiveTime, bool)> {
        let hour = self.number(1, 2)?;
        self.expect(b':')?;
        let minute = self.number(2, 2)?;
        let mut second = 0;
        let mut micros = 0;
        if self.eat(b':') {
            second = self.number(2, 2)?;
            if self.eat(b'.') {
                micros = self.fraction()?;
            }
        }
        if hour == 24 {
            return if minute == 0 && second == 0 && micros == 0 {
                Ok((NaiveTime::MIN, true))
            } else {
                Err(self.error())
            };
        }
        NaiveTime::from_hms_micro_opt(hour, minute, second, micros)
            .map(|time| (time, false))
            .ok_or_else(|| self.error())
    }

    /// Fractional seconds; digits past the sixth are consumed and dropped.
    fn fraction(&mut self) -> Result<u32> {
        let start = self.pos;
        let mut micros = 0;
        while let Some(b) = self.bytes.get(self.pos).filter(|b| b.is_ascii_digit()) {
            if self.pos - start < 6 {
                micros = micros * 10 + u32::from(b - b'0');
            }
            self.pos += 1;
        }
        let digits = self.pos - start;
        if digits == 0 {
            return Err(self.error());
        }
        for _ in digits..6 {
            micros *= 10;
        }
        Ok(micros)
    }

    fn offset(&mut self) -> Result<Option<FixedOffset>> {
        if self.eat(b'Z') {
            return Ok(FixedOffset::east_opt(0));
        }
        let Some((secs, consumed)) = scan_offset(&self.text[self.pos..]) else {
            return Ok(None);
        };
        self.pos += consumed;
        FixedOffset::east_opt(secs)
            .map(Some)
            .ok_or_else(|| self.error())
    }

    fn era_suffix(&mut self) -> bool {
        let rest = &self.bytes[self.pos..];
        if rest.len() >= 3 && rest[..3].eq_ignore_ascii_case(b" BC") {
            self.pos += 3;
            true
        } else {
            false
        }
    }
}
