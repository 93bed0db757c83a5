//! Named settings read by codecs at call time.
//!
//! Settings are stored as text on the context, like the server's own
//! `ParameterStatus` values. A [`Setting`] key knows its name, its default
//! and how to parse the stored text into a typed value.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use wirefmt_core::{Error, Result};

use super::Context;

/// A typed setting key.
pub struct Setting<T> {
    name: &'static str,
    default: &'static str,
    description: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<T> Clone for Setting<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Setting<T> {}

impl<T> fmt::Debug for Setting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setting")
            .field("name", &self.name)
            .field("default", &self.default)
            .finish()
    }
}

impl<T> Setting<T> {
    pub const fn new(name: &'static str, default: &'static str, description: &'static str) -> Self {
        Self {
            name,
            default,
            description,
            _value: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Text used when the context has no value for this setting.
    pub const fn default_text(&self) -> &'static str {
        self.default
    }

    pub const fn description(&self) -> &'static str {
        self.description
    }
}

impl<T> Setting<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    /// Read the live value from `ctx`, falling back to the default.
    ///
    /// Text that does not parse is a configuration error naming the setting.
    pub fn get(&self, ctx: &dyn Context) -> Result<T> {
        let raw = ctx.setting(self.name).unwrap_or(self.default);
        raw.parse().map_err(|e: T::Err| {
            Error::config(self.name, format!("cannot interpret '{raw}': {e}"))
        })
    }
}

/// How the server stores date/time values in binary form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateTimeEncoding {
    /// 64-bit integer microseconds
    Integer,
    /// Double-precision seconds (servers built with float datetimes)
    Float,
}

impl DateTimeEncoding {
    pub const fn as_str(self) -> &'static str {
        match self {
            DateTimeEncoding::Integer => "integer",
            DateTimeEncoding::Float => "float",
        }
    }
}

impl fmt::Display for DateTimeEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateTimeEncoding {
    type Err = String;

    /// Accepts the setting's own values and the server's `integer_datetimes`
    /// parameter values (`on` / `off`).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "integer" | "on" | "true" => Ok(DateTimeEncoding::Integer),
            "float" | "off" | "false" => Ok(DateTimeEncoding::Float),
            other => Err(format!("unknown datetime encoding '{other}'")),
        }
    }
}

/// Binary layout of date/time fields.
pub const FIELD_DATETIME_FORMAT: Setting<DateTimeEncoding> = Setting::new(
    "field.datetime.format",
    "integer",
    "Binary encoding of date/time fields: 'integer' or 'float'",
);

/// Server parameter that reports the date/time encoding.
pub const INTEGER_DATETIMES_PARAMETER: &str = "integer_datetimes";
