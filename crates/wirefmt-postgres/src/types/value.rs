//! Host values exchanged with codecs.

use wirefmt_core::{Error, Result};

use crate::datetime::Instant;

/// A decoded, non-NULL value. SQL NULL travels as `None` beside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    /// Any date, time or timestamp
    Instant(Instant),
    /// Monetary amount in cents
    Money(i64),
}

/// The host-side type a codec produces or consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostType {
    Instant,
    Money,
}

impl HostType {
    pub const fn name(self) -> &'static str {
        match self {
            HostType::Instant => "Instant",
            HostType::Money => "Money",
        }
    }
}

impl Value {
    pub const fn host_type(&self) -> HostType {
        match self {
            Value::Instant(_) => HostType::Instant,
            Value::Money(_) => HostType::Money,
        }
    }

    /// Borrow the instant, or fail with a type error naming `sql_type`.
    pub fn as_instant(&self, sql_type: &'static str) -> Result<&Instant> {
        match self {
            Value::Instant(instant) => Ok(instant),
            other => Err(wrong_host_type(sql_type, *other)),
        }
    }

    /// The amount in cents, or a type error.
    pub fn as_money(&self) -> Result<i64> {
        match self {
            Value::Money(cents) => Ok(*cents),
            other => Err(wrong_host_type("money", *other)),
        }
    }
}

impl From<Instant> for Value {
    fn from(instant: Instant) -> Self {
        Value::Instant(instant)
    }
}

fn wrong_host_type(sql_type: &'static str, value: Value) -> Error {
    Error::Type(wirefmt_core::TypeError {
        expected: sql_type,
        actual: format!("host value of type {}", value.host_type().name()),
        rust_type: Some(value.host_type().name()),
    })
}
