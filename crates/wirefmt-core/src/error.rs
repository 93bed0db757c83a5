//! Error types for codec and context operations.

use std::fmt;

/// The primary error type for all wirefmt operations.
#[derive(Debug)]
pub enum Error {
    /// Wire payload does not match the layout of its type
    Protocol(ProtocolError),
    /// Value could not be converted (unparseable text, wrong host type)
    Type(TypeError),
    /// A setting holds a value no codec is registered for
    Config(ConfigError),
    /// Required construction input is absent or malformed
    InvalidArgument(InvalidArgumentError),
}

#[derive(Debug)]
pub struct ProtocolError {
    pub message: String,
    /// Bytes of the rejected value, when they were read
    pub raw_data: Option<Vec<u8>>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub rust_type: Option<&'static str>,
}

#[derive(Debug)]
pub struct ConfigError {
    /// Name of the setting involved, when there is one
    pub setting: Option<String>,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug)]
pub struct InvalidArgumentError {
    /// The argument that was rejected
    pub argument: &'static str,
    pub message: String,
}

impl Error {
    /// Build a protocol error for a binary payload whose declared length is wrong.
    pub fn invalid_length(type_name: &str, expected: i32, actual: i32) -> Self {
        Error::Protocol(ProtocolError {
            message: format!("invalid length for {type_name}: expected {expected} bytes, got {actual}"),
            raw_data: None,
            source: None,
        })
    }

    /// Build a protocol error with a plain message.
    pub fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol(ProtocolError {
            message: message.into(),
            raw_data: None,
            source: None,
        })
    }

    /// Build a configuration error tied to a setting name.
    pub fn config(setting: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config(ConfigError {
            setting: Some(setting.into()),
            message: message.into(),
            source: None,
        })
    }

    /// Build an invalid-argument error.
    pub fn invalid_argument(argument: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidArgument(InvalidArgumentError {
            argument,
            message: message.into(),
        })
    }

    /// Build a type error from the expected shape and the offending input.
    pub fn type_mismatch(expected: &'static str, actual: impl fmt::Display) -> Self {
        Error::Type(TypeError {
            expected,
            actual: format!("invalid value: {actual}"),
            rust_type: None,
        })
    }

    /// Attach the offending wire bytes to a protocol error.
    ///
    /// Other kinds of error are returned unchanged.
    #[must_use]
    pub fn with_raw_data(mut self, data: &[u8]) -> Self {
        if let Error::Protocol(e) = &mut self {
            e.raw_data = Some(data.to_vec());
        }
        self
    }

    /// Wire bytes of the rejected value, if they were captured.
    pub fn raw_data(&self) -> Option<&[u8]> {
        match self {
            Error::Protocol(e) => e.raw_data.as_deref(),
            _ => None,
        }
    }

    /// Is this a wire-level error that leaves the current message unreadable?
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }

    /// Is this caused by connection or statement configuration?
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Name of the setting that caused this error, if any.
    pub fn setting(&self) -> Option<&str> {
        match self {
            Error::Config(c) => c.setting.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Protocol(e) => write!(f, "Protocol error: {}", e.message),
            Error::Type(e) => write!(f, "Type error: {e}"),
            Error::Config(e) => write!(f, "Configuration error: {e}"),
            Error::InvalidArgument(e) => write!(f, "Invalid argument: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Protocol(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Config(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}, found {}", self.expected, self.actual)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(setting) = &self.setting {
            write!(f, "{} (setting '{}')", self.message, setting)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.argument, self.message)
    }
}

impl From<ProtocolError> for Error {
    fn from(err: ProtocolError) -> Self {
        Error::Protocol(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<InvalidArgumentError> for Error {
    fn from(err: InvalidArgumentError) -> Self {
        Error::InvalidArgument(err)
    }
}

/// Result type alias for wirefmt operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_length_is_protocol_error() {
        let err = Error::invalid_length("timetz", 12, 11);
        assert!(err.is_protocol_error());
        assert!(!err.is_config_error());
        assert_eq!(
            err.to_string(),
            "Protocol error: invalid length for timetz: expected 12 bytes, got 11"
        );
    }

    #[test]
    fn config_error_carries_setting() {
        let err = Error::config("field.datetime.format", "unsupported value 'double'");
        assert!(err.is_config_error());
        assert_eq!(err.setting(), Some("field.datetime.format"));
        assert_eq!(
            err.to_string(),
            "Configuration error: unsupported value 'double' (setting 'field.datetime.format')"
        );
    }

    #[test]
    fn invalid_argument_display() {
        let err = Error::invalid_argument("namespace", "must not be absent");
        assert_eq!(err.to_string(), "Invalid argument: namespace: must not be absent");
        assert_eq!(err.setting(), None);
    }

    #[test]
    fn type_error_display() {
        let err = Error::type_mismatch("time", "25:00");
        assert_eq!(
            err.to_string(),
            "Type error: expected time, found invalid value: 25:00"
        );
        assert_eq!(err.raw_data(), None);
    }

    #[test]
    fn raw_data_only_sticks_to_protocol_errors() {
        let err = Error::invalid_length("date", 4, 3).with_raw_data(&[1, 2, 3]);
        assert_eq!(err.raw_data(), Some(&[1_u8, 2, 3][..]));

        let err = Error::config("field.datetime.format", "bad").with_raw_data(&[1]);
        assert_eq!(err.raw_data(), None);
    }

    #[test]
    fn source_is_forwarded() {
        use std::error::Error as _;

        let inner = std::io::Error::other("short read");
        let err = Error::Protocol(ProtocolError {
            message: "truncated payload".to_string(),
            raw_data: Some(vec![0, 0, 0]),
            source: Some(Box::new(inner)),
        });
        assert!(err.source().is_some());
        assert!(Error::type_mismatch("date", "x").source().is_none());
    }
}
