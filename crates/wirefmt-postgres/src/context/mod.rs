//! Codec context: the per-connection configuration codecs read.
//!
//! A [`Context`] exposes everything a text or binary codec may need: the type
//! registry, the session time zone, the client charset, locale formats and
//! named settings. [`BasicContext`] is the connection-owned implementation;
//! [`ContextDecorator`] overlays a few fields for the extent of one operation.
//!
//! # Example
//!
//! ```rust,ignore
//! use wirefmt_postgres::{BasicContext, ContextConfig, ContextDecorator, Zone};
//!
//! let mut ctx = BasicContext::new(ContextConfig::new().time_zone("+02:00"))?;
//! ctx.apply_parameter_status("integer_datetimes", "on");
//!
//! let statement_ctx = ContextDecorator::new(&ctx).with_zone(Zone::utc());
//! assert_eq!(statement_ctx.time_zone_id(), "UTC");
//! ```

pub mod decorator;
pub mod number;
pub mod settings;

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bytes::BytesMut;
use chrono::FixedOffset;
use wirefmt_core::{Error, Result};

use crate::config::ContextConfig;
use crate::datetime::{DateTimeFormat, IsoDateFormat, IsoTimeFormat, IsoTimestampFormat, Zone};
use crate::types::TypeRegistry;

pub use decorator::ContextDecorator;
pub use number::NumberFormat;
pub use settings::{DateTimeEncoding, FIELD_DATETIME_FORMAT, Setting};

/// Connection-scoped configuration consumed by codecs.
///
/// Implementations hand out borrowed objects; callers never receive copies of
/// the registry, formats or allocator.
pub trait Context: Send + Sync {
    /// The live set of known types.
    fn registry(&self) -> &TypeRegistry;

    /// The session time zone.
    fn zone(&self) -> &Zone;

    /// The session time zone as a fixed offset.
    fn time_zone(&self) -> FixedOffset {
        self.zone().offset()
    }

    /// The session time zone id.
    fn time_zone_id(&self) -> &str {
        self.zone().id()
    }

    fn charset(&self) -> Charset;

    fn server_info(&self) -> &ServerInfo;

    /// Backend key data used for out-of-band cancellation.
    fn key_data(&self) -> Option<KeyData>;

    fn date_format(&self) -> &dyn DateTimeFormat;

    fn time_format(&self) -> &dyn DateTimeFormat;

    fn timestamp_format(&self) -> &dyn DateTimeFormat;

    fn integer_formatter(&self) -> &NumberFormat;

    fn decimal_formatter(&self) -> &NumberFormat;

    fn currency_formatter(&self) -> &NumberFormat;

    /// User type names mapped to host type names.
    fn custom_type_map(&self) -> &HashMap<String, String>;

    /// Raw text of a named setting, if set.
    fn setting(&self, key: &str) -> Option<&str>;

    fn request_executor(&self) -> Option<&dyn RequestExecutor>;

    fn allocator(&self) -> &dyn BufferAllocator;

    /// The innermost context, looking through any decorators.
    fn unwrap(&self) -> &dyn Context;
}

impl dyn Context + '_ {
    /// Read a typed setting, falling back to its default.
    pub fn get_setting<T>(&self, setting: &Setting<T>) -> Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        setting.get(self)
    }

    /// Whether two context references denote the same connection context.
    pub fn same_connection(&self, other: &dyn Context) -> bool {
        std::ptr::addr_eq(self.unwrap(), other.unwrap())
    }
}

/// Client character sets supported by the text path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    #[default]
    Utf8,
    Latin1,
    /// No validation; bytes above 0x7f are passed through lossily
    SqlAscii,
}

impl Charset {
    /// Look up a charset by its server (`client_encoding`) or IANA name.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "utf8" | "unicode" => Some(Charset::Utf8),
            "latin1" | "iso88591" => Some(Charset::Latin1),
            "sqlascii" | "ascii" => Some(Charset::SqlAscii),
            _ => None,
        }
    }

    /// The server's name for the charset.
    pub const fn name(self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF8",
            Charset::Latin1 => "LATIN1",
            Charset::SqlAscii => "SQL_ASCII",
        }
    }

    /// Decode wire bytes into text.
    pub fn decode<'a>(self, bytes: &'a [u8]) -> Result<Cow<'a, str>> {
        match self {
            Charset::Utf8 => std::str::from_utf8(bytes).map(Cow::Borrowed).map_err(|e| {
                Error::protocol(format!("invalid UTF8 text at byte {}", e.valid_up_to()))
            }),
            Charset::Latin1 => Ok(if bytes.is_ascii() {
                // ASCII is valid UTF-8
                Cow::Borrowed(std::str::from_utf8(bytes).unwrap_or_default())
            } else {
                Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
            }),
            Charset::SqlAscii => Ok(String::from_utf8_lossy(bytes)),
        }
    }

    /// Encode text into wire bytes.
    pub fn encode<'a>(self, text: &'a str) -> Result<Cow<'a, [u8]>> {
        match self {
            Charset::Utf8 | Charset::SqlAscii => Ok(Cow::Borrowed(text.as_bytes())),
            Charset::Latin1 if text.is_ascii() => Ok(Cow::Borrowed(text.as_bytes())),
            Charset::Latin1 => text
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c))
                        .map_err(|_| Error::type_mismatch("LATIN1 text", format_args!("{c:?}")))
                })
                .collect::<Result<Vec<u8>>>()
                .map(Cow::Owned),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Server version as reported in the `server_version` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `16.2`, `9.6.24` or `17beta1 (Debian 17~beta1-1)`.
    pub fn parse(text: &str) -> Option<Self> {
        let head = text.split_whitespace().next()?;
        let mut parts = head.split('.').map(|part| {
            let digits = part.bytes().take_while(u8::is_ascii_digit).count();
            part[..digits].parse::<u32>().ok()
        });
        let major = parts.next()??;
        let minor = parts.next().flatten().unwrap_or(0);
        let patch = parts.next().flatten().unwrap_or(0);
        Some(Self::new(major, minor, patch))
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Server metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerInfo {
    pub version: ServerVersion,
    /// Every `ParameterStatus` value the server reported, by name
    pub parameters: HashMap<String, String>,
}

impl ServerInfo {
    pub fn is_at_least(&self, major: u32, minor: u32) -> bool {
        (self.version.major, self.version.minor) >= (major, minor)
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }
}

/// Backend key data from `BackendKeyData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyData {
    pub process_id: i32,
    pub secret_key: i32,
}

/// The channel that executes requests on a connection.
///
/// Implemented by the connection layer; this crate only consumes it.
pub trait RequestExecutor: Send + Sync {
    /// Ask the server to cancel the request running under `key`.
    fn cancel(&self, key: &KeyData) -> Result<()>;

    fn is_connected(&self) -> bool;
}

/// Source of outgoing wire buffers.
pub trait BufferAllocator: Send + Sync {
    fn buffer(&self, capacity: usize) -> BytesMut;
}

/// Allocates fresh heap buffers.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapAllocator;

impl BufferAllocator for HeapAllocator {
    fn buffer(&self, capacity: usize) -> BytesMut {
        BytesMut::with_capacity(capacity)
    }
}

/// Connection-owned context.
///
/// Created at connection setup from a [`ContextConfig`] and updated as the
/// server reports parameter changes. Mutation goes through `&mut self`, so a
/// decorator borrowing the context blocks changes while it is alive.
pub struct BasicContext {
    registry: TypeRegistry,
    zone: Zone,
    charset: Charset,
    server_info: ServerInfo,
    key_data: Option<KeyData>,
    date_format: Arc<dyn DateTimeFormat>,
    time_format: Arc<dyn DateTimeFormat>,
    timestamp_format: Arc<dyn DateTimeFormat>,
    integer_formatter: NumberFormat,
    decimal_formatter: NumberFormat,
    currency_formatter: NumberFormat,
    custom_type_map: HashMap<String, String>,
    settings: HashMap<String, String>,
    request_executor: Option<Arc<dyn RequestExecutor>>,
    allocator: Arc<dyn BufferAllocator>,
}

impl fmt::Debug for BasicContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicContext")
            .field("zone", &self.zone)
            .field("charset", &self.charset)
            .field("server_version", &self.server_info.version)
            .field("settings", &self.settings)
            .field("connected", &self.request_executor.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for BasicContext {
    fn default() -> Self {
        Self::with_registry(TypeRegistry::new())
    }
}

impl BasicContext {
    /// Build a context from configuration.
    pub fn new(config: ContextConfig) -> Result<Self> {
        let mut ctx = Self::default();

        ctx.zone = Zone::parse(&config.time_zone)
            .map_err(|e| Error::config("time_zone", e.to_string()))?;
        ctx.charset = Charset::from_name(&config.client_encoding).ok_or_else(|| {
            Error::config(
                "client_encoding",
                format!("unsupported charset '{}'", config.client_encoding),
            )
        })?;
        ctx.currency_formatter = NumberFormat::currency(config.currency_symbol);
        ctx.settings = config.settings;
        ctx.custom_type_map = config.custom_types;

        // Fail at setup rather than on the first binary decode.
        FIELD_DATETIME_FORMAT.get(&ctx)?;

        tracing::debug!(
            zone = %ctx.zone,
            charset = %ctx.charset,
            settings = ctx.settings.len(),
            "Created codec context"
        );
        Ok(ctx)
    }

    /// A context with default configuration over `registry`.
    pub fn with_registry(registry: TypeRegistry) -> Self {
        Self {
            registry,
            zone: Zone::utc(),
            charset: Charset::Utf8,
            server_info: ServerInfo::default(),
            key_data: None,
            date_format: Arc::new(IsoDateFormat),
            time_format: Arc::new(IsoTimeFormat),
            timestamp_format: Arc::new(IsoTimestampFormat),
            integer_formatter: NumberFormat::integer(),
            decimal_formatter: NumberFormat::decimal(),
            currency_formatter: NumberFormat::currency("$"),
            custom_type_map: HashMap::new(),
            settings: HashMap::new(),
            request_executor: None,
            allocator: Arc::new(HeapAllocator),
        }
    }

    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    pub fn set_zone(&mut self, zone: Zone) {
        self.zone = zone;
    }

    pub fn set_charset(&mut self, charset: Charset) {
        self.charset = charset;
    }

    pub fn set_key_data(&mut self, key_data: KeyData) {
        self.key_data = Some(key_data);
    }

    pub fn set_date_format(&mut self, format: Arc<dyn DateTimeFormat>) {
        self.date_format = format;
    }

    pub fn set_time_format(&mut self, format: Arc<dyn DateTimeFormat>) {
        self.time_format = format;
    }

    pub fn set_timestamp_format(&mut self, format: Arc<dyn DateTimeFormat>) {
        self.timestamp_format = format;
    }

    pub fn set_currency_formatter(&mut self, format: NumberFormat) {
        self.currency_formatter = format;
    }

    pub fn set_setting(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.settings.insert(key.into(), value.into());
    }

    pub fn remove_setting(&mut self, key: &str) -> Option<String> {
        self.settings.remove(key)
    }

    pub fn map_custom_type(&mut self, type_name: impl Into<String>, host_type: impl Into<String>) {
        self.custom_type_map.insert(type_name.into(), host_type.into());
    }

    pub fn set_request_executor(&mut self, executor: Option<Arc<dyn RequestExecutor>>) {
        self.request_executor = executor;
    }

    pub fn set_allocator(&mut self, allocator: Arc<dyn BufferAllocator>) {
        self.allocator = allocator;
    }

    /// Record a `ParameterStatus` message from the server.
    ///
    /// Known parameters update the matching context field. Values this crate
    /// cannot interpret are logged and leave the field unchanged.
    pub fn apply_parameter_status(&mut self, name: &str, value: &str) {
        match name {
            "TimeZone" => match Zone::parse(value) {
                Ok(zone) => self.zone = zone,
                Err(e) => tracing::warn!(value, error = %e, "Ignoring server time zone"),
            },
            "client_encoding" => match Charset::from_name(value) {
                Some(charset) => self.charset = charset,
                None => tracing::warn!(value, "Ignoring unsupported client encoding"),
            },
            settings::INTEGER_DATETIMES_PARAMETER => match value.parse::<DateTimeEncoding>() {
                Ok(encoding) => {
                    self.set_setting(FIELD_DATETIME_FORMAT.name(), encoding.as_str());
                }
                Err(e) => tracing::warn!(value, error = %e, "Ignoring integer_datetimes"),
            },
            "server_version" => match ServerVersion::parse(value) {
                Some(version) => self.server_info.version = version,
                None => tracing::warn!(value, "Unparseable server version"),
            },
            "DateStyle" => {
                if !value.trim_start().to_ascii_uppercase().starts_with("ISO") {
                    tracing::warn!(value, "Server DateStyle is not ISO; text dates may not parse");
                }
            }
            _ => {}
        }
        tracing::trace!(name, value, "Parameter status");
        self.server_info
            .parameters
            .insert(name.to_string(), value.to_string());
    }
}

impl Context for BasicContext {
    fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    fn zone(&self) -> &Zone {
        &self.zone
    }

    fn charset(&self) -> Charset {
        self.charset
    }

    fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    fn key_data(&self) -> Option<KeyData> {
        self.key_data
    }

    fn date_format(&self) -> &dyn DateTimeFormat {
        self.date_format.as_ref()
    }

    fn time_format(&self) -> &dyn DateTimeFormat {
        self.time_format.as_ref()
    }

    fn timestamp_format(&self) -> &dyn DateTimeFormat {
        self.timestamp_format.as_ref()
    }

    fn integer_formatter(&self) -> &NumberFormat {
        &self.integer_formatter
    }

    fn decimal_formatter(&self) -> &NumberFormat {
        &self.decimal_formatter
    }

    fn currency_formatter(&self) -> &NumberFormat {
        &self.currency_formatter
    }

    fn custom_type_map(&self) -> &HashMap<String, String> {
        &self.custom_type_map
    }

    fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    fn request_executor(&self) -> Option<&dyn RequestExecutor> {
        self.request_executor.as_deref()
    }

    fn allocator(&self) -> &dyn BufferAllocator {
        self.allocator.as_ref()
    }

    fn unwrap(&self) -> &dyn Context {
        self
    }
}
