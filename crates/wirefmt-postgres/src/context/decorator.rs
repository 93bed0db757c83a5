//! Scoped overlays over a base context.

use std::collections::HashMap;
use std::fmt;

use crate::datetime::{DateTimeFormat, Zone};
use crate::types::TypeRegistry;

use super::{BufferAllocator, Charset, Context, KeyData, NumberFormat, RequestExecutor, ServerInfo};

/// A context that answers from its overrides first and from `base` otherwise.
///
/// Overrides are set with the `with_*` builder methods while the decorator is
/// being built. Accessors without an override return the base's own objects,
/// never copies. Decorators may wrap other decorators; [`Context::unwrap`]
/// always reaches the innermost base.
///
/// ```rust,ignore
/// let ctx = BasicContext::default();
/// let scoped = ContextDecorator::new(&ctx).with_zone(Zone::parse("+09:00")?);
/// assert_eq!(scoped.time_zone().local_minus_utc(), 32_400);
/// assert!(std::ptr::addr_eq(scoped.registry(), ctx.registry()));
/// ```
pub struct ContextDecorator<'a> {
    base: &'a dyn Context,
    zone: Option<Zone>,
    charset: Option<Charset>,
    date_format: Option<&'a dyn DateTimeFormat>,
    time_format: Option<&'a dyn DateTimeFormat>,
    timestamp_format: Option<&'a dyn DateTimeFormat>,
    custom_type_map: Option<HashMap<String, String>>,
    settings: HashMap<String, String>,
}

impl<'a> ContextDecorator<'a> {
    /// A decorator with no overrides.
    pub fn new(base: &'a dyn Context) -> Self {
        Self {
            base,
            zone: None,
            charset: None,
            date_format: None,
            time_format: None,
            timestamp_format: None,
            custom_type_map: None,
            settings: HashMap::new(),
        }
    }

    /// The context this decorator wraps directly.
    pub fn base(&self) -> &'a dyn Context {
        self.base
    }

    #[must_use]
    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zone = Some(zone);
        self
    }

    #[must_use]
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = Some(charset);
        self
    }

    #[must_use]
    pub fn with_date_format(mut self, format: &'a dyn DateTimeFormat) -> Self {
        self.date_format = Some(format);
        self
    }

    #[must_use]
    pub fn with_time_format(mut self, format: &'a dyn DateTimeFormat) -> Self {
        self.time_format = Some(format);
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: &'a dyn DateTimeFormat) -> Self {
        self.timestamp_format = Some(format);
        self
    }

    /// Replace the whole custom type map.
    #[must_use]
    pub fn with_custom_type_map(mut self, map: HashMap<String, String>) -> Self {
        self.custom_type_map = Some(map);
        self
    }

    /// Override a single named setting; others still come from the base.
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }
}

impl fmt::Debug for ContextDecorator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextDecorator")
            .field("zone", &self.zone)
            .field("charset", &self.charset)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Context for ContextDecorator<'_> {
    fn registry(&self) -> &TypeRegistry {
        self.base.registry()
    }

    fn zone(&self) -> &Zone {
        self.zone.as_ref().unwrap_or_else(|| self.base.zone())
    }

    fn charset(&self) -> Charset {
        self.charset.unwrap_or_else(|| self.base.charset())
    }

    fn server_info(&self) -> &ServerInfo {
        self.base.server_info()
    }

    fn key_data(&self) -> Option<KeyData> {
        self.base.key_data()
    }

    fn date_format(&self) -> &dyn DateTimeFormat {
        self.date_format.unwrap_or_else(|| self.base.date_format())
    }

    fn time_format(&self) -> &dyn DateTimeFormat {
        self.time_format.unwrap_or_else(|| self.base.time_format())
    }

    fn timestamp_format(&self) -> &dyn DateTimeFormat {
        self.timestamp_format
            .unwrap_or_else(|| self.base.timestamp_format())
    }

    fn integer_formatter(&self) -> &NumberFormat {
        self.base.integer_formatter()
    }

    fn decimal_formatter(&self) -> &NumberFormat {
        self.base.decimal_formatter()
    }

    fn currency_formatter(&self) -> &NumberFormat {
        self.base.currency_formatter()
    }

    fn custom_type_map(&self) -> &HashMap<String, String> {
        self.custom_type_map
            .as_ref()
            .unwrap_or_else(|| self.base.custom_type_map())
    }

    fn setting(&self, key: &str) -> Option<&str> {
        match self.settings.get(key) {
            Some(value) => Some(value.as_str()),
            None => self.base.setting(key),
        }
    }

    fn request_executor(&self) -> Option<&dyn RequestExecutor> {
        self.base.request_executor()
    }

    fn allocator(&self) -> &dyn BufferAllocator {
        self.base.allocator()
    }

    fn unwrap(&self) -> &dyn Context {
        self.base.unwrap()
    }
}
