//! Providers that choose their codecs from a live context setting.

use std::fmt;
use std::str::FromStr;

use wirefmt_core::{Error, Result};

use super::{CodecProvider, CodecSet};
use crate::context::{Context, Setting};

/// A provider with one [`CodecSet`] per value of a setting.
///
/// The setting is read from the context on every call, so changing it on a
/// connection (or overriding it in a decorator) switches codecs without
/// touching the registry. A value with no registered branch is a
/// configuration error.
///
/// ```rust,ignore
/// let provider = SettingSelectProvider::new(FIELD_DATETIME_FORMAT, &["timetz_"])
///     .branch(DateTimeEncoding::Integer, CodecSet::text(TimeTzText).with_binary(TimeTzBinary))
///     .branch(DateTimeEncoding::Float, CodecSet::text(TimeTzText));
/// ```
pub struct SettingSelectProvider<T> {
    setting: Setting<T>,
    base_names: Vec<&'static str>,
    branches: Vec<(T, CodecSet)>,
}

impl<T> SettingSelectProvider<T>
where
    T: FromStr + PartialEq + fmt::Display,
    T::Err: fmt::Display,
{
    pub fn new(setting: Setting<T>, base_names: &[&'static str]) -> Self {
        Self {
            setting,
            base_names: base_names.to_vec(),
            branches: Vec::new(),
        }
    }

    /// Register the codecs used when the setting equals `value`.
    /// A second branch for the same value replaces the first.
    #[must_use]
    pub fn branch(mut self, value: T, codecs: CodecSet) -> Self {
        match self.branches.iter_mut().find(|(v, _)| *v == value) {
            Some(existing) => existing.1 = codecs,
            None => self.branches.push((value, codecs)),
        }
        self
    }

    pub fn setting(&self) -> &Setting<T> {
        &self.setting
    }

    /// The branch values, in registration order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.branches.iter().map(|(value, _)| value)
    }

    fn resolve(&self, ctx: &dyn Context) -> Result<&CodecSet> {
        let value = self.setting.get(ctx)?;
        let Some((_, codecs)) = self.branches.iter().find(|(v, _)| *v == value) else {
            return Err(Error::config(
                self.setting.name(),
                format!("no codecs registered for '{value}'"),
            ));
        };
        tracing::trace!(
            setting = self.setting.name(),
            value = %value,
            codec = codecs.primitive_type().name(),
            "Selected codec branch"
        );
        Ok(codecs)
    }
}

impl<T> fmt::Debug for SettingSelectProvider<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.branches.iter().map(|(v, _)| v.to_string()).collect();
        f.debug_struct("SettingSelectProvider")
            .field("setting", &self.setting.name())
            .field("base_names", &self.base_names)
            .field("branches", &values)
            .finish()
    }
}

impl<T> CodecProvider for SettingSelectProvider<T>
where
    T: FromStr + PartialEq + fmt::Display + Send + Sync,
    T::Err: fmt::Display,
{
    fn base_names(&self) -> &[&'static str] {
        &self.base_names
    }

    fn select(&self, ctx: &dyn Context) -> Result<&CodecSet> {
        self.resolve(ctx)
    }

    fn binary_unsupported(&self, ctx: &dyn Context) -> Error {
        let name = self.setting.name();
        let value = ctx.setting(name).unwrap_or(self.setting.default_text());
        Error::config(
            name,
            format!(
                "binary format of {} is not available when {name} = '{value}'",
                self.base_names.join("/")
            ),
        )
    }
}
