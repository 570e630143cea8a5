//! Typed accessors over a [`Store`].
//!
//! Every accessor follows the same lookup contract: find the raw value in
//! the section (or `DEFAULT`), interpolate it, convert it. What happens when
//! the option is absent is decided by the [`Fallback`] passed in:
//!
//! | Fallback              | Option absent                       |
//! |-----------------------|-------------------------------------|
//! | `Fallback::Required`  | `MissingSection` / `MissingOption`  |
//! | `Fallback::None`      | `Ok(None)` (lists/sets: empty)      |
//! | `Fallback::Raw(s)`    | `s` converted like a present value  |
//! | `Fallback::Value(v)`  | `v`, returned as-is                 |
//!
//! A present but malformed value is always an error; nothing is silently
//! replaced by the fallback.
//!
//! The accessors exist twice: on [`Store`], taking a section name, and on
//! any [`SectionView`] (a [`Section`] or a [`Component`](crate::Component)),
//! bound to its own section.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDateTime;
use indexmap::IndexMap;

use crate::callback::CallbackRegistry;
use crate::component::{self, Component};
use crate::convert::{self, ConvertError};
use crate::error::ConfigError;
use crate::rate::Rate;
use crate::store::Store;
use crate::timespan::Timespan;

/// What an accessor returns when the option is absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Fallback<T> {
    /// The option must exist.
    Required,
    /// No value: `Ok(None)`, or an empty collection.
    #[default]
    None,
    /// A string converted the same way a stored value would be.
    Raw(String),
    /// A ready value, returned without conversion.
    Value(T),
}

impl<T> Fallback<T> {
    pub fn raw(value: impl Into<String>) -> Self {
        Fallback::Raw(value.into())
    }
}

/// Outcome of the lookup step, before conversion.
pub(crate) enum Lookup<T> {
    /// Text to convert: the interpolated value or a `Raw` fallback.
    Text(String),
    /// Already final: `None` or a `Value` fallback.
    Done(Option<T>),
}

impl Store {
    /// Resolve `option`, applying `fallback` if it is absent.
    pub(crate) fn lookup_or<T>(
        &self,
        section: &str,
        option: &str,
        fallback: Fallback<T>,
    ) -> Result<Lookup<T>, ConfigError> {
        match self.resolve(section, option) {
            Ok(value) => Ok(Lookup::Text(value)),
            Err(e) if e.is_missing() => match fallback {
                Fallback::Required => Err(e),
                Fallback::None => Ok(Lookup::Done(None)),
                Fallback::Raw(value) => Ok(Lookup::Text(value)),
                Fallback::Value(value) => Ok(Lookup::Done(Some(value))),
            },
            Err(e) => Err(e),
        }
    }

    fn convert_with<T, C>(
        &self,
        section: &str,
        option: &str,
        fallback: Fallback<T>,
        conv: C,
    ) -> Result<Option<T>, ConfigError>
    where
        C: Fn(&str) -> Result<T, ConvertError>,
    {
        match self.lookup_or(section, option, fallback)? {
            Lookup::Done(value) => Ok(value),
            Lookup::Text(text) => conv(&text)
                .map(Some)
                .map_err(|source| invalid(section, option, source)),
        }
    }

    /// A section handle for the typed accessors. Fails if `name` is absent.
    pub fn section<'a>(&'a self, name: &'a str) -> Result<Section<'a>, ConfigError> {
        if name != crate::store::DEFAULT_SECTION && !self.has_section(name) {
            return Err(ConfigError::MissingSection(name.to_string()));
        }
        Ok(Section { store: self, name })
    }

    /// The interpolated string value.
    pub fn get(
        &self,
        section: &str,
        option: &str,
        fallback: Fallback<String>,
    ) -> Result<Option<String>, ConfigError> {
        self.convert_with(section, option, fallback, convert::parse_string)
    }

    /// An integer; the radix comes from the literal (`0x`, `0o`, `0b`).
    pub fn get_int(
        &self,
        section: &str,
        option: &str,
        fallback: Fallback<i64>,
    ) -> Result<Option<i64>, ConfigError> {
        self.get_int_radix(section, option, 0, fallback)
    }

    /// An integer in an explicit base (`0` means "from the literal").
    pub fn get_int_radix(
        &self,
        section: &str,
        option: &str,
        base: u32,
        fallback: Fallback<i64>,
    ) -> Result<Option<i64>, ConfigError> {
        self.convert_with(section, option, fallback, |s| convert::parse_int(s, base))
    }

    pub fn get_float(
        &self,
        section: &str,
        option: &str,
        fallback: Fallback<f64>,
    ) -> Result<Option<f64>, ConfigError> {
        self.convert_with(section, option, fallback, convert::parse_float)
    }

    pub fn get_boolean(
        &self,
        section: &str,
        option: &str,
        fallback: Fallback<bool>,
    ) -> Result<Option<bool>, ConfigError> {
        self.convert_with(section, option, fallback, convert::parse_bool)
    }

    /// A whitespace-separated list of strings.
    pub fn get_list(
        &self,
        section: &str,
        option: &str,
        fallback: Fallback<Vec<String>>,
    ) -> Result<Vec<String>, ConfigError> {
        self.get_list_with(section, option, None, convert::parse_string, fallback)
    }

    /// A list split on `sep` (whitespace when `None`), each element
    /// converted with `conv`. Absent with no fallback is an empty list.
    pub fn get_list_with<T, C>(
        &self,
        section: &str,
        option: &str,
        sep: Option<&str>,
        conv: C,
        fallback: Fallback<Vec<T>>,
    ) -> Result<Vec<T>, ConfigError>
    where
        C: Fn(&str) -> Result<T, ConvertError>,
    {
        match self.lookup_or(section, option, fallback)? {
            Lookup::Done(value) => Ok(value.unwrap_or_default()),
            Lookup::Text(text) => convert::split_list(&text, sep)
                .into_iter()
                .map(|item| conv(item).map_err(|source| invalid(section, option, source)))
                .collect(),
        }
    }

    pub fn get_set(
        &self,
        section: &str,
        option: &str,
        fallback: Fallback<BTreeSet<String>>,
    ) -> Result<BTreeSet<String>, ConfigError> {
        self.get_set_with(section, option, None, convert::parse_string, fallback)
    }

    /// Like [`get_list_with`](Self::get_list_with), collected into a set.
    pub fn get_set_with<T, C>(
        &self,
        section: &str,
        option: &str,
        sep: Option<&str>,
        conv: C,
        fallback: Fallback<BTreeSet<T>>,
    ) -> Result<BTreeSet<T>, ConfigError>
    where
        T: Ord,
        C: Fn(&str) -> Result<T, ConvertError>,
    {
        match self.lookup_or(section, option, fallback)? {
            Lookup::Done(value) => Ok(value.unwrap_or_default()),
            Lookup::Text(text) => convert::split_list(&text, sep)
                .into_iter()
                .map(|item| conv(item).map_err(|source| invalid(section, option, source)))
                .collect(),
        }
    }

    /// A byte count from a size such as `100 MiB`.
    pub fn get_bytes(
        &self,
        section: &str,
        option: &str,
        fallback: Fallback<u64>,
    ) -> Result<Option<u64>, ConfigError> {
        self.convert_with(section, option, fallback, convert::parse_size)
    }

    pub fn get_datetime(
        &self,
        section: &str,
        option: &str,
        fallback: Fallback<NaiveDateTime>,
    ) -> Result<Option<NaiveDateTime>, ConfigError> {
        self.convert_with(section, option, fallback, convert::parse_datetime)
    }

    /// A fixed duration: seconds, or a compact form such as `10s` or `5m`.
    pub fn get_timedelta(
        &self,
        section: &str,
        option: &str,
        fallback: Fallback<Duration>,
    ) -> Result<Option<Duration>, ConfigError> {
        self.convert_with(section, option, fallback, convert::parse_duration)
    }

    pub fn get_path(
        &self,
        section: &str,
        option: &str,
        fallback: Fallback<PathBuf>,
    ) -> Result<Option<PathBuf>, ConfigError> {
        self.convert_with(section, option, fallback, convert::parse_path)
    }

    /// A calendar-aware timespan, see [`Timespan::parse`].
    pub fn get_timespan(
        &self,
        section: &str,
        option: &str,
        fallback: Fallback<Timespan>,
    ) -> Result<Option<Timespan>, ConfigError> {
        self.convert_with(section, option, fallback, Timespan::parse)
    }

    /// A [`Rate`] assembled from `option`, `option.period`, `option.sync`,
    /// `option.offset` and `option.at_start`.
    ///
    /// The period comes from `option`, overridden by `option.period`. Every
    /// field falls back to the matching field of a `Value` fallback; a `Raw`
    /// fallback is a period string. Without a period the result is
    /// `Ok(None)`, or `MissingOption` when the fallback is `Required`.
    pub fn get_rate(
        &self,
        section: &str,
        option: &str,
        fallback: Fallback<Rate>,
    ) -> Result<Option<Rate>, ConfigError> {
        let required = matches!(fallback, Fallback::Required);
        let (period_fallback, base) = match fallback {
            Fallback::Value(rate) => (Fallback::Value(rate.period), rate),
            Fallback::Raw(period) => (Fallback::Raw(period), Rate::default()),
            Fallback::None | Fallback::Required => (Fallback::None, Rate::default()),
        };

        let period = self.get_timedelta(section, option, period_fallback)?;
        let period_key = format!("{option}.period");
        let period = match period {
            Some(period) => self.get_timedelta(section, &period_key, Fallback::Value(period))?,
            None => self.get_timedelta(section, &period_key, Fallback::None)?,
        };

        let Some(period) = period else {
            if required {
                self.get_raw(section, option)?;
                return Err(ConfigError::missing_option(section, option));
            }
            return Ok(None);
        };

        let sync = self
            .get_boolean(section, &format!("{option}.sync"), Fallback::Value(base.sync))?
            .unwrap_or(base.sync);
        let offset = self
            .get_timedelta(section, &format!("{option}.offset"), Fallback::Value(base.offset))?
            .unwrap_or(base.offset);
        let at_start = self
            .get_boolean(section, &format!("{option}.at_start"), Fallback::Value(base.at_start))?
            .unwrap_or(base.at_start);

        Ok(Some(Rate {
            period,
            sync,
            offset,
            at_start,
        }))
    }

    /// Synthesize one [`Component`] per name listed in `option` and hand each
    /// to `factory`. See [`component`](crate::component) for the layering.
    pub fn get_components<'p, P, T, E, F>(
        &self,
        section: &str,
        option: &str,
        prefix: &str,
        parent: &'p P,
        factory: F,
    ) -> Result<IndexMap<String, T>, E>
    where
        E: From<ConfigError>,
        F: FnMut(Component, &'p P) -> Result<T, E>,
    {
        let view = Section {
            store: self,
            name: section,
        };
        component::get_components(&view, option, prefix, parent, factory)
    }
}

fn invalid(section: &str, option: &str, source: ConvertError) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        option: option.to_string(),
        source,
    }
}

/// Typed access bound to one section.
///
/// Implementors supply the store and the section name; every getter is
/// provided and forwards to the matching [`Store`] accessor.
pub trait SectionView {
    fn store(&self) -> &Store;
    fn section_name(&self) -> &str;

    /// Option names visible from this section, `DEFAULT` ones last.
    fn options(&self) -> Vec<String> {
        self.store()
            .options(self.section_name())
            .unwrap_or_default()
    }

    fn has_option(&self, option: &str) -> bool {
        self.store().has_option(self.section_name(), option)
    }

    /// Raw `(option, value)` pairs visible from this section.
    fn raw_items(&self) -> Vec<(String, String)> {
        self.store()
            .raw_items(self.section_name())
            .map(|items| {
                items
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn get_raw(&self, option: &str) -> Option<String> {
        self.store()
            .get_raw(self.section_name(), option)
            .ok()
            .flatten()
            .map(str::to_string)
    }

    fn get(&self, option: &str, fallback: Fallback<String>) -> Result<Option<String>, ConfigError> {
        self.store().get(self.section_name(), option, fallback)
    }

    fn get_int(&self, option: &str, fallback: Fallback<i64>) -> Result<Option<i64>, ConfigError> {
        self.store().get_int(self.section_name(), option, fallback)
    }

    fn get_int_radix(
        &self,
        option: &str,
        base: u32,
        fallback: Fallback<i64>,
    ) -> Result<Option<i64>, ConfigError> {
        self.store()
            .get_int_radix(self.section_name(), option, base, fallback)
    }

    fn get_float(&self, option: &str, fallback: Fallback<f64>) -> Result<Option<f64>, ConfigError> {
        self.store().get_float(self.section_name(), option, fallback)
    }

    fn get_boolean(
        &self,
        option: &str,
        fallback: Fallback<bool>,
    ) -> Result<Option<bool>, ConfigError> {
        self.store().get_boolean(self.section_name(), option, fallback)
    }

    fn get_list(
        &self,
        option: &str,
        fallback: Fallback<Vec<String>>,
    ) -> Result<Vec<String>, ConfigError> {
        self.store().get_list(self.section_name(), option, fallback)
    }

    fn get_list_with<T, C>(
        &self,
        option: &str,
        sep: Option<&str>,
        conv: C,
        fallback: Fallback<Vec<T>>,
    ) -> Result<Vec<T>, ConfigError>
    where
        C: Fn(&str) -> Result<T, ConvertError>,
    {
        self.store()
            .get_list_with(self.section_name(), option, sep, conv, fallback)
    }

    fn get_set(
        &self,
        option: &str,
        fallback: Fallback<BTreeSet<String>>,
    ) -> Result<BTreeSet<String>, ConfigError> {
        self.store().get_set(self.section_name(), option, fallback)
    }

    fn get_set_with<T, C>(
        &self,
        option: &str,
        sep: Option<&str>,
        conv: C,
        fallback: Fallback<BTreeSet<T>>,
    ) -> Result<BTreeSet<T>, ConfigError>
    where
        T: Ord,
        C: Fn(&str) -> Result<T, ConvertError>,
    {
        self.store()
            .get_set_with(self.section_name(), option, sep, conv, fallback)
    }

    fn get_bytes(&self, option: &str, fallback: Fallback<u64>) -> Result<Option<u64>, ConfigError> {
        self.store().get_bytes(self.section_name(), option, fallback)
    }

    fn get_datetime(
        &self,
        option: &str,
        fallback: Fallback<NaiveDateTime>,
    ) -> Result<Option<NaiveDateTime>, ConfigError> {
        self.store().get_datetime(self.section_name(), option, fallback)
    }

    fn get_timedelta(
        &self,
        option: &str,
        fallback: Fallback<Duration>,
    ) -> Result<Option<Duration>, ConfigError> {
        self.store().get_timedelta(self.section_name(), option, fallback)
    }

    fn get_path(
        &self,
        option: &str,
        fallback: Fallback<PathBuf>,
    ) -> Result<Option<PathBuf>, ConfigError> {
        self.store().get_path(self.section_name(), option, fallback)
    }

    fn get_timespan(
        &self,
        option: &str,
        fallback: Fallback<Timespan>,
    ) -> Result<Option<Timespan>, ConfigError> {
        self.store().get_timespan(self.section_name(), option, fallback)
    }

    fn get_rate(&self, option: &str, fallback: Fallback<Rate>) -> Result<Option<Rate>, ConfigError> {
        self.store().get_rate(self.section_name(), option, fallback)
    }

    fn get_components<'p, P, T, E, F>(
        &self,
        option: &str,
        prefix: &str,
        parent: &'p P,
        factory: F,
    ) -> Result<IndexMap<String, T>, E>
    where
        Self: Sized,
        E: From<ConfigError>,
        F: FnMut(Component, &'p P) -> Result<T, E>,
    {
        component::get_components(self, option, prefix, parent, factory)
    }

    fn get_callback<F: Clone>(
        &self,
        option: &str,
        registry: &CallbackRegistry<F>,
        fallback: Fallback<F>,
    ) -> Result<Option<F>, ConfigError> {
        self.store()
            .get_callback(self.section_name(), option, registry, fallback)
    }
}

/// A borrowed view of one section of a [`Store`].
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    store: &'a Store,
    name: &'a str,
}

impl SectionView for Section<'_> {
    fn store(&self) -> &Store {
        self.store
    }

    fn section_name(&self) -> &str {
        self.name
    }
}
