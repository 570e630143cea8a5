//! The section → option → raw string table everything else reads from.
//!
//! Option names are lower-cased on every insert and every lookup, in all
//! sections including `DEFAULT`; see [`normalize_option`]. Section names are
//! kept exactly as written. Values are stored raw: interpolation only
//! happens when a value is read through an accessor.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::ConfigError;
use crate::ini;
use crate::interpolate;
use crate::merge;

/// Name of the section whose options are visible from every other section.
pub const DEFAULT_SECTION: &str = "DEFAULT";

type Options = IndexMap<String, String>;

/// Normalize an option name. Applied to keys in every section and to
/// interpolation placeholder names, so the two always agree.
pub fn normalize_option(option: &str) -> String {
    option.to_lowercase()
}

/// An ordered, in-memory INI table with a `DEFAULT` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    defaults: Options,
    sections: IndexMap<String, Options>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse INI text into a new store. `source_name` is used in errors.
    pub fn parse(source_name: &str, text: &str) -> Result<Self, ConfigError> {
        ini::parse(source_name, text)
    }

    /// Read INI text on top of this store. Options already present are
    /// replaced; within `text` itself, duplicates are an error.
    pub fn read_str(&mut self, source_name: &str, text: &str) -> Result<(), ConfigError> {
        let parsed = ini::parse(source_name, text)?;
        merge::overlay(self, parsed);
        Ok(())
    }

    /// Read one INI file on top of this store.
    pub fn read_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.read_str(&path.display().to_string(), &content)
    }

    /// Read each file in order, skipping the ones that do not exist.
    /// Returns the paths that were actually read.
    pub fn read_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<Vec<PathBuf>, ConfigError> {
        let mut read = Vec::new();
        for path in paths {
            let path = path.as_ref();
            match std::fs::read_to_string(path) {
                Ok(content) => {
                    self.read_str(&path.display().to_string(), &content)?;
                    read.push(path.to_path_buf());
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "config file not found, skipping");
                }
                Err(e) => {
                    return Err(ConfigError::IoError {
                        path: path.to_path_buf(),
                        source: e,
                    });
                }
            }
        }
        Ok(read)
    }

    /// Render the store back to INI text, `DEFAULT` first.
    pub fn to_ini(&self) -> String {
        ini::write(self)
    }

    pub fn add_section(&mut self, name: &str) -> Result<(), ConfigError> {
        if name == DEFAULT_SECTION || self.sections.contains_key(name) {
            return Err(ConfigError::DuplicateSection {
                section: name.to_string(),
            });
        }
        self.sections.insert(name.to_string(), Options::new());
        Ok(())
    }

    /// True if `name` is a regular section. `DEFAULT` is not one.
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Regular section names in insertion order.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn remove_section(&mut self, name: &str) -> bool {
        self.sections.shift_remove(name).is_some()
    }

    pub fn defaults(&self) -> &IndexMap<String, String> {
        &self.defaults
    }

    pub fn has_option(&self, section: &str, option: &str) -> bool {
        let key = normalize_option(option);
        if section == DEFAULT_SECTION {
            return self.defaults.contains_key(&key);
        }
        match self.sections.get(section) {
            Some(options) => options.contains_key(&key) || self.defaults.contains_key(&key),
            None => false,
        }
    }

    /// Option names visible from `section`: its own, then the `DEFAULT`
    /// ones it does not shadow.
    pub fn options(&self, section: &str) -> Result<Vec<String>, ConfigError> {
        Ok(self
            .raw_items(section)?
            .into_iter()
            .map(|(key, _)| key.to_string())
            .collect())
    }

    /// All raw `(option, value)` pairs visible from `section`, in the same
    /// order as [`options`](Self::options).
    pub fn raw_items(&self, section: &str) -> Result<Vec<(&str, &str)>, ConfigError> {
        let own = self.section_table(section)?;
        let mut items: Vec<(&str, &str)> = own
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if section != DEFAULT_SECTION {
            items.extend(
                self.defaults
                    .iter()
                    .filter(|(k, _)| !own.contains_key(*k))
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            );
        }
        Ok(items)
    }

    /// The raw, uninterpolated value of `option` as seen from `section`.
    ///
    /// A missing section is an error; a missing option is `Ok(None)`.
    pub fn get_raw(&self, section: &str, option: &str) -> Result<Option<&str>, ConfigError> {
        self.section_table(section)?;
        Ok(self.lookup(section, &normalize_option(option)))
    }

    /// Set an option. `section` may be `DEFAULT`; any other section must
    /// already exist.
    pub fn set(&mut self, section: &str, option: &str, value: &str) -> Result<(), ConfigError> {
        if section != DEFAULT_SECTION && !self.sections.contains_key(section) {
            return Err(ConfigError::MissingSection(section.to_string()));
        }
        self.insert(section, option, value);
        Ok(())
    }

    /// Remove an option from `section` itself (not from `DEFAULT`).
    pub fn remove_option(&mut self, section: &str, option: &str) -> Result<bool, ConfigError> {
        let key = normalize_option(option);
        let table = if section == DEFAULT_SECTION {
            &mut self.defaults
        } else {
            self.sections
                .get_mut(section)
                .ok_or_else(|| ConfigError::MissingSection(section.to_string()))?
        };
        Ok(table.shift_remove(&key).is_some())
    }

    /// Look up and interpolate `option` in `section`.
    ///
    /// Absence is reported as `MissingSection` / `MissingOption`; the
    /// accessors turn those into fallbacks.
    pub(crate) fn resolve(&self, section: &str, option: &str) -> Result<String, ConfigError> {
        let raw = self
            .get_raw(section, option)?
            .ok_or_else(|| ConfigError::missing_option(section, option))?;
        interpolate::interpolate(raw, section, option, |name| self.lookup(section, name))
    }

    /// Insert without checks, creating the section if needed.
    pub(crate) fn insert(&mut self, section: &str, option: &str, value: &str) {
        let table = if section == DEFAULT_SECTION {
            &mut self.defaults
        } else {
            self.sections.entry(section.to_string()).or_default()
        };
        table.insert(normalize_option(option), value.to_string());
    }

    pub(crate) fn ensure_section(&mut self, section: &str) {
        if section != DEFAULT_SECTION {
            self.sections.entry(section.to_string()).or_default();
        }
    }

    /// Mutable access to an option stored directly in `section`.
    pub(crate) fn value_mut(&mut self, section: &str, key: &str) -> Option<&mut String> {
        if section == DEFAULT_SECTION {
            self.defaults.get_mut(key)
        } else {
            self.sections.get_mut(section)?.get_mut(key)
        }
    }

    /// Options stored directly in `section`, without `DEFAULT`.
    pub(crate) fn own_items(&self, section: &str) -> impl Iterator<Item = (&str, &str)> {
        let table = if section == DEFAULT_SECTION {
            Some(&self.defaults)
        } else {
            self.sections.get(section)
        };
        table
            .into_iter()
            .flat_map(|t| t.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Merged lookup of an already-normalized key.
    fn lookup(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|options| options.get(key))
            .or_else(|| self.defaults.get(key))
            .map(String::as_str)
    }

    fn section_table(&self, section: &str) -> Result<&Options, ConfigError> {
        if section == DEFAULT_SECTION {
            return Ok(&self.defaults);
        }
        self.sections
            .get(section)
            .ok_or_else(|| ConfigError::MissingSection(section.to_string()))
    }
}

impl FromStr for Store {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Store::parse("<string>", s)
    }
}
