use std::path::PathBuf;

use tracing::debug;

use crate::error::ConfigError;
use crate::file;
use crate::ops::{self, ConfigResult};
use crate::resolve::{self, Override, ResolveInput};
use crate::store::Store;
use crate::types::{ConfigAction, SearchMode, SearchPath};

/// Entry point for loading a layered INI configuration.
pub struct Stratini;

impl Stratini {
    pub fn builder() -> StratiniBuilder {
        StratiniBuilder::new()
    }
}

/// Builder for discovering, merging and loading INI files into a [`Store`].
///
/// Two independent axes (see [`types`](crate::types) for common patterns):
///
/// - **Discovery**: [`search_paths()`](Self::search_paths), where to look.
/// - **Resolution**: [`search_mode()`](Self::search_mode), merge all or pick one.
///
/// Overrides set with [`set_override()`](Self::set_override) sit above every
/// file.
#[derive(Debug, Clone, Default)]
pub struct StratiniBuilder {
    app_name: Option<String>,
    file_name: Option<String>,
    search_paths: Option<Vec<SearchPath>>,
    search_mode: SearchMode,
    files: Vec<PathBuf>,
    overrides: Vec<Override>,
}

impl StratiniBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Set the application name. This derives sensible defaults:
    /// - `file_name` → `"{app_name}.ini"`
    /// - `search_paths` → `[SearchPath::Platform]`
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    /// Override the config file name (default: `"{app_name}.ini"`).
    pub fn file_name(mut self, name: &str) -> Self {
        self.file_name = Some(name.to_string());
        self
    }

    /// Replace the default search paths entirely.
    ///
    /// Paths are listed in **priority-ascending** order: the last entry has the
    /// highest priority.
    pub fn search_paths(mut self, paths: Vec<SearchPath>) -> Self {
        self.search_paths = Some(paths);
        self
    }

    /// Append a search path without replacing the defaults.
    /// If no paths have been set yet, starts from the default `[Platform]`.
    pub fn add_search_path(mut self, path: SearchPath) -> Self {
        self.search_paths
            .get_or_insert_with(|| vec![SearchPath::Platform])
            .push(path);
        self
    }

    /// Set the search mode (default: [`SearchMode::Merge`]).
    pub fn search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    /// Read an explicit file after the discovered ones, whatever its name.
    /// A missing file is skipped like a missing discovered one.
    pub fn add_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Set `section.option` above every file. `None` values are ignored,
    /// which suits optional clap args. `section` may be `DEFAULT`.
    pub fn set_override<V: ToString>(
        mut self,
        section: &str,
        option: &str,
        value: Option<V>,
    ) -> Self {
        if let Some(v) = value {
            self.overrides.push(Override {
                section: section.to_string(),
                option: option.to_string(),
                value: v.to_string(),
            });
        }
        self
    }

    fn effective_app_name(&self) -> Result<&str, ConfigError> {
        self.app_name.as_deref().ok_or(ConfigError::AppNameRequired)
    }

    fn effective_file_name(&self) -> Result<String, ConfigError> {
        if let Some(name) = &self.file_name {
            return Ok(name.clone());
        }
        let app = self.effective_app_name()?;
        Ok(format!("{app}.ini"))
    }

    fn effective_search_paths(&self) -> Vec<SearchPath> {
        self.search_paths
            .clone()
            .unwrap_or_else(|| vec![SearchPath::Platform])
    }

    fn build_input(&self) -> Result<ResolveInput, ConfigError> {
        let app_name = self.effective_app_name()?;
        let file_name = self.effective_file_name()?;
        let search_paths = self.effective_search_paths();

        let mut files =
            file::load_config_files(&search_paths, &file_name, app_name, self.search_mode)?;
        for path in &self.files {
            match file::read_if_present(path)? {
                Some(content) => files.push((path.clone(), content)),
                None => debug!(path = %path.display(), "explicit config file not found, skipping"),
            }
        }
        debug!(
            app = app_name,
            files = files.len(),
            overrides = self.overrides.len(),
            "resolved config sources"
        );

        Ok(ResolveInput {
            files,
            overrides: self.overrides.clone(),
        })
    }

    /// Discover, read and merge every layer into a [`Store`].
    pub fn load(self) -> Result<Store, ConfigError> {
        let input = self.build_input()?;
        resolve::resolve(input)
    }

    /// Handle a `ConfigAction` and print the result to stdout.
    pub fn handle_and_print(self, action: &ConfigAction) -> Result<(), ConfigError> {
        let result = self.handle(action)?;
        print!("{result}");
        Ok(())
    }

    /// Handle a `ConfigAction` (sections / list / get / components).
    pub fn handle(self, action: &ConfigAction) -> Result<ConfigResult, ConfigError> {
        let store = self.load()?;
        match action {
            ConfigAction::Sections => Ok(ops::list_sections(&store)),
            ConfigAction::List { section, raw } => {
                ops::list_values(&store, section.as_deref(), *raw)
            }
            ConfigAction::Get {
                section,
                option,
                raw,
            } => ops::get_value(&store, section, option, *raw),
            ConfigAction::Components {
                section,
                option,
                prefix,
            } => ops::describe_components(&store, section, option, prefix),
        }
    }
}
