use std::path::PathBuf;
use thiserror::Error;

use crate::convert::ConvertError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No section: '{0}'")]
    MissingSection(String),

    #[error("No option '{option}' in section '{section}'")]
    MissingOption { section: String, option: String },

    #[error(
        "Bad value substitution: option '{option}' in section '{section}' contains an \
         interpolation key '{reference}' which is not a valid option name. Raw value: '{raw}'"
    )]
    InterpolationMissingTarget {
        section: String,
        option: String,
        raw: String,
        reference: String,
    },

    #[error(
        "Recursion limit exceeded in value substitution: option '{option}' in section \
         '{section}' contains an interpolation key which cannot be substituted in {depth} steps. \
         Raw value: '{raw}'"
    )]
    InterpolationDepthExceeded {
        section: String,
        option: String,
        raw: String,
        depth: usize,
    },

    #[error("Invalid value for '{option}' in section '{section}': {source}")]
    InvalidValue {
        section: String,
        option: String,
        source: ConvertError,
    },

    #[error("No callback '{name}' registered for module '{module}'")]
    UnknownCallback { module: String, name: String },

    #[error("{source_name} (line {line}): {reason}")]
    Syntax {
        source_name: String,
        line: usize,
        reason: String,
    },

    #[error("Section '{section}' already exists")]
    DuplicateSection { section: String },

    #[error("Option '{option}' in section '{section}' already exists ({source_name}, line {line})")]
    DuplicateOption {
        section: String,
        option: String,
        source_name: String,
        line: usize,
    },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("App name is required: call .app_name() on the builder")]
    AppNameRequired,
}

impl ConfigError {
    pub(crate) fn missing_option(section: &str, option: &str) -> Self {
        ConfigError::MissingOption {
            section: section.to_string(),
            option: option.to_string(),
        }
    }

    /// True for the two "value is absent" errors, as opposed to bad values.
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            ConfigError::MissingSection(_) | ConfigError::MissingOption { .. }
        )
    }
}
