//! Merge pre-loaded config layers into one [`Store`].
//!
//! Operates on [`ResolveInput`] with no I/O, so the whole pipeline can be
//! tested with synthetic inputs:
//!
//! 1. Parse each file and overlay it on the result so far (later files win,
//!    option by option)
//! 2. Apply programmatic overrides on top (highest priority)

use std::path::PathBuf;

use tracing::debug;

use crate::error::ConfigError;
use crate::store::Store;

/// A single `section.option = value` override.
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    pub section: String,
    pub option: String,
    pub value: String,
}

/// All pre-loaded data needed to build a store. No I/O happens here.
#[derive(Debug, Clone, Default)]
pub struct ResolveInput {
    /// File contents in precedence order: first = lowest priority, last = highest.
    pub files: Vec<(PathBuf, String)>,
    /// Overrides applied after every file, in order.
    pub overrides: Vec<Override>,
}

pub fn resolve(input: ResolveInput) -> Result<Store, ConfigError> {
    let mut store = Store::new();

    for (path, content) in &input.files {
        debug!(path = %path.display(), "merging config file");
        store.read_str(&path.display().to_string(), content)?;
    }

    for o in &input.overrides {
        debug!(section = %o.section, option = %o.option, "applying override");
        store.insert(&o.section, &o.option, &o.value);
    }

    Ok(store)
}
