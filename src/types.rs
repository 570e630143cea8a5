//! Discovery and resolution settings, and the framework-agnostic actions.
//!
//! # Common patterns
//!
//! Global defaults with a per-project file on top (both read, project wins):
//!
//! ```ignore
//! .search_paths(vec![SearchPath::Platform, SearchPath::Cwd])
//! ```
//!
//! System-wide file, then the user's, then the nearest one up the tree:
//!
//! ```ignore
//! .search_paths(vec![
//!     SearchPath::Path("/etc/myapp".into()),
//!     SearchPath::Home(".myapp"),
//!     SearchPath::Ancestors(Boundary::Marker(".git")),
//! ])
//! ```
//!
//! Only the closest file, no layering:
//!
//! ```ignore
//! .search_paths(vec![SearchPath::Platform, SearchPath::Ancestors(Boundary::Root)])
//! .search_mode(SearchMode::FirstMatch)
//! ```

use std::path::PathBuf;

/// Where to search for config files.
///
/// Lists of search paths are priority-ascending: the last entry wins.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// Platform config directory (XDG on Linux, ~/Library/Application Support on macOS).
    Platform,
    /// A subdirectory under the user's home directory, e.g. `Home(".myapp")`.
    Home(&'static str),
    /// Current working directory.
    Cwd,
    /// An explicit absolute path.
    Path(PathBuf),
    /// Every directory from the boundary down to the current working
    /// directory, shallowest first.
    Ancestors(Boundary),
}

/// How far [`SearchPath::Ancestors`] walks up.
#[derive(Debug, Clone, PartialEq)]
pub enum Boundary {
    /// Up to the filesystem root.
    Root,
    /// Up to (and including) the first directory containing this entry,
    /// e.g. `Marker(".git")`. Walks to the root if it is never found.
    Marker(&'static str),
}

/// What to do when several config files are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Read every file, later ones overriding earlier ones option by option.
    #[default]
    Merge,
    /// Read only the highest-priority file.
    FirstMatch,
}

/// A config operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    /// List the section names.
    Sections,
    /// List options and values, for one section or all of them.
    List { section: Option<String>, raw: bool },
    /// Show one option.
    Get {
        section: String,
        option: String,
        raw: bool,
    },
    /// Show the components listed in `section.option`.
    Components {
        section: String,
        option: String,
        prefix: String,
    },
}
