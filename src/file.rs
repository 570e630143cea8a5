//! Finding and reading INI files.
//!
//! Discovery turns the builder's [`SearchPath`] list into concrete
//! directories, in priority-ascending order. Every variant yields one
//! directory except `Ancestors`, which yields the chain from its boundary down
//! to the starting directory (shallowest first, so the closest directory
//! wins).
//!
//! Resolution then checks each directory for `{dir}/{file_name}`:
//! [`SearchMode::Merge`] keeps every file found, in order;
//! [`SearchMode::FirstMatch`] keeps only the one closest to the high-priority
//! end. Missing files are skipped. Other I/O errors are returned.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::types::{Boundary, SearchMode, SearchPath};

/// The directory a single-directory [`SearchPath`] points at, or `None` when
/// it cannot be determined (no home directory, unreadable CWD).
/// `Ancestors` has no single directory and also yields `None`.
pub fn resolve_search_path(sp: &SearchPath, app_name: &str) -> Option<PathBuf> {
    match sp {
        SearchPath::Platform => directories::ProjectDirs::from("", "", app_name)
            .map(|dirs| dirs.config_dir().to_path_buf()),
        SearchPath::Home(subdir) => {
            directories::UserDirs::new().map(|user| user.home_dir().join(subdir))
        }
        SearchPath::Cwd => std::env::current_dir().ok(),
        SearchPath::Path(p) => Some(p.clone()),
        SearchPath::Ancestors(_) => None,
    }
}

/// Directories from `start` up to `boundary`, shallowest first.
pub fn ancestors_of(start: &Path, boundary: &Boundary) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    for dir in start.ancestors() {
        dirs.push(dir.to_path_buf());
        if let Boundary::Marker(marker) = boundary
            && dir.join(marker).exists()
        {
            break;
        }
    }
    dirs.reverse();
    dirs
}

/// Expand `search_paths` into directories, priority-ascending.
///
/// `Ancestors` starts at `start` when given, at the current working
/// directory otherwise.
pub fn expand_search_paths(
    search_paths: &[SearchPath],
    app_name: &str,
    start: Option<&Path>,
) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for sp in search_paths {
        match sp {
            SearchPath::Ancestors(boundary) => {
                let from = match start {
                    Some(dir) => Some(dir.to_path_buf()),
                    None => std::env::current_dir().ok(),
                };
                if let Some(from) = from {
                    dirs.extend(ancestors_of(&from, boundary));
                }
            }
            other => match resolve_search_path(other, app_name) {
                Some(dir) => dirs.push(dir),
                None => debug!(search_path = ?other, "search path could not be resolved"),
            },
        }
    }
    dirs
}

/// Read the config files found under `dirs` according to `mode`.
/// Returns `(path, content)` pairs, lowest priority first.
pub fn read_config_files(
    dirs: &[PathBuf],
    file_name: &str,
    mode: SearchMode,
) -> Result<Vec<(PathBuf, String)>, ConfigError> {
    let mut found = Vec::new();
    let candidates: Box<dyn Iterator<Item = &PathBuf>> = match mode {
        SearchMode::Merge => Box::new(dirs.iter()),
        SearchMode::FirstMatch => Box::new(dirs.iter().rev()),
    };

    for dir in candidates {
        let path = dir.join(file_name);
        let Some(content) = read_if_present(&path)? else {
            trace!(path = %path.display(), "no config file");
            continue;
        };
        debug!(path = %path.display(), "found config file");
        found.push((path, content));
        if mode == SearchMode::FirstMatch {
            break;
        }
    }
    Ok(found)
}

/// Discover and read config files in one go.
pub fn load_config_files(
    search_paths: &[SearchPath],
    file_name: &str,
    app_name: &str,
    mode: SearchMode,
) -> Result<Vec<(PathBuf, String)>, ConfigError> {
    let dirs = expand_search_paths(search_paths, app_name, None);
    read_config_files(&dirs, file_name, mode)
}

pub(crate) fn read_if_present(path: &Path) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn dirs_of(temps: &[&TempDir]) -> Vec<PathBuf> {
        temps.iter().map(|t| t.path().to_path_buf()).collect()
    }

    #[test]
    fn explicit_path_resolves_to_itself() {
        let p = PathBuf::from("/tmp/myapp");
        assert_eq!(
            resolve_search_path(&SearchPath::Path(p.clone()), "ignored"),
            Some(p)
        );
        assert_eq!(
            resolve_search_path(&SearchPath::Ancestors(Boundary::Root), "ignored"),
            None
        );
    }

    #[test]
    fn no_files_found() {
        let dir = TempDir::new().unwrap();
        let files = read_config_files(&dirs_of(&[&dir]), "app.ini", SearchMode::Merge).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn merge_returns_all_in_order() {
        let low = TempDir::new().unwrap();
        let empty = TempDir::new().unwrap();
        let high = TempDir::new().unwrap();
        fs::write(low.path().join("app.ini"), "[s]\nhost = a\n").unwrap();
        fs::write(high.path().join("app.ini"), "[s]\nport = 1000\n").unwrap();

        let files = read_config_files(
            &dirs_of(&[&low, &empty, &high]),
            "app.ini",
            SearchMode::Merge,
        )
        .unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].1.contains("host"));
        assert!(files[1].1.contains("port"));
    }

    #[test]
    fn first_match_prefers_highest_priority() {
        let low = TempDir::new().unwrap();
        let high = TempDir::new().unwrap();
        fs::write(low.path().join("app.ini"), "[s]\nhost = low\n").unwrap();
        fs::write(high.path().join("app.ini"), "[s]\nhost = high\n").unwrap();

        let files =
            read_config_files(&dirs_of(&[&low, &high]), "app.ini", SearchMode::FirstMatch)
                .unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].1.contains("high"));
    }

    #[test]
    fn first_match_falls_back_to_lower_priority() {
        let low = TempDir::new().unwrap();
        let high = TempDir::new().unwrap();
        fs::write(low.path().join("app.ini"), "[s]\nhost = fallback\n").unwrap();

        let files =
            read_config_files(&dirs_of(&[&low, &high]), "app.ini", SearchMode::FirstMatch)
                .unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].1.contains("fallback"));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_an_io_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");
        fs::write(&path, "[s]\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        // Root can read anything; only check when the permission took effect.
        if fs::read_to_string(&path).is_err() {
            let result = read_config_files(&dirs_of(&[&dir]), "app.ini", SearchMode::Merge);
            assert!(matches!(result, Err(ConfigError::IoError { .. })));
        }

        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[test]
    fn ancestors_stop_at_marker() {
        let dir = TempDir::new().unwrap();
        let deep = dir.path().join("a").join("b").join("c");
        fs::create_dir_all(&deep).unwrap();
        fs::create_dir(dir.path().join("a").join(".git")).unwrap();

        let dirs = ancestors_of(&deep, &Boundary::Marker(".git"));
        assert_eq!(
            dirs,
            vec![
                dir.path().join("a"),
                dir.path().join("a").join("b"),
                deep.clone()
            ]
        );
    }

    #[test]
    fn ancestors_without_marker_reach_root() {
        let dir = TempDir::new().unwrap();
        let deep = dir.path().join("x").join("y");
        fs::create_dir_all(&deep).unwrap();

        let dirs = ancestors_of(&deep, &Boundary::Marker(".nonexistent"));
        assert!(dirs.contains(&dir.path().to_path_buf()));
        assert_eq!(dirs.last(), Some(&deep));
        assert_eq!(dirs[0].parent(), None);
    }

    #[test]
    fn expand_mixes_single_and_ancestors() {
        let dir = TempDir::new().unwrap();
        let deep = dir.path().join("a").join("b");
        fs::create_dir_all(&deep).unwrap();
        fs::create_dir(dir.path().join("a").join(".marker")).unwrap();
        let explicit = TempDir::new().unwrap();

        let paths = vec![
            SearchPath::Path(explicit.path().to_path_buf()),
            SearchPath::Ancestors(Boundary::Marker(".marker")),
        ];
        let dirs = expand_search_paths(&paths, "test", Some(&deep));
        assert_eq!(
            dirs,
            vec![
                explicit.path().to_path_buf(),
                dir.path().join("a"),
                deep.clone()
            ]
        );
    }

    #[test]
    fn nearest_ancestor_wins_first_match() {
        let root = TempDir::new().unwrap();
        let mid = root.path().join("mid");
        let deep = mid.join("deep");
        fs::create_dir_all(&deep).unwrap();
        fs::write(root.path().join("app.ini"), "[s]\nhost = root\n").unwrap();
        fs::write(mid.join("app.ini"), "[s]\nhost = mid\n").unwrap();

        let dirs = vec![root.path().to_path_buf(), mid.clone(), deep.clone()];
        let files = read_config_files(&dirs, "app.ini", SearchMode::FirstMatch).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].1.contains("mid"));
    }

    #[test]
    fn load_config_files_reads_explicit_paths() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.ini"), "[s]\nport = 1\n").unwrap();
        let files = load_config_files(
            &[SearchPath::Path(dir.path().to_path_buf())],
            "app.ini",
            "test",
            SearchMode::Merge,
        )
        .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, dir.path().join("app.ini"));
    }
}
