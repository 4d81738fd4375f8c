// Filesystem helpers used by the content scanner

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors raised by path utilities
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("'{}' is not nested under '{}'", candidate.display(), root.display())]
    NotNested { root: PathBuf, candidate: PathBuf },

    #[error("Invalid name filter '{pattern}': {message}")]
    InvalidFilter { pattern: String, message: String },
}

/// Glob-style filter applied to a single file or folder name
#[derive(Debug, Clone)]
pub struct NameFilter {
    pattern: glob::Pattern,
}

impl NameFilter {
    /// Compile a filter such as `*`, `*.png` or `ui_?`
    pub fn new(pattern: &str) -> Result<Self, PathError> {
        let pattern = glob::Pattern::new(pattern).map_err(|e| PathError::InvalidFilter {
            pattern: pattern.to_string(),
            message: e.msg.to_string(),
        })?;
        Ok(Self { pattern })
    }

    /// Filter matching every name
    pub fn any() -> Self {
        Self {
            pattern: glob::Pattern::new("*").expect("literal wildcard pattern is valid"),
        }
    }

    /// Check a bare name (no directory components) against the filter
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.matches(name)
    }

    /// The source pattern
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for NameFilter {
    fn default() -> Self {
        Self::any()
    }
}

/// List the immediate subdirectories of `dir` whose names match `filter`, sorted by name
pub fn list_dirs(dir: &Path, filter: &NameFilter) -> io::Result<Vec<PathBuf>> {
    list_entries(dir, filter, true)
}

/// List the files directly inside `dir` whose names match `filter`, sorted by name
pub fn list_files(dir: &Path, filter: &NameFilter) -> io::Result<Vec<PathBuf>> {
    list_entries(dir, filter, false)
}

fn list_entries(dir: &Path, filter: &NameFilter, dirs: bool) -> io::Result<Vec<PathBuf>> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() != dirs {
            continue;
        }

        let matched = path
            .file_name()
            .map(|name| filter.matches(&name.to_string_lossy()))
            .unwrap_or(false);

        if matched {
            entries.push(path);
        }
    }

    entries.sort();
    Ok(entries)
}

/// Express `candidate` relative to `root`
///
/// Fails unless `candidate` lies strictly below `root`.
pub fn make_relative(root: &Path, candidate: &Path) -> Result<PathBuf, PathError> {
    match candidate.strip_prefix(root) {
        Ok(relative) if !relative.as_os_str().is_empty() => Ok(relative.to_path_buf()),
        _ => Err(PathError::NotNested {
            root: root.to_path_buf(),
            candidate: candidate.to_path_buf(),
        }),
    }
}

/// Final component of a path as an owned string
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// File name with its last extension stripped (`bg.png` -> `bg`)
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Lowercased extension without the leading dot
pub fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}
