//! Directory walker built on `ignore` with every filter disabled.

use std::fs;
use std::path::{Component, Path, PathBuf};

use ignore::{Walk, WalkBuilder};
use stowage_core::errors::ScanError;

use super::types::FileRecord;

/// Enumerates regular files under a root directory.
///
/// Hidden files and gitignored paths are included; symlinks are neither
/// followed nor yielded. Traversal order is unspecified.
#[derive(Debug, Clone, Default)]
pub struct TreeScanner {
    exclude_names: Vec<String>,
    exclude_paths: Vec<PathBuf>,
}

impl TreeScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip files whose name equals any of `names` exactly (e.g. `.DS_Store`).
    pub fn with_exclude_names(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.exclude_names.extend(names);
        self
    }

    /// Skip these exact paths. Compared against canonicalized entries.
    pub fn with_exclude_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.exclude_paths.extend(paths);
        self
    }

    /// Start a scan of `root`. Fails only when `root` itself is not a
    /// readable directory; per-entry problems surface as `Err` items.
    pub fn scan(&self, root: &Path) -> Result<ScanIter, ScanError> {
        let unreadable = || ScanError::RootUnreadable {
            path: root.to_path_buf(),
        };
        let root = fs::canonicalize(root).map_err(|_| unreadable())?;
        if !root.is_dir() {
            return Err(unreadable());
        }
        fs::read_dir(&root).map_err(|_| unreadable())?;

        let walk = WalkBuilder::new(&root)
            .standard_filters(false)
            .follow_links(false)
            .build();

        Ok(ScanIter {
            root,
            walk,
            exclude_names: self.exclude_names.clone(),
            exclude_paths: self.exclude_paths.clone(),
        })
    }
}

/// Lazy, finite, non-restartable sequence of scan results.
pub struct ScanIter {
    root: PathBuf,
    walk: Walk,
    exclude_names: Vec<String>,
    exclude_paths: Vec<PathBuf>,
}

impl ScanIter {
    /// Canonical root the relative keys are computed against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let name_match = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.exclude_names.iter().any(|ex| ex == name));
        name_match || self.exclude_paths.iter().any(|p| p == path)
    }
}

impl Iterator for ScanIter {
    type Item = Result<FileRecord, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walk.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    return Some(Err(ScanError::Walk {
                        path: walk_error_path(&e).map(Path::to_path_buf),
                        message: e.to_string(),
                    }))
                }
            };
            let is_file = entry.file_type().is_some_and(|t| t.is_file());
            if !is_file || self.is_excluded(entry.path()) {
                continue;
            }
            let Some(relative) = relative_key(&self.root, entry.path()) else {
                continue;
            };
            return Some(Ok(FileRecord {
                relative,
                absolute: entry.into_path(),
            }));
        }
    }
}

/// Path the walker attached to `err`, looking through depth, line and partial wrappers.
fn walk_error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::Loop { child, .. } => Some(child.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            walk_error_path(err)
        }
        ignore::Error::Partial(errs) => errs.iter().find_map(walk_error_path),
        _ => None,
    }
}

/// Root-relative manifest key with `/` separators on every platform.
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
