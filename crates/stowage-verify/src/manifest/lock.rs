//! Process-level advisory lock guarding one manifest document.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fd_lock::{RwLock, RwLockWriteGuard};
use stowage_core::errors::ManifestError;

/// Advisory lock on `<manifest>.lock`.
///
/// Held for the whole of a build so two local processes cannot rewrite the
/// same manifest at once. Within a process the store's mutex already
/// serializes writers.
pub struct ManifestLock {
    path: PathBuf,
    lock: RwLock<File>,
}

impl ManifestLock {
    /// Open (creating if needed) the lock file next to `manifest_path`.
    pub fn open(manifest_path: &Path) -> Result<Self, ManifestError> {
        let path = lock_path_for(manifest_path);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|source| ManifestError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            lock: RwLock::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Take the exclusive lock without waiting.
    pub fn try_write(&mut self) -> Result<RwLockWriteGuard<'_, File>, ManifestError> {
        let path = self.path.clone();
        self.lock.try_write().map_err(|source| {
            if source.kind() == ErrorKind::WouldBlock {
                ManifestError::Locked { path }
            } else {
                ManifestError::Io { path, source }
            }
        })
    }
}

pub(crate) fn lock_path_for(manifest_path: &Path) -> PathBuf {
    let mut name = manifest_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    manifest_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_file_sits_next_to_manifest() {
        assert_eq!(
            lock_path_for(Path::new("/data/md5_list.json")),
            PathBuf::from("/data/md5_list.json.lock")
        );
    }

    #[test]
    fn sequential_locks_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let mut lock = ManifestLock::open(&dir.path().join("m.json")).unwrap();
        for _ in 0..5 {
            let _guard = lock.try_write().unwrap();
        }
        assert!(lock.path().exists());
    }

    #[test]
    fn open_in_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = ManifestLock::open(&dir.path().join("missing/m.json"));
        assert!(matches!(result, Err(ManifestError::Io { .. })));
    }
}
