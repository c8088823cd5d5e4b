//! Shared walking and moving helpers.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use stowage_core::errors::StageError;
use tracing::{debug, warn};

/// Every regular file under `root`, sorted by path within each directory.
///
/// Hidden files are included and symlinks are not followed. Entries the walker
/// cannot read are logged and skipped.
pub fn regular_files(root: &Path) -> Result<Vec<PathBuf>, StageError> {
    if !root.is_dir() || fs::read_dir(root).is_err() {
        return Err(StageError::SourceUnreadable {
            path: root.to_path_buf(),
        });
    }
    let walk = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for entry in walk {
        match entry {
            Ok(entry) if entry.file_type().is_some_and(|t| t.is_file()) => {
                files.push(entry.into_path())
            }
            Ok(_) => {}
            Err(e) => warn!(root = %root.display(), error = %e, "skipping unreadable entry"),
        }
    }
    Ok(files)
}

/// Move `from` to `to` without replacing an existing file.
///
/// Tries a rename first. Only when the two paths sit on different filesystems
/// does it fall back to copy + remove; any other rename failure leaves both
/// trees untouched.
pub fn move_file(from: &Path, to: &Path) -> Result<(), StageError> {
    match fs::symlink_metadata(to) {
        Ok(_) => {
            return Err(StageError::DestinationExists {
                path: to.to_path_buf(),
            })
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(source) => {
            return Err(StageError::Io {
                path: to.to_path_buf(),
                source,
            })
        }
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => {
            debug!(from = %from.display(), error = %e, "rename crosses filesystems, copying instead");
            copy_then_remove(from, to)
        }
        Err(source) => Err(StageError::Move {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        }),
    }
}

/// Copy `from` to `to`, then remove `from`. On any failure the copy is
/// deleted again, so the file ends up in exactly one place.
fn copy_then_remove(from: &Path, to: &Path) -> Result<(), StageError> {
    let move_err = |source| StageError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };
    if let Err(e) = fs::copy(from, to) {
        let _ = fs::remove_file(to);
        return Err(move_err(e));
    }
    if let Err(e) = fs::remove_file(from) {
        if let Err(cleanup) = fs::remove_file(to) {
            warn!(path = %to.display(), error = %cleanup, "could not remove copy after failed move");
        }
        return Err(move_err(e));
    }
    Ok(())
}

#[cfg(unix)]
const CROSS_DEVICE: i32 = 18; // EXDEV
#[cfg(windows)]
const CROSS_DEVICE: i32 = 17; // ERROR_NOT_SAME_DEVICE

fn is_cross_device(err: &std::io::Error) -> bool {
    #[cfg(any(unix, windows))]
    {
        err.raw_os_error() == Some(CROSS_DEVICE)
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = err;
        false
    }
}
