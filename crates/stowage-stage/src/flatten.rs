//! Flatten a nested source tree into a single directory.

use std::fs;
use std::path::{Path, PathBuf};

use stowage_core::errors::StageError;
use stowage_core::events::{FileMovedEvent, VerifyEventHandler};
use tracing::{info, warn};

use crate::files::{move_file, regular_files};

/// What a flatten pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenReport {
    pub moved: usize,
    /// Files skipped because their name is the excluded bookkeeping name.
    pub excluded: usize,
    /// Sources left in place because `target/<name>` already existed.
    pub conflicts: Vec<PathBuf>,
    /// Sources that could not be moved, with the reason.
    pub failures: Vec<(PathBuf, String)>,
}

/// Move every regular file under `source` to `target/<file name>`.
///
/// Files named `exclude_name` stay where they are. `target` is created when
/// missing. Name collisions keep the first file and report the rest as conflicts.
pub fn flatten(
    source: &Path,
    target: &Path,
    exclude_name: &str,
    handler: &dyn VerifyEventHandler,
) -> Result<FlattenReport, StageError> {
    let files = regular_files(source)?;
    fs::create_dir_all(target).map_err(|e| StageError::Io {
        path: target.to_path_buf(),
        source: e,
    })?;

    let mut report = FlattenReport::default();
    for from in files {
        let Some(name) = from.file_name() else {
            continue;
        };
        if name == exclude_name {
            report.excluded += 1;
            continue;
        }
        let to = target.join(name);
        if to == from {
            continue;
        }
        match move_file(&from, &to) {
            Ok(()) => {
                info!(from = %from.display(), to = %to.display(), "moved");
                handler.on_file_moved(&FileMovedEvent {
                    from: from.clone(),
                    to,
                });
                report.moved += 1;
            }
            Err(StageError::DestinationExists { path }) => {
                warn!(from = %from.display(), existing = %path.display(), "name collision, leaving source in place");
                report.conflicts.push(from);
            }
            Err(e) => {
                warn!(from = %from.display(), error = %e, "move failed");
                report.failures.push((from, e.to_string()));
            }
        }
    }
    info!(
        moved = report.moved,
        conflicts = report.conflicts.len(),
        failed = report.failures.len(),
        "flatten complete"
    );
    Ok(report)
}
