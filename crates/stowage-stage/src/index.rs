//! JSON directory index: one `{"Path", "Size"}` record per file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stowage_core::errors::StageError;
use tracing::{debug, info};

use crate::files::regular_files;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    /// Path as walked, including the source prefix.
    #[serde(rename = "Path")]
    pub path: String,
    /// Size in bytes.
    #[serde(rename = "Size")]
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub output: PathBuf,
    pub files: usize,
    pub total_bytes: u64,
}

/// Collect index records for every regular file under `source`.
pub fn collect_records(source: &Path) -> Result<Vec<IndexRecord>, StageError> {
    regular_files(source)?
        .into_iter()
        .map(|path| {
            let size = fs::metadata(&path)
                .map_err(|e| StageError::Io {
                    path: path.clone(),
                    source: e,
                })?
                .len();
            debug!(path = %path.display(), size, "indexed");
            Ok(IndexRecord {
                path: path.to_string_lossy().into_owned(),
                size,
            })
        })
        .collect()
}

/// Append the JSON array of records for `source` to `output`.
///
/// The file is opened in append mode, so indexing twice leaves two arrays
/// back to back. Consumers that need one document should index into a fresh file.
pub fn index_tree(source: &Path, output: &Path) -> Result<IndexReport, StageError> {
    let records = collect_records(source)?;
    let bytes = serde_json::to_vec(&records).map_err(|e| StageError::Serialize {
        message: e.to_string(),
    })?;

    let io_err = |source| StageError::Io {
        path: output.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(output)
        .map_err(io_err)?;
    file.write_all(&bytes).map_err(io_err)?;

    let report = IndexReport {
        output: output.to_path_buf(),
        files: records.len(),
        total_bytes: records.iter().map(|r| r.size).sum(),
    };
    info!(
        output = %output.display(),
        files = report.files,
        total_bytes = report.total_bytes,
        "index written"
    );
    Ok(report)
}
