//! Scanner data types.

use std::path::PathBuf;

/// One regular file found under the scan root. Transient: consumed once by
/// the hasher, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Root-relative path with `/` separators; the manifest key.
    pub relative: String,
    /// Path used to open the file.
    pub absolute: PathBuf,
}
