//! Event payload types.

use std::path::PathBuf;

/// Payload for `on_build_started`.
#[derive(Debug, Clone)]
pub struct BuildStartedEvent {
    pub root: PathBuf,
    /// Files found by the scan.
    pub discovered: usize,
    /// Files already present in the loaded manifest.
    pub skipped: usize,
    /// Files dispatched for hashing.
    pub pending: usize,
}

/// Payload for `on_file_hashed`.
#[derive(Debug, Clone)]
pub struct FileHashedEvent {
    pub relative_path: String,
    pub processed: usize,
    pub total: usize,
}

/// Payload for `on_file_failed`.
#[derive(Debug, Clone)]
pub struct FileFailedEvent {
    pub relative_path: String,
    pub message: String,
}

/// Payload for `on_build_complete`.
#[derive(Debug, Clone)]
pub struct BuildCompleteEvent {
    pub hashed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub manifest_size: usize,
    pub duration_ms: u64,
}

/// Payload for `on_file_moved`.
#[derive(Debug, Clone)]
pub struct FileMovedEvent {
    pub from: PathBuf,
    pub to: PathBuf,
}
