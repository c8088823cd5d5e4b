//! Tree scanner errors.

use std::path::PathBuf;

use super::error_code::{self, StowageErrorCode};

/// Errors that can occur while walking a directory tree.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Scan root is not a readable directory: {path}")]
    RootUnreadable { path: PathBuf },

    /// `path` is the entry the walker failed on, when it reported one.
    #[error("Walk error: {message}")]
    Walk {
        path: Option<PathBuf>,
        message: String,
    },
}

impl StowageErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        error_code::SCAN_ERROR
    }
}
