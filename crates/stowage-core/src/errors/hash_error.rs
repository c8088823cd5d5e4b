//! Hasher errors.

use std::path::PathBuf;

use super::error_code::{self, StowageErrorCode};

/// Errors that can occur while digesting a single file.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("Cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Read failed for {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StowageErrorCode for HashError {
    fn error_code(&self) -> &'static str {
        error_code::HASH_ERROR
    }
}
