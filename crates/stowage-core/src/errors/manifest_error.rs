//! Manifest store errors.

use std::path::PathBuf;

use super::error_code::{self, StowageErrorCode};

/// Errors that can occur while reading, writing, or locking a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Manifest not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Manifest {path} is not a valid path->digest document: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("Failed to write manifest {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error on manifest {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "Manifest {path} holds digests not produced by {algorithm} (first: {entry}); \
         use a separate manifest per algorithm"
    )]
    AlgorithmMismatch {
        path: PathBuf,
        algorithm: String,
        entry: String,
    },

    #[error("Manifest {path} is locked by another process")]
    Locked { path: PathBuf },

    #[error("Manifest state poisoned")]
    Poisoned,
}

impl StowageErrorCode for ManifestError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Locked { .. } => error_code::MANIFEST_LOCKED,
            _ => error_code::MANIFEST_ERROR,
        }
    }
}
