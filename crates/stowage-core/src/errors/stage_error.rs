//! Staging collaborator errors (flatten, index, mover).

use std::path::PathBuf;

use super::error_code::{self, StowageErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("Source directory unreadable: {path}")]
    SourceUnreadable { path: PathBuf },

    #[error("Failed to move {from} -> {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Index serialization failed: {message}")]
    Serialize { message: String },

    #[error("Mover thread panicked")]
    MoverPanicked,
}

impl StowageErrorCode for StageError {
    fn error_code(&self) -> &'static str {
        error_code::STAGE_ERROR
    }
}
