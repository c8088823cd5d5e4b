//! Verification report errors.

use std::path::PathBuf;

use super::error_code::{self, StowageErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StowageErrorCode for ReportError {
    fn error_code(&self) -> &'static str {
        error_code::REPORT_ERROR
    }
}
