//! Top-level error aggregating subsystem errors.

use super::error_code::{self, StowageErrorCode};
use super::{ConfigError, ManifestError, ReportError, ScanError, StageError};

/// Errors surfaced to the top level of a build, verify, or staging run.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Stage error: {0}")]
    Stage(#[from] StageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("Interrupted before completion; rerun to resume")]
    Cancelled,
}

impl StowageErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Scan(e) => e.error_code(),
            Self::Manifest(e) => e.error_code(),
            Self::Report(e) => e.error_code(),
            Self::Stage(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::WorkerPool(_) => error_code::WORKER_POOL_ERROR,
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}
