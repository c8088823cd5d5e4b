//! Error handling for Stowage.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod error_code;
pub mod hash_error;
pub mod manifest_error;
pub mod pipeline_error;
pub mod report_error;
pub mod scan_error;
pub mod stage_error;

pub use config_error::ConfigError;
pub use error_code::StowageErrorCode;
pub use hash_error::HashError;
pub use manifest_error::ManifestError;
pub use pipeline_error::PipelineError;
pub use report_error::ReportError;
pub use scan_error::ScanError;
pub use stage_error::StageError;
