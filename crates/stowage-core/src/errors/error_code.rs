//! StowageErrorCode trait for tagged error output.

/// Every error enum implements this to provide a stable code string,
/// printed by the CLI ahead of the message.
pub trait StowageErrorCode {
    /// Returns the error code string (e.g., "SCAN_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted string: `[ERROR_CODE] message`.
    fn tagged_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const SCAN_ERROR: &str = "SCAN_ERROR";
pub const HASH_ERROR: &str = "HASH_ERROR";
pub const MANIFEST_ERROR: &str = "MANIFEST_ERROR";
pub const MANIFEST_LOCKED: &str = "MANIFEST_LOCKED";
pub const REPORT_ERROR: &str = "REPORT_ERROR";
pub const STAGE_ERROR: &str = "STAGE_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const WORKER_POOL_ERROR: &str = "WORKER_POOL_ERROR";
pub const CANCELLED: &str = "CANCELLED";
