//! stowage-core: shared foundation for the Stowage dataset pipeline.
//!
//! - Config: TOML-based layered configuration (CLI > env > project > user > defaults)
//! - Errors: one `thiserror` enum per subsystem plus `StowageErrorCode`
//! - Events: handler trait with no-op defaults for build progress
//! - Tracing: `STOWAGE_LOG`-driven subscriber setup
//! - Cancellation: shared stop flag for long-running work

pub mod cancellation;
pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod tracing;

pub use cancellation::ScanCancellation;
pub use config::StowageConfig;
pub use errors::StowageErrorCode;
pub use events::VerifyEventHandler;
