//! Configuration system for Stowage.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod hash_config;
pub mod mover_config;
pub mod stage_config;
pub mod stowage_config;
pub mod verify_config;

pub use hash_config::{HashAlgorithm, HashConfig};
pub use mover_config::MoverConfig;
pub use stage_config::StageConfig;
pub use stowage_config::{CliOverrides, StowageConfig};
pub use verify_config::VerifyConfig;
