pub mod hash;
pub mod stage;

use std::path::PathBuf;

use stowage_core::config::{CliOverrides, StowageConfig};
use stowage_core::errors::PipelineError;

/// Resolve configuration rooted at the working directory.
pub fn load_config(overrides: &CliOverrides) -> Result<StowageConfig, PipelineError> {
    let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    Ok(StowageConfig::load(&root, Some(overrides))?)
}
