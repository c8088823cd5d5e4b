//! Top-level Stowage configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{HashConfig, MoverConfig, StageConfig, VerifyConfig};
use crate::errors::ConfigError;

/// Project config file name looked up in the working root.
pub const PROJECT_CONFIG_FILE: &str = "stowage.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`STOWAGE_*`)
/// 3. Project config (`stowage.toml` in the root, or `--config`)
/// 4. User config (`~/.stowage/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StowageConfig {
    pub hash: HashConfig,
    pub verify: VerifyConfig,
    pub stage: StageConfig,
    pub mover: MoverConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Explicit project config file; must exist when given.
    pub config_file: Option<PathBuf>,
    pub hash_algorithm: Option<String>,
    pub hash_threads: Option<usize>,
    pub manifest: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub local_manifest: Option<PathBuf>,
    pub mover_source: Option<PathBuf>,
    pub mover_dest: Option<PathBuf>,
    pub mover_prefix: Option<String>,
    pub mover_suffix: Option<String>,
    pub mover_interval_secs: Option<u64>,
}

impl StowageConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Lowest priority: user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        // Project config: explicit file must exist, implicit one is optional
        match cli_overrides.and_then(|c| c.config_file.as_ref()) {
            Some(explicit) => {
                if !explicit.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: explicit.display().to_string(),
                    });
                }
                Self::merge_toml_file(&mut config, explicit)?;
            }
            None => {
                let project_config_path = root.join(PROJECT_CONFIG_FILE);
                if project_config_path.exists() {
                    Self::merge_toml_file(&mut config, &project_config_path)?;
                }
            }
        }

        Self::apply_env_overrides(&mut config);

        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &StowageConfig) -> Result<(), ConfigError> {
        config.hash.effective_algorithm()?;
        if config.hash.chunk_size == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "hash.chunk_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.mover.interval_secs == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "mover.interval_secs".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.mover.effective_prefix().is_empty() && config.mover.effective_suffix().is_empty()
        {
            return Err(ConfigError::ValidationFailed {
                field: "mover.prefix".to_string(),
                message: "prefix and suffix cannot both be empty".to_string(),
            });
        }
        if let Some(id) = &config.stage.dataset_id {
            if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
                return Err(ConfigError::ValidationFailed {
                    field: "stage.dataset_id".to_string(),
                    message: format!("'{id}' is not a plain directory name"),
                });
            }
        }
        Ok(())
    }

    /// Returns the user config path: `~/.stowage/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".stowage").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut StowageConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: StowageConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins only where it has a value.
    fn merge(base: &mut StowageConfig, other: &StowageConfig) {
        // Hash
        if other.hash.algorithm.is_some() {
            base.hash.algorithm = other.hash.algorithm.clone();
        }
        if other.hash.chunk_size.is_some() {
            base.hash.chunk_size = other.hash.chunk_size;
        }
        if other.hash.threads.is_some() {
            base.hash.threads = other.hash.threads;
        }
        if !other.hash.exclude_names.is_empty() {
            base.hash.exclude_names = other.hash.exclude_names.clone();
        }

        // Verify
        if other.verify.manifest.is_some() {
            base.verify.manifest = other.verify.manifest.clone();
        }
        if other.verify.report.is_some() {
            base.verify.report = other.verify.report.clone();
        }
        if other.verify.local_manifest.is_some() {
            base.verify.local_manifest = other.verify.local_manifest.clone();
        }

        // Stage
        if other.stage.root.is_some() {
            base.stage.root = other.stage.root.clone();
        }
        if other.stage.dataset_id.is_some() {
            base.stage.dataset_id = other.stage.dataset_id.clone();
        }
        if other.stage.exclude_name.is_some() {
            base.stage.exclude_name = other.stage.exclude_name.clone();
        }

        // Mover
        if other.mover.source.is_some() {
            base.mover.source = other.mover.source.clone();
        }
        if other.mover.dest.is_some() {
            base.mover.dest = other.mover.dest.clone();
        }
        if other.mover.prefix.is_some() {
            base.mover.prefix = other.mover.prefix.clone();
        }
        if other.mover.suffix.is_some() {
            base.mover.suffix = other.mover.suffix.clone();
        }
        if other.mover.interval_secs.is_some() {
            base.mover.interval_secs = other.mover.interval_secs;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `STOWAGE_HASH_THREADS`, `STOWAGE_STAGE_DATASET_ID`, etc.
    fn apply_env_overrides(config: &mut StowageConfig) {
        if let Ok(val) = std::env::var("STOWAGE_HASH_ALGORITHM") {
            config.hash.algorithm = Some(val);
        }
        if let Ok(val) = std::env::var("STOWAGE_HASH_CHUNK_SIZE") {
            if let Ok(v) = val.parse::<usize>() {
                config.hash.chunk_size = Some(v);
            }
        }
        if let Ok(val) = std::env::var("STOWAGE_HASH_THREADS") {
            if let Ok(v) = val.parse::<usize>() {
                config.hash.threads = Some(v);
            }
        }
        if let Ok(val) = std::env::var("STOWAGE_VERIFY_LOCAL_MANIFEST") {
            config.verify.local_manifest = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("STOWAGE_STAGE_ROOT") {
            config.stage.root = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("STOWAGE_STAGE_DATASET_ID") {
            config.stage.dataset_id = Some(val);
        }
        if let Ok(val) = std::env::var("STOWAGE_MOVER_INTERVAL_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.mover.interval_secs = Some(v);
            }
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut StowageConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.hash_algorithm {
            config.hash.algorithm = Some(v.clone());
        }
        if let Some(v) = cli.hash_threads {
            config.hash.threads = Some(v);
        }
        if let Some(ref v) = cli.manifest {
            config.verify.manifest = Some(v.clone());
        }
        if let Some(ref v) = cli.report {
            config.verify.report = Some(v.clone());
        }
        if let Some(ref v) = cli.local_manifest {
            config.verify.local_manifest = Some(v.clone());
        }
        if let Some(ref v) = cli.mover_source {
            config.mover.source = Some(v.clone());
        }
        if let Some(ref v) = cli.mover_dest {
            config.mover.dest = Some(v.clone());
        }
        if let Some(ref v) = cli.mover_prefix {
            config.mover.prefix = Some(v.clone());
        }
        if let Some(ref v) = cli.mover_suffix {
            config.mover.suffix = Some(v.clone());
        }
        if let Some(v) = cli.mover_interval_secs {
            config.mover.interval_secs = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
