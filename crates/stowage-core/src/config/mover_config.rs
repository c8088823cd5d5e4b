//! Pattern-based mover configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MOVER_DEST, DEFAULT_MOVER_INTERVAL_SECS, DEFAULT_MOVER_PREFIX, DEFAULT_MOVER_SOURCE,
    DEFAULT_MOVER_SUFFIX,
};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MoverConfig {
    /// Staging root scanned for finished files. Default: "/ipfsdata/car".
    pub source: Option<PathBuf>,
    /// Archival root receiving them. Default: "/datacap".
    pub dest: Option<PathBuf>,
    /// Required filename prefix. Default: "baga6ea4seaq".
    pub prefix: Option<String>,
    /// Required filename suffix. Default: ".car".
    pub suffix: Option<String>,
    /// Seconds between passes. Default: 60.
    pub interval_secs: Option<u64>,
}

impl MoverConfig {
    pub fn effective_source(&self) -> PathBuf {
        self.source
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MOVER_SOURCE))
    }

    pub fn effective_dest(&self) -> PathBuf {
        self.dest
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MOVER_DEST))
    }

    pub fn effective_prefix(&self) -> String {
        self.prefix
            .clone()
            .unwrap_or_else(|| DEFAULT_MOVER_PREFIX.to_string())
    }

    pub fn effective_suffix(&self) -> String {
        self.suffix
            .clone()
            .unwrap_or_else(|| DEFAULT_MOVER_SUFFIX.to_string())
    }

    pub fn effective_interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.unwrap_or(DEFAULT_MOVER_INTERVAL_SECS))
    }
}
