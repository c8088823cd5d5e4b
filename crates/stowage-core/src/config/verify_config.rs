//! Verification tool configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_LOCAL_MANIFEST_PATH, DEFAULT_MANIFEST_PATH, DEFAULT_REPORT_PATH};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VerifyConfig {
    /// Manifest written by `generate`, read as the authority by `verify`.
    pub manifest: Option<PathBuf>,
    /// Report written by `verify`.
    pub report: Option<PathBuf>,
    /// Incrementally maintained manifest of the local tree during `verify`.
    pub local_manifest: Option<PathBuf>,
}

impl VerifyConfig {
    pub fn effective_manifest(&self) -> PathBuf {
        self.manifest
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST_PATH))
    }

    pub fn effective_report(&self) -> PathBuf {
        self.report
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_PATH))
    }

    pub fn effective_local_manifest(&self) -> PathBuf {
        self.local_manifest
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_MANIFEST_PATH))
    }
}
