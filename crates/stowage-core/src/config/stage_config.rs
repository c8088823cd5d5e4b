//! Staging layout configuration (flatten + index).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_EXCLUDE_NAME, DEFAULT_STAGE_ROOT};

/// Dataset staging layout: `<root>/<dataset_id>/{src,raw}` and `<root>/<dataset_id>/<dataset_id>.json`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StageConfig {
    /// Staging root. Default: "/ipfsdata".
    pub root: Option<PathBuf>,
    /// Dataset identifier; names the dataset directory and its index file.
    pub dataset_id: Option<String>,
    /// File name skipped when flattening. Default: ".DS_Store".
    pub exclude_name: Option<String>,
}

impl StageConfig {
    pub fn effective_root(&self) -> PathBuf {
        self.root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STAGE_ROOT))
    }

    pub fn effective_exclude_name(&self) -> String {
        self.exclude_name
            .clone()
            .unwrap_or_else(|| DEFAULT_EXCLUDE_NAME.to_string())
    }

    /// `<root>/<dataset_id>`, or `None` when no dataset is configured.
    pub fn dataset_dir(&self) -> Option<PathBuf> {
        self.dataset_id
            .as_ref()
            .map(|id| self.effective_root().join(id))
    }

    pub fn source_dir(&self) -> Option<PathBuf> {
        self.dataset_dir().map(|d| d.join("src"))
    }

    pub fn raw_dir(&self) -> Option<PathBuf> {
        self.dataset_dir().map(|d| d.join("raw"))
    }

    pub fn index_file(&self) -> Option<PathBuf> {
        let id = self.dataset_id.as_ref()?;
        self.dataset_dir().map(|d| d.join(format!("{id}.json")))
    }
}
