//! Manifest store: lenient load, per-entry whole-document persistence.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use stowage_core::config::HashAlgorithm;
use stowage_core::errors::ManifestError;
use tracing::{debug, warn};

use super::Manifest;

/// Owns one manifest document on disk and its in-memory mapping.
///
/// The store is the only writer of the persisted form. Every
/// [`record_entry`](Self::record_entry) rewrites the whole document while
/// holding the state mutex, so concurrent callers never interleave rewrites.
#[derive(Debug)]
pub struct ManifestStore {
    path: PathBuf,
    manifest: Mutex<Manifest>,
}

impl ManifestStore {
    /// Load the manifest at `path`.
    ///
    /// Missing, unreadable, or unparsable content yields an empty manifest.
    /// Losing a prior mapping only costs re-hashing, never a wrong result.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let manifest = match fs::read_to_string(&path) {
            Ok(content) => match Manifest::from_json(&content) {
                Ok(manifest) => {
                    debug!(path = %path.display(), entries = manifest.len(), "loaded manifest");
                    manifest
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "manifest unparsable, starting empty");
                    Manifest::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Manifest::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "manifest unreadable, starting empty");
                Manifest::new()
            }
        };
        Self {
            path,
            manifest: Mutex::new(manifest),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert `path -> digest` and rewrite the persisted document.
    ///
    /// Existing keys are never overwritten; recording a known path is a
    /// no-op that returns `Ok(false)` without touching storage. When the
    /// rewrite fails the entry is dropped again, so memory never holds an
    /// entry the document lacks.
    pub fn record_entry(&self, path: &str, digest: &str) -> Result<bool, ManifestError> {
        let mut manifest = self.manifest.lock().map_err(|_| ManifestError::Poisoned)?;
        if !manifest.insert_new(path, digest) {
            return Ok(false);
        }
        let start = Instant::now();
        if let Err(e) = write_atomic(&self.path, &manifest) {
            manifest.remove(path);
            return Err(e);
        }
        debug!(
            entry = path,
            entries = manifest.len(),
            persist_time_us = start.elapsed().as_micros() as u64,
            "recorded manifest entry"
        );
        Ok(true)
    }

    /// Write the document if nothing exists on disk yet, so a run that found
    /// no new files still leaves a manifest behind.
    pub fn ensure_persisted(&self) -> Result<(), ManifestError> {
        let manifest = self.manifest.lock().map_err(|_| ManifestError::Poisoned)?;
        if self.path.exists() {
            return Ok(());
        }
        write_atomic(&self.path, &manifest)
    }

    /// Refuse a loaded document whose digests `algorithm` cannot have produced.
    ///
    /// Extending such a document would mix two digest lengths in one manifest.
    pub fn check_algorithm(&self, algorithm: HashAlgorithm) -> Result<(), ManifestError> {
        let manifest = self.manifest.lock().map_err(|_| ManifestError::Poisoned)?;
        match manifest.first_foreign_digest(algorithm) {
            None => Ok(()),
            Some((entry, _)) => Err(ManifestError::AlgorithmMismatch {
                path: self.path.clone(),
                algorithm: algorithm.to_string(),
                entry: entry.to_string(),
            }),
        }
    }

    pub fn contains(&self, path: &str) -> Result<bool, ManifestError> {
        let manifest = self.manifest.lock().map_err(|_| ManifestError::Poisoned)?;
        Ok(manifest.contains(path))
    }

    pub fn len(&self) -> Result<usize, ManifestError> {
        let manifest = self.manifest.lock().map_err(|_| ManifestError::Poisoned)?;
        Ok(manifest.len())
    }

    pub fn into_manifest(self) -> Result<Manifest, ManifestError> {
        self.manifest.into_inner().map_err(|_| ManifestError::Poisoned)
    }

    /// Sibling temp file used for the rewrite.
    pub fn temp_path(&self) -> PathBuf {
        temp_path_for(&self.path)
    }
}

pub(crate) fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replace the document at `path` with `manifest`.
/// A crash mid-write leaves the previous complete document in place.
fn write_atomic(path: &Path, manifest: &Manifest) -> Result<(), ManifestError> {
    let bytes = manifest.to_json().map_err(|e| ManifestError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let tmp = temp_path_for(path);
    let write_err = |source| ManifestError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(&tmp).map_err(write_err)?;
    file.write_all(&bytes).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;
    drop(file);
    fs::rename(&tmp, path).map_err(write_err)?;
    Ok(())
}
