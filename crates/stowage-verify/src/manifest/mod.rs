//! Manifest: persisted mapping from root-relative path to content digest.

pub mod lock;
pub mod store;

use std::collections::btree_map::{self, BTreeMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use stowage_core::config::HashAlgorithm;
use stowage_core::errors::ManifestError;

pub use lock::ManifestLock;
pub use store::ManifestStore;

/// Path -> digest mapping. Keys are unique, iteration is sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// Insert `path -> digest` unless `path` is already present.
    /// Returns `true` when the entry was added.
    pub fn insert_new(&mut self, path: impl Into<String>, digest: impl Into<String>) -> bool {
        match self.entries.entry(path.into()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(digest.into());
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Undo an insert whose persistence failed.
    pub(crate) fn remove(&mut self, path: &str) {
        self.entries.remove(path);
    }

    /// First entry whose digest is not a lower-case hex string of the length
    /// `algorithm` produces. `None` means every digest could be one of its own.
    pub fn first_foreign_digest(&self, algorithm: HashAlgorithm) -> Option<(&str, &str)> {
        self.iter().find(|(_, digest)| {
            digest.len() != algorithm.hex_len()
                || !digest.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Read a manifest that must exist and parse, e.g. the authoritative side of a comparison.
    pub fn read_from(path: &Path) -> Result<Self, ManifestError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ManifestError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(source) => {
                return Err(ManifestError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::from_json(&content).map_err(|e| ManifestError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Human-readable JSON: 4-space indent, UTF-8 verbatim, sorted keys.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut out = Vec::with_capacity(64 + self.entries.len() * 80);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(out)
    }
}

impl FromIterator<(String, String)> for Manifest {
    /// First occurrence of a path wins, matching the append-only contract.
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut manifest = Manifest::new();
        for (path, digest) in iter {
            manifest.insert_new(path, digest);
        }
        manifest
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
