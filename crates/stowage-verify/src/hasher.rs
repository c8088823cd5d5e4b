//! Content hashing: chunked reads, MD5 or xxh3.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use md5::{Digest, Md5};
use stowage_core::config::{HashAlgorithm, HashConfig};
use stowage_core::constants::DEFAULT_CHUNK_SIZE;
use stowage_core::errors::{ConfigError, HashError};
use xxhash_rust::xxh3::Xxh3;

/// Computes a content digest for a single file.
///
/// Implementations must hold no shared mutable state: the builder calls
/// `digest` from every worker at once, each on a different file.
pub trait Digester: Send + Sync {
    /// Hex digest of the file at `path`.
    fn digest(&self, path: &Path) -> Result<String, HashError>;

    /// Algorithm the digests are produced with.
    fn algorithm(&self) -> HashAlgorithm;
}

/// Streaming file hasher. Reads `chunk_size` bytes at a time, so memory use
/// is bounded regardless of file size.
#[derive(Debug, Clone, Copy)]
pub struct Hasher {
    algorithm: HashAlgorithm,
    chunk_size: usize,
}

impl Hasher {
    pub fn new(algorithm: HashAlgorithm, chunk_size: usize) -> Self {
        Self {
            algorithm,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn from_config(config: &HashConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.effective_algorithm()?,
            config.effective_chunk_size(),
        ))
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn read_chunks<F>(&self, path: &Path, mut update: F) -> Result<(), HashError>
    where
        F: FnMut(&[u8]),
    {
        let mut file = File::open(path).map_err(|source| HashError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut buffer = vec![0u8; self.chunk_size];
        loop {
            match file.read(&mut buffer) {
                Ok(0) => return Ok(()),
                Ok(n) => update(&buffer[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(HashError::Read {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            }
        }
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new(HashAlgorithm::default(), DEFAULT_CHUNK_SIZE)
    }
}

impl Digester for Hasher {
    fn digest(&self, path: &Path) -> Result<String, HashError> {
        match self.algorithm {
            HashAlgorithm::Md5 => {
                let mut state = Md5::new();
                self.read_chunks(path, |chunk| state.update(chunk))?;
                Ok(hex::encode(state.finalize()))
            }
            HashAlgorithm::Xxh3 => {
                let mut state = Xxh3::new();
                self.read_chunks(path, |chunk| state.update(chunk))?;
                Ok(format!("{:016x}", state.digest()))
            }
        }
    }

    fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}

/// Digest of an in-memory buffer, same encoding as [`Hasher::digest`].
pub fn hash_content(algorithm: HashAlgorithm, content: &[u8]) -> String {
    match algorithm {
        HashAlgorithm::Md5 => hex::encode(Md5::digest(content)),
        HashAlgorithm::Xxh3 => format!("{:016x}", xxhash_rust::xxh3::xxh3_64(content)),
    }
}
