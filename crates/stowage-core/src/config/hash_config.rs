//! Hashing configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_HASH_ALGORITHM, DEFAULT_THREADS, SUPPORTED_HASH_ALGORITHMS,
};
use crate::errors::ConfigError;

/// Digest algorithm used for content fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// 128-bit MD5, 32 lower-case hex chars.
    #[default]
    Md5,
    /// 64-bit xxh3, 16 lower-case hex chars.
    Xxh3,
}

impl HashAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Xxh3 => "xxh3",
        }
    }

    /// Length of the hex digest string this algorithm produces.
    pub fn hex_len(&self) -> usize {
        match self {
            HashAlgorithm::Md5 => 32,
            HashAlgorithm::Xxh3 => 16,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "xxh3" => Ok(HashAlgorithm::Xxh3),
            other => Err(ConfigError::ValidationFailed {
                field: "hash.algorithm".to_string(),
                message: format!(
                    "unknown algorithm '{other}' (expected one of: {})",
                    SUPPORTED_HASH_ALGORITHMS.join(", ")
                ),
            }),
        }
    }
}

/// Configuration for the hasher and the digest builder.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HashConfig {
    /// Digest algorithm name. Default: "md5".
    pub algorithm: Option<String>,
    /// Read chunk size in bytes. Default: 8192.
    pub chunk_size: Option<usize>,
    /// Worker threads. 0 = available parallelism. Default: 0.
    pub threads: Option<usize>,
    /// Exact file names the builder never hashes.
    #[serde(default)]
    pub exclude_names: Vec<String>,
}

impl HashConfig {
    /// Returns the effective algorithm, defaulting to MD5.
    pub fn effective_algorithm(&self) -> Result<HashAlgorithm, ConfigError> {
        self.algorithm
            .as_deref()
            .unwrap_or(DEFAULT_HASH_ALGORITHM)
            .parse()
    }

    /// Returns the effective chunk size, defaulting to 8 KiB.
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE)
    }

    /// Returns the effective worker count, resolving 0 to available parallelism.
    pub fn effective_threads(&self) -> usize {
        match self.threads.unwrap_or(DEFAULT_THREADS) {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            n => n,
        }
    }
}
