//! stowage-verify: incremental, resumable content verification.
//!
//! - Hasher: chunked per-file digests (MD5 or xxh3)
//! - Manifest: path -> digest document, store with per-entry persistence and a process lock
//! - Scanner: regular-file enumeration with root-relative keys
//! - Builder: skips known paths, hashes the rest on a worker pool, records each result as it lands
//! - Compare: authoritative vs. local classification and the text report

pub mod builder;
pub mod compare;
pub mod hasher;
pub mod manifest;
pub mod scanner;

pub use builder::{BuildFailure, BuildOutcome, BuildStats, DigestBuilder};
pub use compare::{compare_manifests, ComparisonReport, Comparator, Verification};
pub use hasher::{Digester, Hasher};
pub use manifest::{Manifest, ManifestLock, ManifestStore};
pub use scanner::{FileRecord, TreeScanner};
