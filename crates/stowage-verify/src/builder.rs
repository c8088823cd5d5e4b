//! Incremental digest builder.
//!
//! Scans a root, skips every path the manifest already holds, hashes the
//! rest on a bounded rayon pool and records each digest the moment it
//! arrives. Workers never touch the manifest: results travel over a channel
//! to the calling thread, which is the single writer.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::unbounded;
use rayon::prelude::*;
use stowage_core::cancellation::ScanCancellation;
use stowage_core::config::HashConfig;
use stowage_core::errors::{HashError, PipelineError, ScanError};
use stowage_core::events::{
    BuildCompleteEvent, BuildStartedEvent, FileFailedEvent, FileHashedEvent, VerifyEventHandler,
};
use tracing::{info, info_span, warn};

use crate::hasher::{Digester, Hasher};
use crate::manifest::lock::lock_path_for;
use crate::manifest::store::temp_path_for;
use crate::manifest::{Manifest, ManifestLock, ManifestStore};
use crate::scanner::{relative_key, FileRecord, TreeScanner};

/// A file left out of the manifest because it could not be scanned or hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFailure {
    /// Relative key when known, otherwise whatever the walker reported.
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Regular files yielded by the scan.
    pub discovered: usize,
    /// Files already present in the loaded manifest.
    pub skipped: usize,
    /// Files hashed and recorded in this run.
    pub hashed: usize,
    /// Files that failed to scan or hash.
    pub failed: usize,
    /// Hashed files whose key was already taken by another file in this run,
    /// e.g. two non-UTF-8 names that render to the same key. Not recorded.
    pub duplicates: usize,
    /// Files never dispatched because the run was cancelled.
    pub not_started: usize,
    pub duration: Duration,
}

/// Result of one build: the full manifest (prior + new entries) and what happened.
#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    pub manifest: Manifest,
    pub stats: BuildStats,
    pub failures: Vec<BuildFailure>,
    pub cancelled: bool,
}

/// Orchestrates scanner, store and hasher pool.
pub struct DigestBuilder<D: Digester = Hasher> {
    digester: D,
    threads: usize,
    exclude_names: Vec<String>,
    cancellation: ScanCancellation,
}

impl DigestBuilder<Hasher> {
    /// Builder with the configured algorithm, chunk size, thread count and exclusions.
    pub fn from_config(config: &HashConfig) -> Result<Self, PipelineError> {
        let hasher = Hasher::from_config(config)?;
        Ok(Self::with_digester(hasher, config.effective_threads())
            .with_exclude_names(config.exclude_names.iter().cloned()))
    }
}

impl<D: Digester> DigestBuilder<D> {
    /// `threads == 0` means available parallelism.
    pub fn with_digester(digester: D, threads: usize) -> Self {
        let threads = if threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            threads
        };
        Self {
            digester,
            threads,
            exclude_names: Vec::new(),
            cancellation: ScanCancellation::new(),
        }
    }

    pub fn with_exclude_names(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.exclude_names.extend(names);
        self
    }

    /// Share an external cancellation token (e.g. wired to Ctrl-C).
    pub fn with_cancellation(mut self, cancellation: ScanCancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn digester(&self) -> &D {
        &self.digester
    }

    /// Build or update the manifest stored at `storage` for the tree at `root`.
    ///
    /// Per-file failures are logged and collected; only setup failures
    /// (unreadable root, lock held elsewhere, unwritable manifest) are `Err`.
    pub fn build(
        &self,
        root: &Path,
        storage: &Path,
        handler: &dyn VerifyEventHandler,
    ) -> Result<BuildOutcome, PipelineError> {
        let span = info_span!("build", root = %root.display(), manifest = %storage.display());
        let _enter = span.enter();
        let start = Instant::now();

        let mut lock = ManifestLock::open(storage)?;
        let _guard = lock.try_write()?;

        let store = ManifestStore::load(storage);
        store.check_algorithm(self.digester.algorithm())?;
        let scanner = TreeScanner::new()
            .with_exclude_names(self.exclude_names.iter().cloned())
            .with_exclude_paths(bookkeeping_paths(storage));

        let mut outcome = BuildOutcome::default();
        let mut pending: Vec<FileRecord> = Vec::new();

        let discovery_start = Instant::now();
        let scan = scanner.scan(root)?;
        let scan_root = scan.root().to_path_buf();
        for item in scan {
            match item {
                Ok(record) => {
                    outcome.stats.discovered += 1;
                    if store.contains(&record.relative)? {
                        outcome.stats.skipped += 1;
                    } else {
                        pending.push(record);
                    }
                }
                Err(e) => {
                    let path = scan_failure_path(&scan_root, &e);
                    warn!(path = %path, error = %e, "skipping unreadable entry");
                    outcome.failures.push(BuildFailure {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }
        let discovery_duration = discovery_start.elapsed().as_millis() as u64;

        handler.on_build_started(&BuildStartedEvent {
            root: root.to_path_buf(),
            discovered: outcome.stats.discovered,
            skipped: outcome.stats.skipped,
            pending: pending.len(),
        });
        info!(
            discovered = outcome.stats.discovered,
            files_skipped = outcome.stats.skipped,
            pending = pending.len(),
            discovery_duration,
            "scan complete"
        );

        if !pending.is_empty() {
            self.hash_and_record(&pending, &store, handler, &mut outcome)?;
        }

        store.ensure_persisted()?;
        outcome.stats.failed = outcome.failures.len();
        outcome.cancelled = self.cancellation.is_cancelled();
        outcome.stats.duration = start.elapsed();
        outcome.manifest = store.into_manifest()?;

        let secs = outcome.stats.duration.as_secs_f64();
        let files_per_second = if secs > 0.0 {
            outcome.stats.hashed as f64 / secs
        } else {
            0.0
        };
        info!(
            hashed = outcome.stats.hashed,
            files_failed = outcome.stats.failed,
            entries = outcome.manifest.len(),
            files_per_second,
            cancelled = outcome.cancelled,
            "build complete"
        );
        handler.on_build_complete(&BuildCompleteEvent {
            hashed: outcome.stats.hashed,
            failed: outcome.stats.failed,
            skipped: outcome.stats.skipped,
            manifest_size: outcome.manifest.len(),
            duration_ms: outcome.stats.duration.as_millis() as u64,
        });

        Ok(outcome)
    }

    fn hash_and_record(
        &self,
        pending: &[FileRecord],
        store: &ManifestStore,
        handler: &dyn VerifyEventHandler,
        outcome: &mut BuildOutcome,
    ) -> Result<(), PipelineError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("stowage-hash-{i}"))
            .build()
            .map_err(|e| PipelineError::WorkerPool(e.to_string()))?;

        let total = pending.len();
        let hashing_start = Instant::now();
        let (tx, rx) = unbounded::<(&FileRecord, Result<String, HashError>)>();
        let digester = &self.digester;
        let cancellation = &self.cancellation;
        // Stops this build's workers without touching the shared token.
        let halted = AtomicBool::new(false);
        let halted = &halted;
        let mut processed = 0usize;

        let result = std::thread::scope(|scope| {
            scope.spawn(move || {
                pool.install(|| {
                    pending.par_iter().for_each_with(tx, |tx, record| {
                        if cancellation.is_cancelled() || halted.load(Ordering::Relaxed) {
                            return;
                        }
                        let digest = digester.digest(&record.absolute);
                        let _ = tx.send((record, digest));
                    });
                });
            });

            for (record, digest) in rx.iter() {
                processed += 1;
                match digest {
                    Ok(digest) => {
                        match store.record_entry(&record.relative, &digest) {
                            Ok(true) => {}
                            Ok(false) => {
                                warn!(
                                    path = %record.relative,
                                    file = %record.absolute.display(),
                                    "key already recorded by another file in this run, digest dropped"
                                );
                                outcome.stats.duplicates += 1;
                                continue;
                            }
                            Err(e) => {
                                halted.store(true, Ordering::Relaxed);
                                return Err(PipelineError::from(e));
                            }
                        }
                        outcome.stats.hashed += 1;
                        handler.on_file_hashed(&FileHashedEvent {
                            relative_path: record.relative.clone(),
                            processed,
                            total,
                        });
                    }
                    Err(e) => {
                        warn!(path = %record.relative, error = %e, "digest failed, omitting file");
                        handler.on_file_failed(&FileFailedEvent {
                            relative_path: record.relative.clone(),
                            message: e.to_string(),
                        });
                        outcome.failures.push(BuildFailure {
                            path: record.relative.clone(),
                            message: e.to_string(),
                        });
                    }
                }
            }
            Ok(())
        });

        outcome.stats.not_started = total - processed;
        info!(
            hashing_duration = hashing_start.elapsed().as_millis() as u64,
            processed,
            total,
            "hashing finished"
        );
        result
    }
}

/// Relative key of the entry a scan error names, or its full path when it
/// lies outside the root. Empty when the walker reported no path.
fn scan_failure_path(root: &Path, err: &ScanError) -> String {
    match err {
        ScanError::Walk {
            path: Some(path), ..
        } => relative_key(root, path).unwrap_or_else(|| path.display().to_string()),
        _ => String::new(),
    }
}

/// The manifest's own file plus its temp and lock siblings, canonicalized so
/// they can be excluded when the manifest lives inside the scanned tree.
fn bookkeeping_paths(storage: &Path) -> Vec<PathBuf> {
    let candidates = [
        storage.to_path_buf(),
        temp_path_for(storage),
        lock_path_for(storage),
    ];
    candidates
        .iter()
        .filter_map(|p| {
            let name = p.file_name()?;
            let parent = match p.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            std::fs::canonicalize(parent).ok().map(|dir| dir.join(name))
        })
        .collect()
}
