//! Incremental digest builder tests: completeness, determinism, skip and
//! resume behaviour, failure isolation, lock contention, restart survival.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use proptest::prelude::*;
use stowage_core::cancellation::ScanCancellation;
use stowage_core::config::HashAlgorithm;
use stowage_core::errors::{HashError, ManifestError, PipelineError};
use stowage_core::events::{
    BuildCompleteEvent, BuildStartedEvent, FileFailedEvent, FileHashedEvent, NoOpHandler,
    VerifyEventHandler,
};
use stowage_verify::hasher::hash_content;
use stowage_verify::{Digester, DigestBuilder, Hasher, Manifest, ManifestLock, ManifestStore};

/// Counts every digest call, delegating to the real hasher.
#[derive(Default)]
struct CountingDigester {
    inner: Hasher,
    calls: AtomicUsize,
}

impl Digester for CountingDigester {
    fn digest(&self, path: &Path) -> Result<String, HashError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.digest(path)
    }

    fn algorithm(&self) -> HashAlgorithm {
        self.inner.algorithm()
    }
}

/// Fails for any file whose name starts with `bad`.
struct FlakyDigester;

impl Digester for FlakyDigester {
    fn digest(&self, path: &Path) -> Result<String, HashError> {
        let bad = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("bad"));
        if bad {
            return Err(HashError::Read {
                path: path.to_path_buf(),
                source: std::io::Error::other("simulated read failure"),
            });
        }
        Hasher::default().digest(path)
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Md5
    }
}

#[derive(Default)]
struct RecordingHandler {
    started: Mutex<Vec<BuildStartedEvent>>,
    hashed: AtomicUsize,
    failed: Mutex<Vec<String>>,
    completed: Mutex<Option<BuildCompleteEvent>>,
}

impl VerifyEventHandler for RecordingHandler {
    fn on_build_started(&self, event: &BuildStartedEvent) {
        self.started.lock().unwrap().push(event.clone());
    }
    fn on_file_hashed(&self, _event: &FileHashedEvent) {
        self.hashed.fetch_add(1, Ordering::SeqCst);
    }
    fn on_file_failed(&self, event: &FileFailedEvent) {
        self.failed.lock().unwrap().push(event.relative_path.clone());
    }
    fn on_build_complete(&self, event: &BuildCompleteEvent) {
        *self.completed.lock().unwrap() = Some(event.clone());
    }
}

fn write_file(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn sample_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"alpha");
    write_file(dir.path(), "sub/b.txt", b"bravo");
    write_file(dir.path(), "sub/deeper/c.bin", &[0u8, 1, 2, 3]);
    write_file(dir.path(), ".hidden", b"");
    dir
}

// ═══════════════════════════════════════════════════════════════════════════
// COMPLETENESS AND DETERMINISM
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn fresh_build_records_every_file() {
    let tree = sample_tree();
    let out = tempfile::tempdir().unwrap();
    let storage = out.path().join("local.json");

    let outcome = DigestBuilder::with_digester(Hasher::default(), 4)
        .build(tree.path(), &storage, &NoOpHandler)
        .unwrap();

    assert_eq!(outcome.stats.discovered, 4);
    assert_eq!(outcome.stats.hashed, 4);
    assert_eq!(outcome.stats.skipped, 0);
    assert!(outcome.failures.is_empty());
    assert_eq!(
        outcome.manifest.get("sub/b.txt"),
        Some(hash_content(HashAlgorithm::Md5, b"bravo").as_str())
    );
    assert_eq!(
        outcome.manifest.get(".hidden"),
        Some("d41d8cd98f00b204e9800998ecf8427e")
    );
    assert_eq!(Manifest::read_from(&storage).unwrap(), outcome.manifest);
}

#[test]
fn thread_count_does_not_change_result() {
    let tree = sample_tree();
    let out = tempfile::tempdir().unwrap();

    let single = DigestBuilder::with_digester(Hasher::default(), 1)
        .build(tree.path(), &out.path().join("one.json"), &NoOpHandler)
        .unwrap();
    let many = DigestBuilder::with_digester(Hasher::default(), 8)
        .build(tree.path(), &out.path().join("eight.json"), &NoOpHandler)
        .unwrap();

    assert_eq!(single.manifest, many.manifest);
}

#[test]
fn empty_directory_yields_empty_manifest() {
    let tree = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let outcome = DigestBuilder::with_digester(Hasher::default(), 2)
        .build(tree.path(), &out.path().join("m.json"), &NoOpHandler)
        .unwrap();
    assert!(outcome.manifest.is_empty());
    assert_eq!(outcome.stats.discovered, 0);
    assert_eq!(std::fs::read_to_string(out.path().join("m.json")).unwrap(), "{}");
}

#[test]
fn missing_root_is_an_error() {
    let out = tempfile::tempdir().unwrap();
    let result = DigestBuilder::with_digester(Hasher::default(), 2).build(
        &out.path().join("absent"),
        &out.path().join("m.json"),
        &NoOpHandler,
    );
    assert!(matches!(result, Err(PipelineError::Scan(_))));
}

// ═══════════════════════════════════════════════════════════════════════════
// INCREMENTAL AND RESUMABLE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn second_run_hashes_nothing() {
    let tree = sample_tree();
    let out = tempfile::tempdir().unwrap();
    let storage = out.path().join("local.json");
    let builder = DigestBuilder::with_digester(CountingDigester::default(), 3);

    let first = builder.build(tree.path(), &storage, &NoOpHandler).unwrap();
    assert_eq!(builder.digester().calls.load(Ordering::SeqCst), 4);

    let second = builder.build(tree.path(), &storage, &NoOpHandler).unwrap();
    assert_eq!(builder.digester().calls.load(Ordering::SeqCst), 4);
    assert_eq!(second.stats.skipped, 4);
    assert_eq!(second.stats.hashed, 0);
    assert_eq!(first.manifest, second.manifest);
}

#[test]
fn resume_hashes_only_unrecorded_files() {
    let tree = sample_tree();
    let out = tempfile::tempdir().unwrap();
    let storage = out.path().join("local.json");

    // Simulate an interrupted run that recorded two entries.
    let recorded = hash_content(HashAlgorithm::Md5, b"recorded before crash");
    {
        let store = ManifestStore::load(&storage);
        store.record_entry("a.txt", &recorded).unwrap();
        store.record_entry("sub/b.txt", &recorded).unwrap();
    }

    let builder = DigestBuilder::with_digester(CountingDigester::default(), 2);
    let outcome = builder.build(tree.path(), &storage, &NoOpHandler).unwrap();

    assert_eq!(builder.digester().calls.load(Ordering::SeqCst), 2);
    assert_eq!(outcome.stats.skipped, 2);
    assert_eq!(outcome.manifest.len(), 4);
    // Recorded digests are trusted, never re-validated.
    assert_eq!(outcome.manifest.get("a.txt"), Some(recorded.as_str()));
}

#[test]
fn new_file_is_picked_up_on_rerun() {
    let tree = sample_tree();
    let out = tempfile::tempdir().unwrap();
    let storage = out.path().join("local.json");
    let builder = DigestBuilder::with_digester(Hasher::default(), 2);

    builder.build(tree.path(), &storage, &NoOpHandler).unwrap();
    write_file(tree.path(), "sub/new.txt", b"late arrival");
    let outcome = builder.build(tree.path(), &storage, &NoOpHandler).unwrap();

    assert_eq!(outcome.stats.hashed, 1);
    assert!(outcome.manifest.contains("sub/new.txt"));
}

#[test]
fn stale_entries_survive_deletion() {
    let tree = sample_tree();
    let out = tempfile::tempdir().unwrap();
    let storage = out.path().join("local.json");
    let builder = DigestBuilder::with_digester(Hasher::default(), 2);

    builder.build(tree.path(), &storage, &NoOpHandler).unwrap();
    std::fs::remove_file(tree.path().join("a.txt")).unwrap();
    let outcome = builder.build(tree.path(), &storage, &NoOpHandler).unwrap();

    assert_eq!(outcome.stats.discovered, 3);
    assert!(outcome.manifest.contains("a.txt"));
}

#[test]
fn corrupt_manifest_is_rebuilt() {
    let tree = sample_tree();
    let out = tempfile::tempdir().unwrap();
    let storage = out.path().join("local.json");
    std::fs::write(&storage, "{\"a.txt\": ").unwrap();

    let outcome = DigestBuilder::with_digester(Hasher::default(), 2)
        .build(tree.path(), &storage, &NoOpHandler)
        .unwrap();
    assert_eq!(outcome.stats.hashed, 4);
    assert_eq!(Manifest::read_from(&storage).unwrap().len(), 4);
}

#[test]
fn manifest_survives_restart() {
    let tree = sample_tree();
    let out = tempfile::tempdir().unwrap();
    let storage = out.path().join("local.json");

    let built = {
        let builder = DigestBuilder::with_digester(Hasher::default(), 2);
        builder.build(tree.path(), &storage, &NoOpHandler).unwrap().manifest
    };

    let reloaded = ManifestStore::load(&storage).into_manifest().unwrap();
    assert_eq!(reloaded, built);
}

#[test]
fn other_algorithm_refuses_to_extend_manifest() {
    let tree = tempfile::tempdir().unwrap();
    write_file(tree.path(), "a", b"a");
    let out = tempfile::tempdir().unwrap();
    let storage = out.path().join("local.json");

    DigestBuilder::with_digester(Hasher::new(HashAlgorithm::Md5, 4096), 2)
        .build(tree.path(), &storage, &NoOpHandler)
        .unwrap();
    let before = std::fs::read_to_string(&storage).unwrap();

    write_file(tree.path(), "b", b"b");
    let result = DigestBuilder::with_digester(Hasher::new(HashAlgorithm::Xxh3, 4096), 2).build(
        tree.path(),
        &storage,
        &NoOpHandler,
    );
    assert!(matches!(
        result,
        Err(PipelineError::Manifest(ManifestError::AlgorithmMismatch { .. }))
    ));
    assert_eq!(std::fs::read_to_string(&storage).unwrap(), before);

    // The original algorithm still extends it.
    let outcome = DigestBuilder::with_digester(Hasher::new(HashAlgorithm::Md5, 4096), 2)
        .build(tree.path(), &storage, &NoOpHandler)
        .unwrap();
    assert_eq!(outcome.stats.hashed, 1);
    assert!(outcome.manifest.first_foreign_digest(HashAlgorithm::Md5).is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// FAILURE ISOLATION AND CONTENTION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn failed_file_is_omitted_and_run_continues() {
    let tree = sample_tree();
    write_file(tree.path(), "sub/bad.bin", b"unreadable");
    let out = tempfile::tempdir().unwrap();
    let storage = out.path().join("local.json");
    let handler = RecordingHandler::default();

    let builder = DigestBuilder::with_digester(FlakyDigester, 2);
    let outcome = builder.build(tree.path(), &storage, &handler).unwrap();

    assert_eq!(outcome.stats.hashed, 4);
    assert_eq!(outcome.stats.failed, 1);
    assert_eq!(outcome.failures[0].path, "sub/bad.bin");
    assert!(!outcome.manifest.contains("sub/bad.bin"));
    assert_eq!(*handler.failed.lock().unwrap(), vec!["sub/bad.bin".to_string()]);

    // Not recorded, so the next run retries it.
    let again = builder.build(tree.path(), &storage, &NoOpHandler).unwrap();
    assert_eq!(again.stats.skipped, 4);
    assert_eq!(again.stats.failed, 1);
}

#[test]
fn held_lock_rejects_second_builder() {
    let tree = sample_tree();
    let out = tempfile::tempdir().unwrap();
    let storage = out.path().join("local.json");

    let mut lock = ManifestLock::open(&storage).unwrap();
    let _guard = lock.try_write().unwrap();

    let result = DigestBuilder::with_digester(Hasher::default(), 2).build(
        tree.path(),
        &storage,
        &NoOpHandler,
    );
    assert!(matches!(
        result,
        Err(PipelineError::Manifest(ManifestError::Locked { .. }))
    ));
}

#[test]
fn failed_persist_leaves_shared_token_and_builder_usable() {
    let tree = sample_tree();
    let out = tempfile::tempdir().unwrap();
    // A directory where the manifest file should go makes every rewrite fail.
    let blocked = out.path().join("taken");
    std::fs::create_dir(&blocked).unwrap();

    let token = ScanCancellation::new();
    let builder =
        DigestBuilder::with_digester(Hasher::default(), 2).with_cancellation(token.clone());

    let first = builder.build(tree.path(), &blocked, &NoOpHandler);
    assert!(matches!(first, Err(PipelineError::Manifest(ManifestError::Write { .. }))));
    assert!(!token.is_cancelled());

    let second = builder
        .build(tree.path(), &out.path().join("local.json"), &NoOpHandler)
        .unwrap();
    assert!(!second.cancelled);
    assert_eq!(second.stats.hashed, 4);
    assert_eq!(second.stats.not_started, 0);
}

#[cfg(target_os = "linux")]
#[test]
fn colliding_keys_are_counted_not_hashed_twice() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let tree = tempfile::tempdir().unwrap();
    // Both names render as "bad\u{FFFD}" once made UTF-8.
    std::fs::write(tree.path().join(OsStr::from_bytes(b"bad\xfe")), b"one").unwrap();
    std::fs::write(tree.path().join(OsStr::from_bytes(b"bad\xff")), b"two").unwrap();
    let out = tempfile::tempdir().unwrap();

    let outcome = DigestBuilder::with_digester(Hasher::default(), 1)
        .build(tree.path(), &out.path().join("local.json"), &NoOpHandler)
        .unwrap();
    assert_eq!(outcome.stats.discovered, 2);
    assert_eq!(outcome.stats.hashed, 1);
    assert_eq!(outcome.stats.duplicates, 1);
    assert_eq!(outcome.manifest.len(), 1);
}

#[cfg(unix)]
#[test]
fn unreadable_directory_is_reported_by_path() {
    use std::os::unix::fs::PermissionsExt;

    let tree = sample_tree();
    let locked = tree.path().join("locked");
    write_file(tree.path(), "locked/inner.bin", b"hidden");
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
    let privileged = std::fs::read_dir(&locked).is_ok();

    let out = tempfile::tempdir().unwrap();
    let outcome = DigestBuilder::with_digester(Hasher::default(), 2)
        .build(tree.path(), &out.path().join("local.json"), &NoOpHandler)
        .unwrap();
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

    // Permission bits do not bind a privileged user.
    if privileged {
        return;
    }
    assert_eq!(outcome.stats.hashed, 4);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].path, "locked");
}

#[test]
fn events_report_progress() {
    let tree = sample_tree();
    let out = tempfile::tempdir().unwrap();
    let handler = RecordingHandler::default();

    DigestBuilder::with_digester(Hasher::default(), 2)
        .build(tree.path(), &out.path().join("m.json"), &handler)
        .unwrap();

    let started = handler.started.lock().unwrap();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].pending, 4);
    assert_eq!(handler.hashed.load(Ordering::SeqCst), 4);
    let completed = handler.completed.lock().unwrap().clone().unwrap();
    assert_eq!(completed.manifest_size, 4);
}

// ═══════════════════════════════════════════════════════════════════════════
// PROPERTY: manifest equals a direct per-file hash of the tree
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn build_matches_direct_hashes(
        files in prop::collection::btree_map("[a-z]{1,8}", prop::collection::vec(any::<u8>(), 0..256), 0..12),
        threads in 1usize..6,
    ) {
        let tree = tempfile::tempdir().unwrap();
        for (name, content) in &files {
            write_file(tree.path(), &format!("d/{name}"), content);
        }
        let out = tempfile::tempdir().unwrap();
        let outcome = DigestBuilder::with_digester(Hasher::default(), threads)
            .build(tree.path(), &out.path().join("m.json"), &NoOpHandler)
            .unwrap();

        let expected: Manifest = files
            .iter()
            .map(|(name, content)| (format!("d/{name}"), hash_content(HashAlgorithm::Md5, content)))
            .collect();
        prop_assert_eq!(outcome.manifest, expected);
    }
}
