//! Tests for the Stowage error handling system.

use std::collections::HashSet;
use std::path::PathBuf;

use stowage_core::errors::error_code;
use stowage_core::errors::*;

fn io_err() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied")
}

#[test]
fn every_error_has_a_code() {
    let errors: Vec<Box<dyn Fn() -> &'static str>> = vec![
        Box::new(|| {
            ScanError::Walk {
                path: None,
                message: "loop".into(),
            }
            .error_code()
        }),
        Box::new(|| {
            HashError::Open {
                path: PathBuf::from("a.bin"),
                source: io_err(),
            }
            .error_code()
        }),
        Box::new(|| ManifestError::Poisoned.error_code()),
        Box::new(|| {
            ReportError::Write {
                path: PathBuf::from("r.txt"),
                source: io_err(),
            }
            .error_code()
        }),
        Box::new(|| StageError::MoverPanicked.error_code()),
        Box::new(|| {
            ConfigError::FileNotFound {
                path: "/tmp".into(),
            }
            .error_code()
        }),
        Box::new(|| PipelineError::Cancelled.error_code()),
    ];
    for code in errors {
        assert!(!code().is_empty());
    }
}

#[test]
fn from_conversions_preserve_subsystem_code() {
    let pipeline: PipelineError = ManifestError::Locked {
        path: PathBuf::from("m.json"),
    }
    .into();
    assert!(matches!(pipeline, PipelineError::Manifest(ManifestError::Locked { .. })));
    assert_eq!(pipeline.error_code(), error_code::MANIFEST_LOCKED);

    let pipeline: PipelineError = ScanError::RootUnreadable {
        path: PathBuf::from("/missing"),
    }
    .into();
    assert_eq!(pipeline.error_code(), error_code::SCAN_ERROR);

    assert_eq!(PipelineError::Cancelled.error_code(), error_code::CANCELLED);
}

#[test]
fn tagged_string_format() {
    let err = ConfigError::ValidationFailed {
        field: "hash.chunk_size".into(),
        message: "must be greater than 0".into(),
    };
    assert_eq!(
        err.tagged_string(),
        "[CONFIG_ERROR] Config validation failed for hash.chunk_size: must be greater than 0"
    );
}

#[test]
fn messages_include_paths() {
    let err = HashError::Read {
        path: PathBuf::from("/data/a.bin"),
        source: io_err(),
    };
    let msg = err.to_string();
    assert!(msg.contains("/data/a.bin"));
    assert!(msg.contains("denied"));
}

#[test]
fn algorithm_mismatch_names_algorithm_and_entry() {
    let err = ManifestError::AlgorithmMismatch {
        path: PathBuf::from("local_md5.json"),
        algorithm: "xxh3".into(),
        entry: "a.car".into(),
    };
    assert_eq!(err.error_code(), "MANIFEST_ERROR");
    let msg = err.to_string();
    assert!(msg.contains("local_md5.json"));
    assert!(msg.contains("xxh3"));
    assert!(msg.contains("a.car"));
}

#[test]
fn codes_are_distinct_per_subsystem() {
    let codes: HashSet<&str> = [
        error_code::SCAN_ERROR,
        error_code::HASH_ERROR,
        error_code::MANIFEST_ERROR,
        error_code::MANIFEST_LOCKED,
        error_code::REPORT_ERROR,
        error_code::STAGE_ERROR,
        error_code::CONFIG_ERROR,
        error_code::WORKER_POOL_ERROR,
        error_code::CANCELLED,
    ]
    .into_iter()
    .collect();
    assert_eq!(codes.len(), 9);
}
