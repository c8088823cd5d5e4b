//! End-to-end tests of the `stowage` binary on scratch trees.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn stowage(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stowage"))
        .args(args)
        .current_dir(cwd)
        .env("HOME", cwd)
        .env_remove("STOWAGE_LOG")
        .env_remove("STOWAGE_HASH_ALGORITHM")
        .env_remove("STOWAGE_VERIFY_LOCAL_MANIFEST")
        .output()
        .unwrap()
}

fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn generate_then_verify_same_tree_is_clean() {
    let work = tempfile::tempdir().unwrap();
    write_file(work.path(), "data/a.car", "aaa");
    write_file(work.path(), "data/sub/b.car", "bbb");

    let out = stowage(work.path(), &["hash", "--mode", "generate", "--directory", "data"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(work.path().join("md5_list.json").exists());

    let out = stowage(work.path(), &["hash", "--mode", "verify", "--directory", "data"]);
    assert_eq!(out.status.code(), Some(0));
    let report = fs::read_to_string(work.path().join("verification_report.txt")).unwrap();
    assert!(report.contains("Result: all files matched!"));
    assert!(work.path().join("local_md5.json").exists());
}

#[test]
fn verify_reports_problems_with_exit_status_two() {
    let work = tempfile::tempdir().unwrap();
    write_file(work.path(), "origin/a.car", "aaa");
    write_file(work.path(), "origin/b.car", "bbb");
    write_file(work.path(), "copy/a.car", "tampered");

    let out = stowage(
        work.path(),
        &["hash", "--mode", "generate", "--directory", "origin", "--output", "origin.json"],
    );
    assert!(out.status.success());

    let out = stowage(
        work.path(),
        &[
            "hash", "--mode", "verify", "--directory", "copy", "--output", "origin.json",
            "--report", "report.txt",
        ],
    );
    assert_eq!(out.status.code(), Some(2));
    let report = fs::read_to_string(work.path().join("report.txt")).unwrap();
    assert!(report.contains("Mismatched files:\n- a.car\n"));
    assert!(report.contains("Missing files:\n- b.car\n"));
}

#[test]
fn verify_without_authority_fails_with_code() {
    let work = tempfile::tempdir().unwrap();
    fs::create_dir_all(work.path().join("data")).unwrap();
    let out = stowage(work.path(), &["hash", "--mode", "verify", "--directory", "data"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("[MANIFEST_ERROR]"));
    assert!(!work.path().join("verification_report.txt").exists());
}

#[test]
fn missing_directory_argument_is_usage_error() {
    let work = tempfile::tempdir().unwrap();
    let out = stowage(work.path(), &["hash", "--mode", "generate"]);
    assert!(!out.status.success());
    assert!(!work.path().join("md5_list.json").exists());
}

#[test]
fn project_config_selects_algorithm() {
    let work = tempfile::tempdir().unwrap();
    write_file(work.path(), "stowage.toml", "[hash]\nalgorithm = \"xxh3\"\n");
    write_file(work.path(), "data/a.bin", "a");

    let out = stowage(work.path(), &["hash", "--mode", "generate", "--directory", "data"]);
    assert!(out.status.success());
    let manifest = fs::read_to_string(work.path().join("md5_list.json")).unwrap();
    let value: std::collections::BTreeMap<String, String> =
        serde_json::from_str(&manifest).unwrap();
    assert_eq!(value["a.bin"].len(), 16);
}

#[test]
fn flatten_index_and_single_move_pass() {
    let work = tempfile::tempdir().unwrap();
    write_file(work.path(), "ds/src/x/one.bin", "1");
    write_file(work.path(), "ds/src/x/.DS_Store", "");

    let out = stowage(
        work.path(),
        &["flatten", "--source", "ds/src", "--target", "ds/raw"],
    );
    assert!(out.status.success());
    assert!(work.path().join("ds/raw/one.bin").exists());

    let out = stowage(work.path(), &["index", "--source", "ds/raw", "--output", "ds/ds.json"]);
    assert!(out.status.success());
    let index = fs::read_to_string(work.path().join("ds/ds.json")).unwrap();
    assert!(index.contains("\"Size\":1"));

    write_file(work.path(), "car/baga6ea4seaqpiece.car", "car");
    let out = stowage(
        work.path(),
        &["move", "--source", "car", "--dest", "datacap", "--once"],
    );
    assert!(out.status.success());
    assert!(work.path().join("datacap/baga6ea4seaqpiece.car").exists());
}
