//! Tests for the Stowage tracing setup.

use std::sync::Mutex;

use stowage_core::tracing::init_tracing;

/// Serializes tracing tests (env var manipulation).
static TRACING_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn per_crate_filter_is_accepted() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("STOWAGE_LOG", "stowage_verify=debug,stowage_stage=warn");
    init_tracing();
    std::env::remove_var("STOWAGE_LOG");
}

#[test]
fn init_tracing_is_idempotent() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    init_tracing();
    init_tracing();
}

#[test]
fn invalid_filter_falls_back_to_default() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("STOWAGE_LOG", "[[not a filter");
    init_tracing();
    std::env::remove_var("STOWAGE_LOG");
}
