//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Default filter when `STOWAGE_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "stowage=info,stowage_core=info,stowage_verify=info,stowage_stage=info";

/// Initialize the Stowage tracing/logging system with the default filter.
///
/// Reads `STOWAGE_LOG` for per-crate log levels, e.g.
/// `STOWAGE_LOG=stowage_verify=debug,stowage_stage=warn`.
///
/// Idempotent: only the first call installs a subscriber.
pub fn init_tracing() {
    init_tracing_with_default(DEFAULT_FILTER);
}

/// Same as [`init_tracing`], with a caller-chosen fallback filter
/// (the CLI passes a `debug` filter for `--verbose`).
pub fn init_tracing_with_default(default_filter: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("STOWAGE_LOG")
            .unwrap_or_else(|_| EnvFilter::new(default_filter));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .with(filter)
            .init();
    });
}
