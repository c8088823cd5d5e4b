//! Console progress: forwards builder and mover events to tracing.

use stowage_core::events::{
    BuildCompleteEvent, BuildStartedEvent, FileHashedEvent, VerifyEventHandler,
};
use tracing::{debug, info};

/// Log every `PROGRESS_EVERY` hashed files.
const PROGRESS_EVERY: usize = 1000;

#[derive(Debug, Default, Clone, Copy)]
pub struct ProgressHandler;

impl VerifyEventHandler for ProgressHandler {
    fn on_build_started(&self, event: &BuildStartedEvent) {
        info!(
            root = %event.root.display(),
            pending = event.pending,
            files_skipped = event.skipped,
            "hashing {} of {} files",
            event.pending,
            event.discovered
        );
    }

    fn on_file_hashed(&self, event: &FileHashedEvent) {
        debug!(path = %event.relative_path, "hashed");
        if event.processed % PROGRESS_EVERY == 0 || event.processed == event.total {
            info!("{}/{} files hashed", event.processed, event.total);
        }
    }

    fn on_build_complete(&self, event: &BuildCompleteEvent) {
        debug!(duration_ms = event.duration_ms, entries = event.manifest_size, "build finished");
    }
}
