//! VerifyEventHandler trait, all methods with no-op defaults.

use super::types::*;

/// Trait for observing digest builds and staging passes.
///
/// Handlers only override the events they care about. Events are emitted
/// from the orchestrating thread, never from hashing workers, but the trait
/// still requires `Send + Sync` so handlers can be shared with the mover thread.
pub trait VerifyEventHandler: Send + Sync {
    // ---- Build Lifecycle ----
    fn on_build_started(&self, _event: &BuildStartedEvent) {}
    fn on_file_hashed(&self, _event: &FileHashedEvent) {}
    fn on_file_failed(&self, _event: &FileFailedEvent) {}
    fn on_build_complete(&self, _event: &BuildCompleteEvent) {}

    // ---- Staging ----
    fn on_file_moved(&self, _event: &FileMovedEvent) {}
}

/// Handler that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl VerifyEventHandler for NoOpHandler {}
