//! Event system for Stowage.
//! Trait with no-op defaults, synchronous dispatch from the orchestrating thread.

pub mod handler;
pub mod types;

pub use handler::{NoOpHandler, VerifyEventHandler};
pub use types::*;
