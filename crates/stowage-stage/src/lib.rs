//! stowage-stage: the file operations around the verification engine.
//!
//! - Flatten: move every file of a source tree into one flat directory
//! - Index: append a `[{"Path", "Size"}]` JSON listing of a tree to a file
//! - Mover: periodically relocate files matching a name pattern into an archive tree

pub mod files;
pub mod flatten;
pub mod index;
pub mod mover;

pub use flatten::{flatten, FlattenReport};
pub use index::{index_tree, IndexRecord, IndexReport};
pub use mover::{MoveReport, Mover, MoverHandle, MoverStopper};
