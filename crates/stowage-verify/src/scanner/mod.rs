//! Tree scanner: lazy enumeration of regular files under a root.

pub mod types;
pub mod walker;

pub use types::FileRecord;
pub use walker::{relative_key, ScanIter, TreeScanner};
