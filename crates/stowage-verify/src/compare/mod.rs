//! Manifest comparison: authoritative vs. locally built.

pub mod comparator;
pub mod report;

pub use comparator::{compare_manifests, Comparator, Verification};
pub use report::ComparisonReport;
