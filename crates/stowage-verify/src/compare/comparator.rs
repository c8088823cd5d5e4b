//! Classifies every authoritative entry as matching, mismatched, or missing.

use std::path::Path;

use stowage_core::errors::PipelineError;
use stowage_core::events::VerifyEventHandler;
use tracing::info;

use super::report::ComparisonReport;
use crate::builder::{BuildOutcome, DigestBuilder};
use crate::hasher::Digester;
use crate::manifest::Manifest;

/// Compare `local` against `authoritative`.
///
/// Asymmetric: paths that exist only locally are ignored, the authority
/// alone defines what should exist. Lists follow the authority's key order.
pub fn compare_manifests(authoritative: &Manifest, local: &Manifest) -> ComparisonReport {
    let mut report = ComparisonReport::default();
    for (path, expected) in authoritative.iter() {
        match local.get(path) {
            None => report.missing.push(path.to_string()),
            Some(actual) if actual != expected => report.mismatched.push(path.to_string()),
            Some(_) => report.matched += 1,
        }
    }
    report
}

/// Result of a verification: the classification plus the local build that fed it.
#[derive(Debug, Clone)]
pub struct Verification {
    pub report: ComparisonReport,
    pub local_build: BuildOutcome,
}

/// Runs an incremental build of the local tree, then compares.
pub struct Comparator<'a, D: Digester> {
    builder: &'a DigestBuilder<D>,
}

impl<'a, D: Digester> Comparator<'a, D> {
    pub fn new(builder: &'a DigestBuilder<D>) -> Self {
        Self { builder }
    }

    /// Build (or resume) the local manifest at `local_storage` for
    /// `local_root`, then classify every entry of `authoritative`.
    pub fn compare(
        &self,
        authoritative: &Manifest,
        local_root: &Path,
        local_storage: &Path,
        handler: &dyn VerifyEventHandler,
    ) -> Result<Verification, PipelineError> {
        let local_build = self.builder.build(local_root, local_storage, handler)?;
        let report = compare_manifests(authoritative, &local_build.manifest);
        info!(
            checked = authoritative.len(),
            matched = report.matched,
            mismatched = report.mismatched.len(),
            missing = report.missing.len(),
            "comparison complete"
        );
        Ok(Verification {
            report,
            local_build,
        })
    }
}
