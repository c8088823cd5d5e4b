//! Comparison report: classification lists, counts, and the text artifact.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use stowage_core::constants::REPORT_RULE_WIDTH;
use stowage_core::errors::ReportError;

/// Outcome of one comparison. Created once, never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Present on both sides with differing digests.
    pub mismatched: Vec<String>,
    /// Present in the authority, absent locally.
    pub missing: Vec<String>,
    /// Authoritative entries whose local digest matched.
    pub matched: usize,
}

impl ComparisonReport {
    pub fn is_clean(&self) -> bool {
        self.mismatched.is_empty() && self.missing.is_empty()
    }

    pub fn total_issues(&self) -> usize {
        self.mismatched.len() + self.missing.len()
    }

    /// Number of authoritative entries examined.
    pub fn total_checked(&self) -> usize {
        self.matched + self.total_issues()
    }

    /// Render the report document generated at `generated_at`.
    pub fn render<Tz: TimeZone>(&self, generated_at: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut out = String::new();
        let _ = writeln!(out, "Content Verification Report");
        let _ = writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(out, "{}", "-".repeat(REPORT_RULE_WIDTH));
        out.push('\n');

        if self.is_clean() {
            out.push_str("Result: all files matched!\n");
            return out;
        }

        if !self.mismatched.is_empty() {
            out.push_str("Mismatched files:\n");
            for path in &self.mismatched {
                let _ = writeln!(out, "- {path}");
            }
            out.push('\n');
        }

        if !self.missing.is_empty() {
            out.push_str("Missing files:\n");
            for path in &self.missing {
                let _ = writeln!(out, "- {path}");
            }
            out.push('\n');
        }

        out.push_str("\nStatistics:\n");
        let _ = writeln!(out, "- Mismatched files: {}", self.mismatched.len());
        let _ = writeln!(out, "- Missing files: {}", self.missing.len());
        let _ = writeln!(out, "- Total problem files: {}", self.total_issues());
        out
    }

    /// Write the rendered report, stamped with the local time, to `path`.
    pub fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        std::fs::write(path, self.render(&Local::now())).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Short console summary.
    pub fn summary_lines(&self) -> Vec<String> {
        if self.is_clean() {
            return vec![format!(
                "Verification complete: all {} files matched",
                self.total_checked()
            )];
        }
        vec![
            format!("Found {} problem files:", self.total_issues()),
            format!("- {} files with mismatched digests", self.mismatched.len()),
            format!("- {} files missing", self.missing.len()),
        ]
    }
}
