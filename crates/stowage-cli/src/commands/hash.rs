//! `stowage hash --mode generate|verify`.

use std::path::PathBuf;
use std::process::ExitCode;

use stowage_core::cancellation::ScanCancellation;
use stowage_core::config::{CliOverrides, StowageConfig};
use stowage_core::errors::PipelineError;
use stowage_verify::{Comparator, DigestBuilder, Manifest};
use tracing::warn;

use super::load_config;
use crate::progress::ProgressHandler;

/// Exit status when verification finds missing or mismatched files.
const EXIT_PROBLEMS_FOUND: u8 = 2;

pub struct HashArgs {
    pub config_file: Option<PathBuf>,
    pub directory: PathBuf,
    pub output: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub local_manifest: Option<PathBuf>,
    pub threads: Option<usize>,
    pub algorithm: Option<String>,
}

impl HashArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config_file: self.config_file.clone(),
            hash_algorithm: self.algorithm.clone(),
            hash_threads: self.threads,
            manifest: self.output.clone(),
            report: self.report.clone(),
            local_manifest: self.local_manifest.clone(),
            ..Default::default()
        }
    }
}

/// Builder from config, cancelled on Ctrl-C so completed digests stay recorded.
fn interruptible_builder(config: &StowageConfig) -> anyhow::Result<DigestBuilder> {
    let cancellation = ScanCancellation::new();
    let on_signal = cancellation.clone();
    ctrlc::set_handler(move || {
        warn!("interrupt received, finishing in-flight files");
        on_signal.cancel();
    })?;
    Ok(DigestBuilder::from_config(&config.hash)?.with_cancellation(cancellation))
}

pub fn generate(args: HashArgs) -> anyhow::Result<ExitCode> {
    let config = load_config(&args.overrides())?;
    let manifest_path = config.verify.effective_manifest();
    let builder = interruptible_builder(&config)?;

    println!("Processing files under {} ...", args.directory.display());
    let outcome = builder.build(&args.directory, &manifest_path, &ProgressHandler)?;

    println!(
        "Manifest {} holds {} files ({} hashed now, {} already recorded)",
        manifest_path.display(),
        outcome.manifest.len(),
        outcome.stats.hashed,
        outcome.stats.skipped
    );
    if !outcome.failures.is_empty() {
        println!(
            "{} files could not be hashed and were left out; rerun to retry",
            outcome.failures.len()
        );
    }
    if outcome.stats.duplicates > 0 {
        println!(
            "{} files share a manifest key with another file and were left out",
            outcome.stats.duplicates
        );
    }
    if outcome.cancelled {
        return Err(PipelineError::Cancelled.into());
    }
    Ok(ExitCode::SUCCESS)
}

pub fn verify(args: HashArgs) -> anyhow::Result<ExitCode> {
    let config = load_config(&args.overrides())?;
    let manifest_path = config.verify.effective_manifest();
    let report_path = config.verify.effective_report();
    let local_path = config.verify.effective_local_manifest();

    let authority = Manifest::read_from(&manifest_path).map_err(PipelineError::from)?;
    let builder = interruptible_builder(&config)?;

    println!("Verifying files under {} ...", args.directory.display());
    let verification = Comparator::new(&builder).compare(
        &authority,
        &args.directory,
        &local_path,
        &ProgressHandler,
    )?;

    // A partial local manifest would report unhashed files as missing.
    if verification.local_build.cancelled {
        return Err(PipelineError::Cancelled.into());
    }

    let report = &verification.report;
    report.write_to(&report_path).map_err(PipelineError::from)?;
    for line in report.summary_lines() {
        println!("{line}");
    }
    println!("Report saved to {}", report_path.display());

    if report.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_PROBLEMS_FOUND))
    }
}
