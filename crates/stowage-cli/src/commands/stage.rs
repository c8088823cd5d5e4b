//! `stowage flatten`, `stowage index`, `stowage move`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use stowage_core::config::CliOverrides;
use stowage_core::errors::PipelineError;
use stowage_stage::Mover;
use tracing::info;

use super::load_config;
use crate::progress::ProgressHandler;

fn config_only(config_file: Option<PathBuf>) -> CliOverrides {
    CliOverrides {
        config_file,
        ..Default::default()
    }
}

pub fn flatten(
    config_file: Option<PathBuf>,
    source: Option<PathBuf>,
    target: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    let config = load_config(&config_only(config_file))?;
    let source = source
        .or_else(|| config.stage.source_dir())
        .context("no source directory: pass --source or set stage.dataset_id")?;
    let target = target
        .or_else(|| config.stage.raw_dir())
        .context("no target directory: pass --target or set stage.dataset_id")?;

    let report = stowage_stage::flatten(
        &source,
        &target,
        &config.stage.effective_exclude_name(),
        &ProgressHandler,
    )
    .map_err(PipelineError::from)?;

    println!(
        "Moved {} files into {} ({} name collisions left in place, {} failed)",
        report.moved,
        target.display(),
        report.conflicts.len(),
        report.failures.len()
    );
    Ok(ExitCode::SUCCESS)
}

pub fn index(
    config_file: Option<PathBuf>,
    source: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    let config = load_config(&config_only(config_file))?;
    let source = source
        .or_else(|| config.stage.raw_dir())
        .context("no source directory: pass --source or set stage.dataset_id")?;
    let output = output
        .or_else(|| config.stage.index_file())
        .context("no output file: pass --output or set stage.dataset_id")?;

    let report = stowage_stage::index_tree(&source, &output).map_err(PipelineError::from)?;
    println!(
        "Index file {} generated ({} files, {} bytes)",
        report.output.display(),
        report.files,
        report.total_bytes
    );
    Ok(ExitCode::SUCCESS)
}

pub struct MoveArgs {
    pub config_file: Option<PathBuf>,
    pub source: Option<PathBuf>,
    pub dest: Option<PathBuf>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub interval: Option<u64>,
}

pub fn move_files(args: MoveArgs, once: bool) -> anyhow::Result<ExitCode> {
    let config = load_config(&CliOverrides {
        config_file: args.config_file,
        mover_source: args.source,
        mover_dest: args.dest,
        mover_prefix: args.prefix,
        mover_suffix: args.suffix,
        mover_interval_secs: args.interval,
        ..Default::default()
    })?;
    let mover = Mover::from_config(&config.mover);

    if once {
        let report = mover.run_once(&ProgressHandler).map_err(PipelineError::from)?;
        println!(
            "Moved {} files ({} destinations already existed, {} failed)",
            report.moved.len(),
            report.conflicts.len(),
            report.failures.len()
        );
        return Ok(ExitCode::SUCCESS);
    }

    info!(
        source = %mover.source().display(),
        dest = %mover.dest().display(),
        interval_secs = mover.interval().as_secs(),
        "mover running, Ctrl-C to stop"
    );
    let handle = mover
        .spawn(Arc::new(ProgressHandler))
        .map_err(PipelineError::from)?;
    let stopper = handle.stopper();
    ctrlc::set_handler(move || stopper.stop())?;
    handle.wait().map_err(PipelineError::from)?;
    Ok(ExitCode::SUCCESS)
}
