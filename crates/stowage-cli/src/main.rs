// stowage: manifest generation/verification and dataset staging

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use stowage_core::errors::StowageErrorCode;
use stowage_core::tracing::init_tracing_with_default;

mod commands;
mod progress;

#[derive(Parser)]
#[command(name = "stowage", version)]
#[command(about = "Incremental content verification and dataset staging", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ./stowage.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Build or update the manifest for a directory
    Generate,
    /// Compare a manifest against the directory and write a report
    Verify,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate or verify a content manifest
    Hash {
        #[arg(long, value_enum)]
        mode: Mode,

        /// Directory to hash
        #[arg(short, long)]
        directory: PathBuf,

        /// Manifest path (written by generate, read by verify)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report path (verify)
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Incremental manifest of the local tree (verify)
        #[arg(long)]
        local_manifest: Option<PathBuf>,

        /// Hashing threads, 0 = all cores
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Digest algorithm (md5, xxh3)
        #[arg(long)]
        algorithm: Option<String>,
    },

    /// Move every file of the dataset source tree into the flat raw directory
    Flatten {
        #[arg(long)]
        source: Option<PathBuf>,

        #[arg(long)]
        target: Option<PathBuf>,
    },

    /// Append a JSON index of the raw directory to the dataset index file
    Index {
        #[arg(long)]
        source: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Relocate finished files matching prefix+suffix into the archive root
    Move {
        #[arg(long)]
        source: Option<PathBuf>,

        #[arg(long)]
        dest: Option<PathBuf>,

        #[arg(long)]
        prefix: Option<String>,

        #[arg(long)]
        suffix: Option<String>,

        /// Seconds between passes
        #[arg(long)]
        interval: Option<u64>,

        /// Run a single pass and exit
        #[arg(long)]
        once: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "stowage=debug,stowage_core=debug,stowage_verify=debug,stowage_stage=debug"
    } else {
        stowage_core::tracing::setup::DEFAULT_FILTER
    };
    init_tracing_with_default(default_filter);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<stowage_core::errors::PipelineError>() {
                Some(pipeline) => eprintln!("error: {}", pipeline.tagged_string()),
                None => eprintln!("error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Hash {
            mode,
            directory,
            output,
            report,
            local_manifest,
            threads,
            algorithm,
        } => {
            let args = commands::hash::HashArgs {
                config_file: cli.config,
                directory,
                output,
                report,
                local_manifest,
                threads,
                algorithm,
            };
            match mode {
                Mode::Generate => commands::hash::generate(args),
                Mode::Verify => commands::hash::verify(args),
            }
        }
        Commands::Flatten { source, target } => {
            commands::stage::flatten(cli.config, source, target)
        }
        Commands::Index { source, output } => commands::stage::index(cli.config, source, output),
        Commands::Move {
            source,
            dest,
            prefix,
            suffix,
            interval,
            once,
        } => commands::stage::move_files(
            commands::stage::MoveArgs {
                config_file: cli.config,
                source,
                dest,
                prefix,
                suffix,
                interval,
            },
            once,
        ),
    }
}
