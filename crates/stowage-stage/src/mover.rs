//! Pattern-based mover: relocates finished files from a staging root into an
//! archive root, preserving their relative paths, on a fixed interval.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use stowage_core::config::MoverConfig;
use stowage_core::errors::StageError;
use stowage_core::events::{FileMovedEvent, VerifyEventHandler};
use tracing::{debug, info, warn};

use crate::files::{move_file, regular_files};

/// Result of one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveReport {
    /// `(from, to)` for every relocated file.
    pub moved: Vec<(PathBuf, PathBuf)>,
    /// Sources left in place because the destination already existed.
    pub conflicts: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, String)>,
}

#[derive(Debug, Clone)]
pub struct Mover {
    source: PathBuf,
    dest: PathBuf,
    prefix: String,
    suffix: String,
    interval: Duration,
}

impl Mover {
    pub fn new(
        source: impl Into<PathBuf>,
        dest: impl Into<PathBuf>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            prefix: prefix.into(),
            suffix: suffix.into(),
            interval,
        }
    }

    pub fn from_config(config: &MoverConfig) -> Self {
        Self::new(
            config.effective_source(),
            config.effective_dest(),
            config.effective_prefix(),
            config.effective_suffix(),
            config.effective_interval(),
        )
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a file name has the configured prefix and suffix.
    pub fn matches(&self, name: &str) -> bool {
        name.starts_with(&self.prefix) && name.ends_with(&self.suffix)
    }

    /// One pass over the staging root.
    ///
    /// Only an unreadable staging root is an error; per-file failures are
    /// collected and left for the next pass.
    pub fn run_once(&self, handler: &dyn VerifyEventHandler) -> Result<MoveReport, StageError> {
        let mut report = MoveReport::default();
        for from in regular_files(&self.source)? {
            let matched = from
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| self.matches(n));
            if !matched {
                continue;
            }
            let Ok(relative) = from.strip_prefix(&self.source) else {
                continue;
            };
            let to = self.dest.join(relative);
            match self.relocate(&from, &to) {
                Ok(()) => {
                    info!(from = %from.display(), to = %to.display(), "moved");
                    handler.on_file_moved(&FileMovedEvent {
                        from: from.clone(),
                        to: to.clone(),
                    });
                    report.moved.push((from, to));
                }
                Err(StageError::DestinationExists { path }) => {
                    warn!(from = %from.display(), existing = %path.display(), "destination exists, leaving source in place");
                    report.conflicts.push(from);
                }
                Err(e) => {
                    warn!(from = %from.display(), error = %e, "move failed");
                    report.failures.push((from, e.to_string()));
                }
            }
        }
        Ok(report)
    }

    fn relocate(&self, from: &Path, to: &Path) -> Result<(), StageError> {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).map_err(|source| StageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        move_file(from, to)
    }

    /// Run passes on a background thread until the handle is stopped.
    ///
    /// The first pass starts immediately; later passes follow `interval`
    /// after the previous one finishes.
    pub fn spawn(self, handler: Arc<dyn VerifyEventHandler>) -> Result<MoverHandle, StageError> {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let source = self.source.clone();
        let join = thread::Builder::new()
            .name("stowage-mover".into())
            .spawn(move || self.poll_loop(handler.as_ref(), &stop_rx))
            .map_err(|e| StageError::Io { path: source, source: e })?;
        Ok(MoverHandle {
            stop_tx,
            join: Some(join),
        })
    }

    fn poll_loop(&self, handler: &dyn VerifyEventHandler, stop_rx: &Receiver<()>) {
        let mut pass = 0u64;
        loop {
            pass += 1;
            match self.run_once(handler) {
                Ok(report) => info!(
                    pass,
                    files_moved = report.moved.len(),
                    conflicts = report.conflicts.len(),
                    failed = report.failures.len(),
                    "mover pass complete"
                ),
                Err(e) => warn!(pass, error = %e, "mover pass skipped"),
            }
            debug!(interval_secs = self.interval.as_secs(), "mover sleeping");
            match stop_rx.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        info!(passes = pass, "mover stopped");
    }
}

/// Handle to a running mover thread.
///
/// Dropping the handle stops the mover and joins its thread.
#[derive(Debug)]
pub struct MoverHandle {
    stop_tx: Sender<()>,
    join: Option<JoinHandle<()>>,
}

impl MoverHandle {
    /// Cloneable trigger that can stop the mover from another thread
    /// (e.g. a signal handler).
    pub fn stopper(&self) -> MoverStopper {
        MoverStopper {
            stop_tx: self.stop_tx.clone(),
        }
    }

    /// Wake the mover, wait for the current pass to finish and join it.
    pub fn stop(mut self) -> Result<(), StageError> {
        let _ = self.stop_tx.try_send(());
        self.join_thread()
    }

    /// Block until the mover exits on its own, i.e. until a stopper fires.
    pub fn wait(mut self) -> Result<(), StageError> {
        self.join_thread()
    }

    fn join_thread(&mut self) -> Result<(), StageError> {
        match self.join.take() {
            Some(handle) => handle.join().map_err(|_| StageError::MoverPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for MoverHandle {
    fn drop(&mut self) {
        let _ = self.stop_tx.try_send(());
        let _ = self.join_thread();
    }
}

#[derive(Debug, Clone)]
pub struct MoverStopper {
    stop_tx: Sender<()>,
}

impl MoverStopper {
    pub fn stop(&self) {
        let _ = self.stop_tx.try_send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_must_match_prefix_and_suffix() {
        let mover = Mover::new("/s", "/d", "baga6ea4seaq", ".car", Duration::from_secs(60));
        assert!(mover.matches("baga6ea4seaqabc.car"));
        assert!(!mover.matches("baga6ea4seaqabc.car.tmp"));
        assert!(!mover.matches("xbaga6ea4seaqabc.car"));
        assert!(!mover.matches("other.car"));
    }

    #[test]
    fn config_defaults_flow_through() {
        let mover = Mover::from_config(&MoverConfig::default());
        assert_eq!(mover.source(), Path::new("/ipfsdata/car"));
        assert_eq!(mover.dest(), Path::new("/datacap"));
        assert_eq!(mover.interval(), Duration::from_secs(60));
    }
}
