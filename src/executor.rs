// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Batch rename execution
//!
//! The executor works on owned [`RenameJob`]s planned from the entry list and
//! hands back a [`BatchResult`]; the owner of the entries applies it. This
//! keeps the entry list on one task while the file system work runs on
//! another.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::backup::BackupService;
use crate::conflicts::same_file;
use crate::entry::{split_name, FileEntry};
use crate::{RenameError, Result};

/// Default bound for [`ConflictPolicy::AutoSuffix`]
pub const DEFAULT_MAX_SUFFIX_ATTEMPTS: u32 = 1000;

/// What to do when a target path is occupied at execution time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Leave the file alone and record `target exists`
    #[default]
    Fail,
    /// Try `name_1`, `name_2`, ... up to `max_attempts`
    AutoSuffix { max_attempts: u32 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteOptions {
    pub create_backup: bool,
    pub policy: ConflictPolicy,
}

/// Per-entry execution state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum RenameState {
    Queued,
    Renaming,
    Committed,
    Failed(String),
}

/// One planned rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameJob {
    /// Position of the entry in the list it was planned from
    pub index: usize,
    pub source: PathBuf,
    pub target: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryOutcome {
    pub index: usize,
    pub source: PathBuf,
    /// Final path; differs from the planned target under auto-suffix
    pub target: PathBuf,
    pub state: RenameState,
    pub backup: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResult {
    pub success_count: usize,
    pub error_count: usize,
    pub cancelled: bool,
    pub outcomes: Vec<EntryOutcome>,
}

impl BatchResult {
    /// Committed `(source, target)` pairs in execution order
    pub fn committed(&self) -> impl Iterator<Item = &EntryOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.state == RenameState::Committed)
    }

    /// Point every committed entry at its new path
    pub fn apply_to(&self, entries: &mut [FileEntry]) {
        for outcome in self.committed() {
            match entries.get_mut(outcome.index) {
                Some(entry) if entry.current_path() == outcome.source => {
                    entry.relocate(outcome.target.clone());
                }
                _ => warn!("Outcome for {:?} does not match the entry list", outcome.source),
            }
        }
    }
}

/// Cooperative cancellation, checked before each entry
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Receives `(current, total, label)` after each entry
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, current: usize, total: usize, label: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(usize, usize, &str) + Send + Sync,
{
    fn on_progress(&self, current: usize, total: usize, label: &str) {
        self(current, total, label)
    }
}

/// Receives one human-readable line per rename
pub trait LogSink: Send + Sync {
    fn on_log(&self, message: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_log(&self, message: &str) {
        self(message)
    }
}

/// Build jobs for every ready entry whose name changes, in list order
pub fn plan(entries: &[FileEntry]) -> Vec<RenameJob> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.status().is_ready() && e.is_changed())
        .map(|(index, e)| RenameJob {
            index,
            source: e.current_path().to_path_buf(),
            target: e.proposed_path(),
        })
        .collect()
}

/// Runs rename batches one at a time
#[derive(Default)]
pub struct RenameExecutor {
    backup: Option<Arc<dyn BackupService>>,
    progress: Option<Arc<dyn ProgressSink>>,
    log: Option<Arc<dyn LogSink>>,
    running: AtomicBool,
}

/// Clears the running flag when a batch ends, even by panic
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl RenameExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backup(mut self, service: Arc<dyn BackupService>) -> Self {
        self.backup = Some(service);
        self
    }

    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Arc::new(sink));
        self
    }

    pub fn with_log(mut self, sink: impl LogSink + 'static) -> Self {
        self.log = Some(Arc::new(sink));
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Execute `jobs` in order.
    ///
    /// Per-file failures are recorded in the outcomes and never abort the
    /// batch. Fails only when another batch is already running.
    pub fn run(
        &self,
        jobs: Vec<RenameJob>,
        options: &ExecuteOptions,
        cancel: &CancelFlag,
    ) -> Result<BatchResult> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(RenameError::BatchInProgress);
        }
        let _guard = RunGuard(&self.running);

        let total = jobs.len();
        let mut result = BatchResult {
            outcomes: jobs
                .iter()
                .map(|job| EntryOutcome {
                    index: job.index,
                    source: job.source.clone(),
                    target: job.target.clone(),
                    state: RenameState::Queued,
                    backup: None,
                })
                .collect(),
            ..Default::default()
        };

        info!("Renaming {} file(s)", total);

        for (i, outcome) in result.outcomes.iter_mut().enumerate() {
            if cancel.is_cancelled() {
                info!("Batch cancelled after {} of {} file(s)", i, total);
                result.cancelled = true;
                break;
            }

            outcome.state = RenameState::Renaming;
            self.rename_one(outcome, options);

            match &outcome.state {
                RenameState::Committed => {
                    result.success_count += 1;
                    self.log(&format!("Renamed {:?} -> {:?}", outcome.source, outcome.target));
                }
                RenameState::Failed(reason) => {
                    result.error_count += 1;
                    self.log(&format!("Failed {:?}: {}", outcome.source, reason));
                }
                _ => {}
            }

            if let Some(progress) = &self.progress {
                progress.on_progress(i + 1, total, &label(&outcome.source));
            }
        }

        info!(
            "Batch finished: {} renamed, {} failed{}",
            result.success_count,
            result.error_count,
            if result.cancelled { " (cancelled)" } else { "" }
        );
        Ok(result)
    }

    fn rename_one(&self, outcome: &mut EntryOutcome, options: &ExecuteOptions) {
        let source = outcome.source.clone();

        if !source.is_file() {
            error!("Source missing: {:?}", source);
            outcome.state = RenameState::Failed("source missing".to_string());
            return;
        }

        if outcome.target.exists() && !same_file(&source, &outcome.target) {
            match options.policy {
                ConflictPolicy::Fail => {
                    error!("Target exists: {:?}", outcome.target);
                    outcome.state = RenameState::Failed("target exists".to_string());
                    return;
                }
                ConflictPolicy::AutoSuffix { max_attempts } => {
                    match free_suffixed_path(&outcome.target, max_attempts) {
                        Some(free) => {
                            debug!("Target {:?} taken, using {:?}", outcome.target, free);
                            outcome.target = free;
                        }
                        None => {
                            error!("No free name for {:?} after {} attempts", outcome.target, max_attempts);
                            outcome.state = RenameState::Failed("target exists".to_string());
                            return;
                        }
                    }
                }
            }
        }

        if options.create_backup {
            match &self.backup {
                Some(service) => outcome.backup = service.backup(&source),
                None => debug!("Backup requested but no backup service configured"),
            }
        }

        match std::fs::rename(&source, &outcome.target) {
            Ok(()) => {
                info!("Renamed {:?} -> {:?}", source, outcome.target);
                outcome.state = RenameState::Committed;
            }
            Err(e) => {
                error!("Failed to rename {:?}: {}", source, e);
                outcome.state = RenameState::Failed(e.to_string());
                if !source.is_file() {
                    if let (Some(service), Some(copy)) = (&self.backup, &outcome.backup) {
                        service.restore(copy, &source);
                    }
                }
            }
        }
    }

    fn log(&self, message: &str) {
        if let Some(sink) = &self.log {
            sink.on_log(message);
        }
    }
}

/// Plan, run and apply a batch in one call
pub fn execute_rename(
    entries: &mut [FileEntry],
    options: &ExecuteOptions,
    cancel: &CancelFlag,
) -> Result<BatchResult> {
    let result = RenameExecutor::new().run(plan(entries), options, cancel)?;
    result.apply_to(entries);
    Ok(result)
}

fn label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// First `stem_N.ext` next to `target` that does not exist
fn free_suffixed_path(target: &Path, max_attempts: u32) -> Option<PathBuf> {
    let (stem, ext) = split_name(target);
    let dir = target.parent()?;
    (1..=max_attempts)
        .map(|n| dir.join(format!("{}_{}{}", stem, n, ext)))
        .find(|candidate| !candidate.exists())
}
