// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Rename session
//!
//! Owns the file list, pipeline and undo log. Batches run on a blocking
//! worker; their results come back by value and are applied here, so the
//! entry list is only ever touched by the session's own task.

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::backup::DirectoryBackup;
use crate::config::AppConfig;
use crate::conflicts::detect_conflicts;
use crate::entry::{FileEntry, FileSet};
use crate::executor::{plan, BatchResult, CancelFlag, ExecuteOptions, RenameExecutor};
use crate::metadata::MetadataProvider;
use crate::methods::MethodSpec;
use crate::pipeline::{apply_pipeline, build_pipeline, Pipeline};
use crate::undo::{UndoLog, UndoReport, UndoSnapshot};
use crate::Result;

pub struct Session {
    provider: Option<Arc<dyn MetadataProvider>>,
    files: FileSet,
    pipeline: Pipeline,
    undo: UndoLog,
    executor: Arc<RenameExecutor>,
}

impl Session {
    /// Session with the configured default methods and a backup directory
    pub fn new(config: &AppConfig, provider: Option<Arc<dyn MetadataProvider>>) -> Self {
        let executor = RenameExecutor::new()
            .with_backup(Arc::new(DirectoryBackup::new(&config.backup.directory)));
        Self {
            pipeline: build_pipeline(&config.methods, provider.clone()),
            provider,
            files: FileSet::new(),
            undo: UndoLog::new(config.undo.capacity),
            executor: Arc::new(executor),
        }
    }

    /// Replace the executor, e.g. to attach progress or log sinks
    pub fn with_executor(mut self, executor: RenameExecutor) -> Self {
        self.executor = Arc::new(executor);
        self
    }

    /// Add files, returning how many were new
    pub fn add_paths<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let added = self.files.add_all(paths);
        debug!("Added {} file(s), {} total", added, self.files.len());
        added
    }

    /// Add the files of a folder, descending into subfolders when `recursive`
    pub fn add_dir(&mut self, dir: impl AsRef<Path>, recursive: bool) -> usize {
        self.files.add_dir(dir, recursive)
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    pub fn files_mut(&mut self) -> &mut FileSet {
        &mut self.files
    }

    pub fn entries(&self) -> &[FileEntry] {
        self.files.entries()
    }

    pub fn set_methods(&mut self, specs: &[MethodSpec]) {
        self.pipeline = build_pipeline(specs, self.provider.clone());
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    /// Recompute every proposal from fresh counters and mark conflicts
    pub fn preview(&mut self) -> &[FileEntry] {
        self.pipeline.reset();
        apply_pipeline(&mut self.pipeline, self.files.entries_mut());
        detect_conflicts(self.files.entries_mut());
        self.files.entries()
    }

    /// Run the ready entries of the last preview.
    ///
    /// A snapshot is pushed onto the undo log when anything was committed.
    pub async fn execute(&mut self, options: ExecuteOptions, cancel: &CancelFlag) -> Result<BatchResult> {
        let mut snapshot = UndoSnapshot::capture(self.files.entries());
        let jobs = plan(self.files.entries());
        let executor = Arc::clone(&self.executor);
        let cancel = cancel.clone();

        let result = tokio::task::spawn_blocking(move || executor.run(jobs, &options, &cancel)).await??;

        result.apply_to(self.files.entries_mut());
        if result.success_count > 0 {
            snapshot.record(&result);
            self.undo.push(snapshot);
        }
        info!(
            "Session batch: {} renamed, {} failed",
            result.success_count, result.error_count
        );
        Ok(result)
    }

    /// Revert the most recent batch
    pub fn undo(&mut self) -> Result<UndoReport> {
        self.undo.undo(self.files.entries_mut())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }
}
