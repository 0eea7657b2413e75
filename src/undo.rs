// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Undo of committed batches

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::entry::FileEntry;
use crate::executor::BatchResult;
use crate::{RenameError, Result};

/// Default number of snapshots kept
pub const DEFAULT_UNDO_CAPACITY: usize = 100;

/// Location of one entry before a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotItem {
    /// Identifies the entry across renames
    pub source_path: PathBuf,
    pub path: PathBuf,
    pub base_name: String,
    pub extension: String,
    /// Where the batch moved the file, once recorded
    #[serde(default)]
    pub renamed_to: Option<PathBuf>,
}

/// Every entry's location captured before a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoSnapshot {
    pub items: Vec<SnapshotItem>,
}

impl UndoSnapshot {
    pub fn capture(entries: &[FileEntry]) -> Self {
        Self {
            items: entries
                .iter()
                .map(|e| SnapshotItem {
                    source_path: e.source_path().to_path_buf(),
                    path: e.current_path().to_path_buf(),
                    base_name: e.base_name().to_string(),
                    extension: e.extension().to_string(),
                    renamed_to: None,
                })
                .collect(),
        }
    }

    /// Note where each committed rename of `result` put its file, so the
    /// snapshot can still revert it after its entry leaves the list
    pub fn record(&mut self, result: &BatchResult) {
        for outcome in result.committed() {
            if let Some(item) = self.items.iter_mut().find(|i| i.path == outcome.source) {
                item.renamed_to = Some(outcome.target.clone());
            }
        }
    }
}

/// Outcome of one undo
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoReport {
    pub restored: usize,
    /// Files that no longer exist at their renamed location
    pub skipped: usize,
    /// Paths that could not be restored, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl UndoReport {
    pub fn is_clean(&self) -> bool {
        self.skipped == 0 && self.failed.is_empty()
    }
}

/// Bounded stack of snapshots; the oldest is evicted when full
#[derive(Debug, Clone)]
pub struct UndoLog {
    snapshots: VecDeque<UndoSnapshot>,
    capacity: usize,
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_CAPACITY)
    }
}

impl UndoLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, snapshot: UndoSnapshot) {
        if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Revert the latest snapshot, newest rename first.
    ///
    /// The snapshot is consumed even when some files cannot be restored.
    pub fn undo(&mut self, entries: &mut [FileEntry]) -> Result<UndoReport> {
        let snapshot = self.snapshots.pop_back().ok_or(RenameError::NothingToUndo)?;
        let mut report = UndoReport::default();

        for item in snapshot.items.iter().rev() {
            let Some(entry) = entries.iter_mut().find(|e| e.source_path() == item.source_path) else {
                match &item.renamed_to {
                    Some(renamed) => {
                        debug!("Entry for {:?} is gone, reverting by path", item.source_path);
                        restore_path(renamed, &item.path, &mut report);
                    }
                    None => {
                        warn!("Entry for {:?} is gone, skipping", item.source_path);
                        report.skipped += 1;
                    }
                }
                continue;
            };
            if entry.current_path() == item.path {
                continue;
            }

            let current = entry.current_path().to_path_buf();
            if restore_path(&current, &item.path, &mut report) {
                entry.restore(item.path.clone(), item.base_name.clone(), item.extension.clone());
            }
        }

        Ok(report)
    }
}

/// Reverse `(from, to)` renames without an entry list, newest first.
///
/// Used when undoing a batch recorded in history by another process.
pub fn revert_renames(pairs: &[(PathBuf, PathBuf)]) -> UndoReport {
    let mut report = UndoReport::default();

    for (from, to) in pairs.iter().rev() {
        restore_path(to, from, &mut report);
    }

    report
}

/// Move `current` back to `original`, counting the outcome in `report`
fn restore_path(current: &Path, original: &Path, report: &mut UndoReport) -> bool {
    if !current.exists() {
        warn!("{:?} no longer exists, skipping", current);
        report.skipped += 1;
        return false;
    }
    if original.exists() {
        warn!("Cannot restore {:?}: path is occupied", original);
        report.failed.push((original.to_path_buf(), "original path occupied".to_string()));
        return false;
    }
    match fs::rename(current, original) {
        Ok(()) => {
            info!("Restored {:?} -> {:?}", current, original);
            report.restored += 1;
            true
        }
        Err(e) => {
            warn!("Failed to restore {:?}: {}", current, e);
            report.failed.push((original.to_path_buf(), e.to_string()));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{execute_rename, CancelFlag, ExecuteOptions};
    use tempfile::TempDir;

    fn setup(names: &[&str]) -> (TempDir, Vec<FileEntry>) {
        let dir = TempDir::new().unwrap();
        let entries = names
            .iter()
            .map(|n| {
                let path = dir.path().join(format!("{}.txt", n));
                fs::write(&path, n).unwrap();
                let mut e = FileEntry::new(path);
                e.set_proposal(format!("{}_renamed", n), ".txt".into());
                e
            })
            .collect();
        (dir, entries)
    }

    #[test]
    fn test_execute_then_undo_restores_everything() {
        let (dir, mut entries) = setup(&["a", "b", "c"]);
        let mut log = UndoLog::default();

        log.push(UndoSnapshot::capture(&entries));
        let result = execute_rename(&mut entries, &ExecuteOptions::default(), &CancelFlag::new()).unwrap();
        assert_eq!(result.success_count, 3);

        let report = log.undo(&mut entries).unwrap();
        assert_eq!(report.restored, 3);
        assert!(report.is_clean());
        for name in ["a", "b", "c"] {
            let path = dir.path().join(format!("{}.txt", name));
            assert_eq!(fs::read_to_string(&path).unwrap(), name);
        }
        assert_eq!(entries[0].base_name(), "a");
        assert_eq!(entries[0].current_path(), dir.path().join("a.txt"));
        assert!(log.is_empty());
    }

    #[test]
    fn test_undo_empty_log() {
        let mut log = UndoLog::default();
        assert!(matches!(log.undo(&mut []), Err(RenameError::NothingToUndo)));
    }

    #[test]
    fn test_missing_and_occupied_files() {
        let (dir, mut entries) = setup(&["a", "b"]);
        let mut log = UndoLog::default();
        log.push(UndoSnapshot::capture(&entries));
        execute_rename(&mut entries, &ExecuteOptions::default(), &CancelFlag::new()).unwrap();

        fs::remove_file(dir.path().join("a_renamed.txt")).unwrap();
        fs::write(dir.path().join("b.txt"), "squatter").unwrap();

        let report = log.undo(&mut entries).unwrap();
        assert_eq!(report.restored, 0);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed.len(), 1);
        assert!(dir.path().join("b_renamed.txt").exists());
        assert!(log.is_empty());
    }

    #[test]
    fn test_removed_entry_reverted_by_path() {
        let (dir, mut entries) = setup(&["a", "b"]);
        let mut snapshot = UndoSnapshot::capture(&entries);
        let result = execute_rename(&mut entries, &ExecuteOptions::default(), &CancelFlag::new()).unwrap();
        snapshot.record(&result);
        let mut log = UndoLog::default();
        log.push(snapshot);

        entries.remove(0);
        let report = log.undo(&mut entries).unwrap();
        assert_eq!(report.restored, 2);
        assert!(report.is_clean());
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "a");
        assert_eq!(entries[0].current_path(), dir.path().join("b.txt"));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut log = UndoLog::new(2);
        for _ in 0..3 {
            log.push(UndoSnapshot::default());
        }
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_revert_renames() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("old.txt");
        let to = dir.path().join("new.txt");
        fs::write(&to, "x").unwrap();

        let report = revert_renames(&[(from.clone(), to.clone()), (dir.path().join("gone"), dir.path().join("gone2"))]);
        assert_eq!(report.restored, 1);
        assert_eq!(report.skipped, 1);
        assert!(from.exists());
        assert!(!to.exists());
    }
}
