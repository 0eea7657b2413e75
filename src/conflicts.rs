// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Conflict detection between proposed names

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::entry::{normalize_path, FileEntry};

/// Mark `Ready` entries whose proposals collide.
///
/// Two passes, in list order:
/// 1. entries sharing a target path are all marked
///    `Conflict("N files map to the same name")`
/// 2. a remaining entry whose target already exists on disk is marked
///    `Conflict("target already exists")`, unless the target is the file
///    itself or will be vacated by another entry that is still `Ready`
pub fn detect_conflicts(entries: &mut [FileEntry]) {
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, entry) in entries.iter().enumerate() {
        if entry.status().is_ready() {
            groups.entry(target_key(&entry.proposed_path())).or_default().push(i);
        }
    }

    for members in groups.values().filter(|m| m.len() > 1) {
        let reason = format!("{} files map to the same name", members.len());
        for &i in members {
            debug!("Duplicate target for {:?}", entries[i].current_path());
            entries[i].mark_conflict(reason.clone());
        }
    }

    // An entry marked here will not move, so its path is no longer vacated
    // for the entries checked before it. Repeat until nothing changes.
    loop {
        let vacated: HashSet<String> = entries
            .iter()
            .filter(|e| e.status().is_ready() && e.is_changed())
            .map(|e| target_key(e.current_path()))
            .collect();

        let mut marked = false;
        for entry in entries.iter_mut().filter(|e| e.status().is_ready()) {
            let target = entry.proposed_path();
            let key = target_key(&target);
            if key == target_key(entry.current_path()) || !target.exists() {
                continue;
            }
            if same_file(entry.current_path(), &target) || vacated.contains(&key) {
                continue;
            }
            debug!("Target exists for {:?}: {:?}", entry.current_path(), target);
            entry.mark_conflict("target already exists");
            marked = true;
        }
        if !marked {
            break;
        }
    }
}

/// Comparison key for a target path; case-folded where the file system is
/// case-insensitive
fn target_key(path: &Path) -> String {
    let normalized: PathBuf = normalize_path(path);
    let key = normalized.to_string_lossy().into_owned();
    if cfg!(windows) {
        key.to_lowercase()
    } else {
        key
    }
}

pub(crate) fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryStatus;
    use std::fs;
    use tempfile::TempDir;

    fn entry(dir: &Path, name: &str, proposed: &str, ext: &str) -> FileEntry {
        let path = dir.join(format!("{}{}", name, ext));
        fs::write(&path, name).unwrap();
        let mut e = FileEntry::new(path);
        e.set_proposal(proposed.to_string(), ext.to_string());
        e
    }

    #[test]
    fn test_duplicate_targets_all_marked() {
        let dir = TempDir::new().unwrap();
        let mut entries = vec![
            entry(dir.path(), "a", "same", ".txt"),
            entry(dir.path(), "b", "same", ".txt"),
            entry(dir.path(), "c", "other", ".txt"),
        ];
        detect_conflicts(&mut entries);

        let dup = EntryStatus::Conflict("2 files map to the same name".into());
        assert_eq!(entries[0].status(), &dup);
        assert_eq!(entries[1].status(), &dup);
        assert!(entries[2].status().is_ready());
    }

    #[test]
    fn test_existing_target() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("taken.txt"), "x").unwrap();
        let mut entries = vec![entry(dir.path(), "a", "taken", ".txt")];
        detect_conflicts(&mut entries);
        assert_eq!(
            entries[0].status(),
            &EntryStatus::Conflict("target already exists".into())
        );
    }

    #[test]
    fn test_unchanged_entry_is_not_a_conflict() {
        let dir = TempDir::new().unwrap();
        let mut entries = vec![entry(dir.path(), "a", "a", ".txt")];
        detect_conflicts(&mut entries);
        assert!(entries[0].status().is_ready());
    }

    #[test]
    fn test_target_vacated_by_batch() {
        let dir = TempDir::new().unwrap();
        let mut entries = vec![
            entry(dir.path(), "a", "b", ".txt"),
            entry(dir.path(), "b", "c", ".txt"),
        ];
        detect_conflicts(&mut entries);
        assert!(entries.iter().all(|e| e.status().is_ready()));
    }

    #[test]
    fn test_blocked_rename_does_not_vacate() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("taken.txt"), "x").unwrap();
        // b cannot move to taken, so a cannot move to b
        let mut entries = vec![
            entry(dir.path(), "b", "taken", ".txt"),
            entry(dir.path(), "a", "b", ".txt"),
        ];
        detect_conflicts(&mut entries);

        let exists = EntryStatus::Conflict("target already exists".into());
        assert_eq!(entries[0].status(), &exists);
        assert_eq!(entries[1].status(), &exists);
    }

    #[test]
    fn test_blocked_chain_propagates() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("taken.txt"), "x").unwrap();
        // Checked in list order, the blockage only reaches a on a later round
        let mut entries = vec![
            entry(dir.path(), "a", "b", ".txt"),
            entry(dir.path(), "b", "c", ".txt"),
            entry(dir.path(), "c", "taken", ".txt"),
            entry(dir.path(), "d", "free", ".txt"),
        ];
        detect_conflicts(&mut entries);

        assert!(entries[..3]
            .iter()
            .all(|e| e.status() == &EntryStatus::Conflict("target already exists".into())));
        assert!(entries[3].status().is_ready());
    }

    #[test]
    fn test_invalid_entries_ignored() {
        let dir = TempDir::new().unwrap();
        let mut entries = vec![
            entry(dir.path(), "a", "x", ".txt"),
            entry(dir.path(), "b", "x", ".txt"),
        ];
        entries[1].set_proposal("bad?".into(), ".txt".into());
        detect_conflicts(&mut entries);
        assert!(entries[0].status().is_ready());
        assert!(matches!(entries[1].status(), EntryStatus::Invalid(_)));
    }
}
