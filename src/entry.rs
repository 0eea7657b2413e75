// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! File entries and the deduplicated file set a batch operates on

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::validate::validate;

/// Status of an entry after pipeline application and conflict detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum EntryStatus {
    Pending,
    Ready,
    Invalid(String),
    Conflict(String),
}

impl EntryStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Ready => write!(f, "ready"),
            Self::Invalid(reason) => write!(f, "invalid: {}", reason),
            Self::Conflict(reason) => write!(f, "conflict: {}", reason),
        }
    }
}

/// One file under consideration for renaming
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    source_path: PathBuf,
    current_path: PathBuf,
    base_name: String,
    extension: String,
    proposed_name: String,
    proposed_extension: String,
    status: EntryStatus,
}

impl FileEntry {
    /// Create an entry for `path`, made absolute and normalized.
    ///
    /// The proposal starts out equal to the current name.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = normalize_path(path.as_ref());
        let (base_name, extension) = split_name(&path);
        Self {
            source_path: path.clone(),
            current_path: path,
            proposed_name: base_name.clone(),
            proposed_extension: extension.clone(),
            base_name,
            extension,
            status: EntryStatus::Pending,
        }
    }

    /// Absolute path at load time
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Path after the most recent committed rename
    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Extension including the leading dot, or empty
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn proposed_name(&self) -> &str {
        &self.proposed_name
    }

    pub fn proposed_extension(&self) -> &str {
        &self.proposed_extension
    }

    /// Proposed file name including extension
    pub fn proposed_file_name(&self) -> String {
        format!("{}{}", self.proposed_name, self.proposed_extension)
    }

    /// Full path the entry would be renamed to
    pub fn proposed_path(&self) -> PathBuf {
        self.directory().join(self.proposed_file_name())
    }

    /// Directory containing the file
    pub fn directory(&self) -> &Path {
        self.current_path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Whether the proposal differs from the current name
    pub fn is_changed(&self) -> bool {
        self.proposed_name != self.base_name || self.proposed_extension != self.extension
    }

    pub fn status(&self) -> &EntryStatus {
        &self.status
    }

    /// Record a new proposal and re-validate it.
    ///
    /// Any previous conflict mark is discarded.
    pub fn set_proposal(&mut self, name: String, extension: String) {
        self.status = validate(&name, &extension);
        self.proposed_name = name;
        self.proposed_extension = extension;
    }

    pub(crate) fn mark_conflict(&mut self, reason: impl Into<String>) {
        self.status = EntryStatus::Conflict(reason.into());
    }

    /// Point the entry at a new location after a commit or an undo.
    pub(crate) fn relocate(&mut self, path: PathBuf) {
        let (base_name, extension) = split_name(&path);
        self.base_name = base_name;
        self.extension = extension;
        self.current_path = path;
    }

    /// Restore the entry to a previously captured location.
    pub(crate) fn restore(&mut self, path: PathBuf, base_name: String, extension: String) {
        self.current_path = path;
        self.base_name = base_name;
        self.extension = extension;
    }
}

/// Split a path's file name into base name and extension (with dot).
///
/// Mirrors `Path::file_stem`/`Path::extension`: `.bashrc` has no extension,
/// `archive.tar.gz` splits into `archive.tar` and `.gz`.
pub fn split_name(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (stem, extension)
}

/// Make a path absolute and lexically clean it.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };
    path_clean::clean(absolute)
}

/// Ordered set of entries, deduplicated by normalized absolute path
#[derive(Debug, Default, Clone)]
pub struct FileSet {
    entries: Vec<FileEntry>,
    known: HashSet<PathBuf>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a regular file to the set.
    ///
    /// Returns `None` when the path is not a file or is already present.
    pub fn add(&mut self, path: impl AsRef<Path>) -> Option<&FileEntry> {
        let path = path.as_ref();
        if !path.is_file() {
            debug!("Skipping non-file: {:?}", path);
            return None;
        }

        let normalized = normalize_path(path);
        if !self.known.insert(normalized.clone()) {
            debug!("Skipping duplicate: {:?}", normalized);
            return None;
        }

        self.entries.push(FileEntry::new(normalized));
        self.entries.last()
    }

    /// Add several paths, returning how many were accepted
    pub fn add_all<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths
            .into_iter()
            .filter(|p| self.add(p).is_some())
            .count()
    }

    /// Add the regular files under `dir`, sorted by name within each folder.
    ///
    /// Only the top level is read unless `recursive` is set. Returns how many
    /// files were new.
    pub fn add_dir(&mut self, dir: impl AsRef<Path>, recursive: bool) -> usize {
        let dir = dir.as_ref();
        let max_depth = if recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name();

        let mut added = 0;
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    if self.add(entry.path()).is_some() {
                        added += 1;
                    }
                }
                Ok(_) => {}
                Err(e) => warn!("Cannot read under {:?}: {}", dir, e),
            }
        }
        debug!("Added {} file(s) from {:?}", added, dir);
        added
    }

    /// Remove the entry at `index`
    pub fn remove(&mut self, index: usize) -> Option<FileEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let entry = self.entries.remove(index);
        self.known.remove(entry.source_path());
        Some(entry)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.known.clear();
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [FileEntry] {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_split_name() {
        assert_eq!(
            split_name(Path::new("/tmp/photo.jpg")),
            ("photo".to_string(), ".jpg".to_string())
        );
        assert_eq!(
            split_name(Path::new("/tmp/archive.tar.gz")),
            ("archive.tar".to_string(), ".gz".to_string())
        );
        assert_eq!(
            split_name(Path::new("/tmp/.bashrc")),
            (".bashrc".to_string(), String::new())
        );
        assert_eq!(
            split_name(Path::new("/tmp/Makefile")),
            ("Makefile".to_string(), String::new())
        );
    }

    #[test]
    fn test_new_entry_is_pending() {
        let entry = FileEntry::new("/data/report.txt");
        assert_eq!(entry.base_name(), "report");
        assert_eq!(entry.extension(), ".txt");
        assert_eq!(entry.proposed_name(), "report");
        assert_eq!(entry.status(), &EntryStatus::Pending);
        assert!(!entry.is_changed());
        assert_eq!(entry.source_path(), entry.current_path());
    }

    #[test]
    fn test_set_proposal_validates() {
        let mut entry = FileEntry::new("/data/report.txt");
        entry.set_proposal("a:b".to_string(), ".txt".to_string());
        assert_eq!(
            entry.status(),
            &EntryStatus::Invalid("invalid character ':'".to_string())
        );

        entry.set_proposal("summary".to_string(), ".txt".to_string());
        assert!(entry.status().is_ready());
        assert_eq!(entry.proposed_path(), PathBuf::from("/data/summary.txt"));
    }

    #[test]
    fn test_file_set_deduplicates() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "a").unwrap();

        let mut set = FileSet::new();
        assert!(set.add(&file).is_some());
        assert!(set.add(dir.path().join(".").join("a.txt")).is_none());
        assert!(set.add(dir.path().join("missing.txt")).is_none());
        assert!(set.add(dir.path()).is_none());
        assert_eq!(set.len(), 1);

        let removed = set.remove(0).unwrap();
        assert_eq!(removed.base_name(), "a");
        assert!(set.is_empty());
        assert!(set.add(&file).is_some());
    }

    #[test]
    fn test_add_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("sub").join("deeper");
        std::fs::create_dir_all(&nested).unwrap();
        for path in [
            dir.path().join("b.txt"),
            dir.path().join("a.txt"),
            dir.path().join("sub").join("c.txt"),
            nested.join("d.txt"),
        ] {
            std::fs::write(path, "x").unwrap();
        }

        let mut set = FileSet::new();
        assert_eq!(set.add_dir(dir.path(), false), 2);
        let names: Vec<&str> = set.entries().iter().map(FileEntry::base_name).collect();
        assert_eq!(names, vec!["a", "b"]);

        // Files already present are not counted again
        assert_eq!(set.add_dir(dir.path(), true), 2);
        assert_eq!(set.len(), 4);
        assert!(set.entries().iter().any(|e| e.base_name() == "d"));
    }
}
