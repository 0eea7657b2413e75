// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Pre-rename backups

use chrono::{Local, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Copies a file aside before it is renamed
pub trait BackupService: Send + Sync {
    /// Back up `path`, returning where the copy lives, or `None` on failure
    fn backup(&self, path: &Path) -> Option<PathBuf>;

    /// Put a backup copy back at `target`
    fn restore(&self, backup: &Path, target: &Path) -> bool;
}

/// Backups grouped into one folder per day under a root directory
///
/// `root/2025-01-31/photo_20250131_142501.jpg`
#[derive(Debug, Clone)]
pub struct DirectoryBackup {
    root: PathBuf,
}

const DAY_FORMAT: &str = "%Y-%m-%d";

impl DirectoryBackup {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn target_for(&self, path: &Path) -> std::io::Result<PathBuf> {
        let now = Local::now();
        let day_dir = self.root.join(now.format(DAY_FORMAT).to_string());
        fs::create_dir_all(&day_dir)?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let stamp = now.format("%Y%m%d_%H%M%S");

        let candidate = day_dir.join(format!("{}_{}{}", stem, stamp, ext));
        if !candidate.exists() {
            return Ok(candidate);
        }
        // Same file backed up twice within a second
        loop {
            let id = Uuid::new_v4().simple().to_string();
            let candidate = day_dir.join(format!("{}_{}_{}{}", stem, stamp, &id[..8], ext));
            if !candidate.exists() {
                return Ok(candidate);
            }
        }
    }

    /// Delete day folders older than `days`, returning how many were removed
    pub fn cleanup_older_than(&self, days: u32) -> usize {
        let Ok(read_dir) = fs::read_dir(&self.root) else {
            return 0;
        };
        let cutoff = Local::now().date_naive() - chrono::Duration::days(i64::from(days));

        let mut removed = 0;
        for dir in read_dir.flatten() {
            let name = dir.file_name().to_string_lossy().into_owned();
            let Ok(date) = NaiveDate::parse_from_str(&name, DAY_FORMAT) else {
                continue;
            };
            if date >= cutoff || !dir.path().is_dir() {
                continue;
            }
            match fs::remove_dir_all(dir.path()) {
                Ok(()) => {
                    debug!("Removed old backups {:?}", dir.path());
                    removed += 1;
                }
                Err(e) => warn!("Failed to remove {:?}: {}", dir.path(), e),
            }
        }
        if removed > 0 {
            info!("Cleaned up {} backup folder(s) older than {} days", removed, days);
        }
        removed
    }
}

impl BackupService for DirectoryBackup {
    fn backup(&self, path: &Path) -> Option<PathBuf> {
        let result = self
            .target_for(path)
            .and_then(|target| fs::copy(path, &target).map(|_| target));
        match result {
            Ok(target) => {
                debug!("Backed up {:?} to {:?}", path, target);
                Some(target)
            }
            Err(e) => {
                warn!("Backup of {:?} failed: {}", path, e);
                None
            }
        }
    }

    fn restore(&self, backup: &Path, target: &Path) -> bool {
        match fs::copy(backup, target) {
            Ok(_) => {
                info!("Restored {:?} from backup", target);
                true
            }
            Err(e) => {
                warn!("Restore of {:?} from {:?} failed: {}", target, backup, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_backup_and_restore() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("photo.jpg");
        fs::write(&file, b"pixels").unwrap();

        let service = DirectoryBackup::new(dir.path().join("backups"));
        let copy = service.backup(&file).unwrap();
        assert!(copy.starts_with(dir.path().join("backups")));
        assert_eq!(copy.extension().unwrap(), "jpg");
        assert!(copy.file_name().unwrap().to_string_lossy().starts_with("photo_"));

        fs::remove_file(&file).unwrap();
        assert!(service.restore(&copy, &file));
        assert_eq!(fs::read(&file).unwrap(), b"pixels");
    }

    #[test]
    fn test_repeated_backups_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, "v1").unwrap();

        let service = DirectoryBackup::new(dir.path().join("b"));
        let first = service.backup(&file).unwrap();
        let second = service.backup(&file).unwrap();
        assert_ne!(first, second);
        assert!(first.exists() && second.exists());
    }

    #[test]
    fn test_missing_source() {
        let dir = TempDir::new().unwrap();
        let service = DirectoryBackup::new(dir.path().join("b"));
        assert!(service.backup(&dir.path().join("gone.txt")).is_none());
        assert!(!service.restore(&dir.path().join("nope"), &dir.path().join("x")));
    }

    #[test]
    fn test_cleanup_older_than() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("b");
        fs::create_dir_all(root.join("2001-01-01")).unwrap();
        fs::create_dir_all(root.join("not-a-date")).unwrap();
        let today = Local::now().format(DAY_FORMAT).to_string();
        fs::create_dir_all(root.join(&today)).unwrap();

        let service = DirectoryBackup::new(&root);
        assert_eq!(service.cleanup_older_than(30), 1);
        assert!(!root.join("2001-01-01").exists());
        assert!(root.join("not-a-date").exists());
        assert!(root.join(today).exists());
    }
}
