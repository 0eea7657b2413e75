// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Metadata lookup for rename methods and templates
//!
//! Methods only see the [`MetadataProvider`] trait. [`FileMetadataProvider`]
//! is the default implementation: file system stats, image dimensions and
//! audio tags, memoized per path.

pub mod audio;
pub mod fs;
pub mod image;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use audio::AudioTags;

/// Composite tag expanding to `<width>x<height>`
pub const DIMENSIONS_TAG: &str = "{width}x{height}";

/// Tags understood by templates, composite first so it is substituted
/// before its parts
pub const METADATA_TAGS: [&str; 13] = [
    DIMENSIONS_TAG,
    "{width}",
    "{height}",
    "{date_created}",
    "{date_modified}",
    "{file_size}",
    "{filename}",
    "{artist}",
    "{title}",
    "{album}",
    "{year}",
    "{track}",
    "{genre}",
];

/// Source of metadata values for a file
///
/// Calls must be idempotent: the same `(tag, path)` may be requested many
/// times within one batch.
pub trait MetadataProvider: Send + Sync {
    /// Resolve `tag` (e.g. `{date_created}`) for `path`, or `None` if the
    /// value is unavailable.
    fn extract(&self, tag: &str, path: &Path) -> Option<String>;
}

/// Default provider reading the file system, image headers and audio tags
#[derive(Default)]
pub struct FileMetadataProvider {
    image_cache: Mutex<HashMap<PathBuf, Option<(u32, u32)>>>,
    audio_cache: Mutex<HashMap<PathBuf, Option<AudioTags>>>,
}

impl FileMetadataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all memoized values
    pub fn clear_cache(&self) {
        lock(&self.image_cache).clear();
        lock(&self.audio_cache).clear();
    }

    fn dimensions(&self, path: &Path) -> Option<(u32, u32)> {
        if let Some(cached) = lock(&self.image_cache).get(path) {
            return *cached;
        }
        let dims = image::read_dimensions(path);
        lock(&self.image_cache).insert(path.to_path_buf(), dims);
        dims
    }

    fn audio_tags(&self, path: &Path) -> Option<AudioTags> {
        if let Some(cached) = lock(&self.audio_cache).get(path) {
            return cached.clone();
        }
        let tags = audio::read_tags(path);
        lock(&self.audio_cache).insert(path.to_path_buf(), tags.clone());
        tags
    }

    fn audio_field(&self, path: &Path, field: impl Fn(&AudioTags) -> Option<String>) -> Option<String> {
        self.audio_tags(path)
            .as_ref()
            .and_then(field)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

impl MetadataProvider for FileMetadataProvider {
    fn extract(&self, tag: &str, path: &Path) -> Option<String> {
        if !path.exists() {
            return None;
        }

        match tag {
            DIMENSIONS_TAG => self.dimensions(path).map(|(w, h)| format!("{}x{}", w, h)),
            "{width}" => self.dimensions(path).map(|(w, _)| w.to_string()),
            "{height}" => self.dimensions(path).map(|(_, h)| h.to_string()),
            "{date_created}" => fs::date_created(path),
            "{date_modified}" => fs::date_modified(path),
            "{file_size}" => fs::file_size(path),
            "{filename}" => path.file_name().map(|n| n.to_string_lossy().into_owned()),
            "{artist}" => self.audio_field(path, |t| t.artist.clone()),
            "{title}" => self.audio_field(path, |t| t.title.clone()),
            "{album}" => self.audio_field(path, |t| t.album.clone()),
            "{year}" => self.audio_field(path, |t| t.year.clone()),
            "{track}" => self.audio_field(path, |t| t.track.clone()),
            "{genre}" => self.audio_field(path, |t| t.genre.clone()),
            other => {
                debug!("Unknown metadata tag {} for {:?}", other, path);
                None
            }
        }
    }
}

// A poisoned cache only means another extraction panicked mid-insert; the
// map itself is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_none() {
        let provider = FileMetadataProvider::new();
        assert_eq!(provider.extract("{file_size}", Path::new("/no/such/file.bin")), None);
    }

    #[test]
    fn test_filesystem_tags() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, vec![b'x'; 2048]).unwrap();

        let provider = FileMetadataProvider::new();
        assert_eq!(provider.extract("{file_size}", &file).as_deref(), Some("2.0KB"));
        assert_eq!(provider.extract("{filename}", &file).as_deref(), Some("notes.txt"));

        let modified = provider.extract("{date_modified}", &file).unwrap();
        assert_eq!(modified.len(), 10);
        assert!(provider.extract("{date_created}", &file).is_some());
    }

    #[test]
    fn test_non_media_tags_are_absent() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "not an image").unwrap();

        let provider = FileMetadataProvider::new();
        assert_eq!(provider.extract(DIMENSIONS_TAG, &file), None);
        assert_eq!(provider.extract("{artist}", &file), None);
        assert_eq!(provider.extract("{custom}", &file), None);

        // Memoized miss stays a miss
        assert_eq!(provider.extract("{width}", &file), None);
        provider.clear_cache();
        assert_eq!(provider.extract("{height}", &file), None);
    }
}
