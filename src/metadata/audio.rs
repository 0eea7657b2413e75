// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Audio tags via ID3 (MP3) and symphonia (everything else)

use id3::TagLike;
use std::path::Path;
use tracing::debug;

/// Tag values relevant to renaming
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<String>,
    pub track: Option<String>,
    pub genre: Option<String>,
}

impl AudioTags {
    fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Read tags, trying ID3 first for MP3 files
pub fn read_tags(path: &Path) -> Option<AudioTags> {
    let is_mp3 = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mp3"));

    let tags = if is_mp3 {
        read_id3(path).or_else(|| read_generic(path))
    } else {
        read_generic(path)
    };

    tags.filter(|t| !t.is_empty())
}

fn read_id3(path: &Path) -> Option<AudioTags> {
    let tag = match id3::Tag::read_from_path(path) {
        Ok(tag) => tag,
        Err(e) => {
            debug!("No ID3 tag in {:?}: {}", path, e);
            return None;
        }
    };

    let year = tag
        .year()
        .or_else(|| tag.date_recorded().map(|d| d.year))
        .map(|y| y.to_string());

    Some(AudioTags {
        title: tag.title().map(String::from),
        artist: tag.artist().map(String::from),
        album: tag.album().map(String::from),
        year,
        track: tag.track().map(|t| t.to_string()),
        genre: tag.genre().map(String::from),
    })
}

fn read_generic(path: &Path) -> Option<AudioTags> {
    use symphonia::core::formats::FormatOptions;
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::meta::{MetadataOptions, StandardTagKey};
    use symphonia::core::probe::Hint;

    let file = std::fs::File::open(path).ok()?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let mut probed = match symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    ) {
        Ok(probed) => probed,
        Err(e) => {
            debug!("Not an audio container {:?}: {}", path, e);
            return None;
        }
    };

    let mut tags = AudioTags::default();

    // Tags may live in the probe metadata (e.g. ID3v2 ahead of the stream)
    // or in the container itself
    let mut collect = |rev: &symphonia::core::meta::MetadataRevision| {
        for tag in rev.tags() {
            let value = Some(tag.value.to_string());
            match tag.std_key {
                Some(StandardTagKey::TrackTitle) => tags.title = value,
                Some(StandardTagKey::Artist) => tags.artist = value,
                Some(StandardTagKey::Album) => tags.album = value,
                Some(StandardTagKey::Genre) => tags.genre = value,
                Some(StandardTagKey::TrackNumber) => tags.track = value,
                Some(StandardTagKey::Date) => tags.year = value,
                _ => {}
            }
        }
    };

    if let Some(meta) = probed.metadata.get() {
        if let Some(rev) = meta.current() {
            collect(rev);
        }
    }
    if let Some(rev) = probed.format.metadata().current() {
        collect(rev);
    }

    Some(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_non_audio_file_has_no_tags() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("song.mp3");
        std::fs::write(&file, "definitely not mpeg").unwrap();
        assert_eq!(read_tags(&file), None);
    }

    #[test]
    fn test_id3_tags_are_read() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("track.mp3");
        std::fs::write(&file, b"").unwrap();

        let mut tag = id3::Tag::new();
        tag.set_artist("Nina Simone");
        tag.set_title("Sinnerman");
        tag.set_track(7);
        tag.write_to_path(&file, id3::Version::Id3v24).unwrap();

        let tags = read_tags(&file).unwrap();
        assert_eq!(tags.artist.as_deref(), Some("Nina Simone"));
        assert_eq!(tags.title.as_deref(), Some("Sinnerman"));
        assert_eq!(tags.track.as_deref(), Some("7"));
        assert_eq!(tags.album, None);
    }
}
