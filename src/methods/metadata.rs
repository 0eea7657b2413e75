// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Metadata injection

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::Position;
use crate::metadata::MetadataProvider;

#[derive(Clone)]
pub struct MetadataMethod {
    tag: String,
    position: Position,
    provider: Option<Arc<dyn MetadataProvider>>,
}

impl MetadataMethod {
    pub fn new(tag: String, position: Position, provider: Option<Arc<dyn MetadataProvider>>) -> Self {
        Self { tag, position, provider }
    }

    pub fn apply(&self, name: &str, extension: &str, path: &Path) -> (String, String) {
        let value = self
            .provider
            .as_ref()
            .and_then(|p| p.extract(&self.tag, path))
            .filter(|v| !v.is_empty());

        match value {
            Some(v) => (self.position.attach(name, &v), extension.to_string()),
            None => {
                debug!("No value for {} on {:?}", self.tag, path);
                (name.to_string(), extension.to_string())
            }
        }
    }

    pub fn describe(&self) -> String {
        format!("Metadata {} ({:?})", self.tag, self.position)
    }
}

impl fmt::Debug for MetadataMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataMethod")
            .field("tag", &self.tag)
            .field("position", &self.position)
            .field("has_provider", &self.provider.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::test_support::MapProvider;

    #[test]
    fn test_injects_value() {
        let provider = MapProvider::with(&[("{width}x{height}", "1920x1080")]);
        let m = MetadataMethod::new("{width}x{height}".into(), Position::End, Some(provider.clone()));
        assert_eq!(
            m.apply("wall_", ".png", Path::new("/tmp/a.png")),
            ("wall_1920x1080".into(), ".png".into())
        );

        let m = MetadataMethod::new("{width}x{height}".into(), Position::Start, Some(provider));
        assert_eq!(m.apply("_wall", ".png", Path::new("/tmp/a.png")).0, "1920x1080_wall");
    }

    #[test]
    fn test_missing_value_or_provider_is_identity() {
        let provider = MapProvider::with(&[]);
        let m = MetadataMethod::new("{artist}".into(), Position::End, Some(provider));
        assert_eq!(m.apply("song", ".mp3", Path::new("/tmp/s.mp3")).0, "song");

        let m = MetadataMethod::new("{artist}".into(), Position::End, None);
        assert_eq!(m.apply("song", ".mp3", Path::new("/tmp/s.mp3")).0, "song");
    }
}
