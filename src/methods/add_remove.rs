// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Add or remove text

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Add,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveMode {
    /// Strip a number of characters from one edge
    Chars,
    /// Delete a `[start, end)` character range
    Range,
}

#[derive(Debug, Clone)]
pub struct AddRemoveMethod {
    operation: Operation,
    text: String,
    position: Position,
    mode: Option<RemoveMode>,
    start: Option<i64>,
    end: Option<i64>,
    /// Set when `start`/`end` were given but could not be parsed
    malformed: bool,
}

impl AddRemoveMethod {
    /// `start` and `end` are raw user input; unparsable values turn the
    /// removal into a no-op.
    pub fn new(
        operation: Operation,
        text: String,
        position: Position,
        mode: Option<RemoveMode>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Self {
        let (start_value, bad_start) = parse_bound(start);
        let (end_value, bad_end) = parse_bound(end);
        let malformed = bad_start || bad_end;
        if malformed && operation == Operation::Remove && mode.is_some() {
            warn!("Ignoring removal with malformed bounds: start={:?} end={:?}", start, end);
        }

        Self {
            operation,
            text,
            position,
            mode,
            start: start_value,
            end: end_value,
            malformed,
        }
    }

    pub fn apply(&self, name: &str, extension: &str) -> (String, String) {
        let new_name = match self.operation {
            Operation::Add => self.add(name),
            Operation::Remove => self.remove(name),
        };
        (new_name.unwrap_or_else(|| name.to_string()), extension.to_string())
    }

    fn add(&self, name: &str) -> Option<String> {
        if self.text.is_empty() {
            return None;
        }
        Some(self.position.attach(name, &self.text))
    }

    fn remove(&self, name: &str) -> Option<String> {
        match self.mode {
            Some(_) if self.malformed => None,
            Some(RemoveMode::Chars) => self.remove_chars(name),
            Some(RemoveMode::Range) => self.remove_range(name),
            None if self.text.is_empty() => None,
            None => Some(name.replace(&self.text, "")),
        }
    }

    fn remove_chars(&self, name: &str) -> Option<String> {
        let len = name.chars().count();
        let count = usize::try_from(self.start.unwrap_or(0)).ok()?;
        if count >= len {
            return None;
        }

        let kept: String = if self.position.is_leading() {
            name.chars().skip(count).collect()
        } else {
            name.chars().take(len - count).collect()
        };
        Some(kept)
    }

    fn remove_range(&self, name: &str) -> Option<String> {
        let len = name.chars().count() as i64;
        let start = self.start.unwrap_or(0);
        let end = self.end.unwrap_or(len);
        if !(0 <= start && start < end && end <= len) {
            return None;
        }

        let (start, end) = (start as usize, end as usize);
        Some(
            name.chars()
                .enumerate()
                .filter(|(i, _)| *i < start || *i >= end)
                .map(|(_, c)| c)
                .collect(),
        )
    }

    pub fn describe(&self) -> String {
        match (self.operation, self.mode) {
            (Operation::Add, _) => format!("Add '{}' ({:?})", self.text, self.position),
            (Operation::Remove, Some(RemoveMode::Chars)) => format!(
                "Remove {} chars ({:?})",
                self.start.unwrap_or(0),
                self.position
            ),
            (Operation::Remove, Some(RemoveMode::Range)) => format!(
                "Remove range {}..{}",
                self.start.unwrap_or(0),
                self.end.map(|e| e.to_string()).unwrap_or_else(|| "end".to_string())
            ),
            (Operation::Remove, None) => format!("Remove '{}'", self.text),
        }
    }
}

/// Parse an optional bound; returns `(value, malformed)`
fn parse_bound(raw: Option<&str>) -> (Option<i64>, bool) {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => (None, false),
        Some(s) => match s.parse::<i64>() {
            Ok(v) => (Some(v), false),
            Err(_) => (None, true),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(text: &str, position: Position) -> AddRemoveMethod {
        AddRemoveMethod::new(Operation::Add, text.to_string(), position, None, None, None)
    }

    fn remove(mode: Option<RemoveMode>, text: &str, position: Position, start: Option<&str>, end: Option<&str>) -> AddRemoveMethod {
        AddRemoveMethod::new(Operation::Remove, text.to_string(), position, mode, start, end)
    }

    #[test]
    fn test_add_at_edges() {
        assert_eq!(add("new_", Position::Before).apply("file", ".txt"), ("new_file".into(), ".txt".into()));
        assert_eq!(add("new_", Position::Start).apply("file", ".txt").0, "new_file");
        assert_eq!(add("_v2", Position::After).apply("file", ".txt").0, "file_v2");
        assert_eq!(add("_v2", Position::End).apply("file", ".txt").0, "file_v2");
        assert_eq!(add("", Position::End).apply("file", ".txt").0, "file");
    }

    #[test]
    fn test_remove_chars() {
        let m = remove(Some(RemoveMode::Chars), "", Position::Start, Some("4"), None);
        assert_eq!(m.apply("IMG_1234", ".jpg").0, "1234");

        let m = remove(Some(RemoveMode::Chars), "", Position::End, Some("2"), None);
        assert_eq!(m.apply("report_v2", ".doc").0, "report_");

        // Count at or beyond the length is a no-op
        let m = remove(Some(RemoveMode::Chars), "", Position::Start, Some("8"), None);
        assert_eq!(m.apply("IMG_1234", ".jpg").0, "IMG_1234");
    }

    #[test]
    fn test_remove_chars_malformed_count_is_identity() {
        let m = remove(Some(RemoveMode::Chars), "", Position::Start, Some("abc"), None);
        assert_eq!(m.apply("name", "").0, "name");

        let m = remove(Some(RemoveMode::Chars), "", Position::Start, Some("-2"), None);
        assert_eq!(m.apply("name", "").0, "name");
    }

    #[test]
    fn test_remove_range() {
        let m = remove(Some(RemoveMode::Range), "", Position::Start, Some("1"), Some("3"));
        assert_eq!(m.apply("abcdef", "").0, "adef");

        let m = remove(Some(RemoveMode::Range), "", Position::Start, Some("2"), None);
        assert_eq!(m.apply("abcdef", "").0, "ab");

        // Out of bounds or inverted ranges are no-ops
        let m = remove(Some(RemoveMode::Range), "", Position::Start, Some("3"), Some("2"));
        assert_eq!(m.apply("abcdef", "").0, "abcdef");
        let m = remove(Some(RemoveMode::Range), "", Position::Start, Some("0"), Some("10"));
        assert_eq!(m.apply("abcdef", "").0, "abcdef");
    }

    #[test]
    fn test_remove_range_unicode() {
        let m = remove(Some(RemoveMode::Range), "", Position::Start, Some("0"), Some("2"));
        assert_eq!(m.apply("ñéxyz", "").0, "xyz");
    }

    #[test]
    fn test_remove_text() {
        let m = remove(None, "_copy", Position::Before, None, None);
        assert_eq!(m.apply("a_copy_copy", ".png"), ("a".into(), ".png".into()));

        let m = remove(None, "", Position::Before, None, None);
        assert_eq!(m.apply("a_copy", ".png").0, "a_copy");
    }
}
