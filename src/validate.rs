// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! File name legality checks

use crate::entry::EntryStatus;

/// Characters that may not appear in a file name
pub const RESERVED_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Device names reserved on Windows regardless of extension
pub const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// A full file name (name + extension) must be shorter than this many characters
pub const MAX_FILE_NAME_LEN: usize = 255;

/// Validate a proposed name and extension.
///
/// Rules are checked in order and the first failure is reported.
pub fn validate(name: &str, extension: &str) -> EntryStatus {
    if name.trim().is_empty() {
        return EntryStatus::Invalid("empty name".to_string());
    }

    if let Some(c) = name
        .chars()
        .find(|c| RESERVED_CHARS.contains(c) || c.is_control())
    {
        return EntryStatus::Invalid(format!("invalid character '{}'", c));
    }

    if RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(name)) {
        return EntryStatus::Invalid("reserved name".to_string());
    }

    if name.chars().count() + extension.chars().count() >= MAX_FILE_NAME_LEN {
        return EntryStatus::Invalid("name too long".to_string());
    }

    if name.ends_with('.') || name.ends_with(' ') {
        return EntryStatus::Invalid("trailing dot/space not allowed".to_string());
    }

    EntryStatus::Ready
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid(reason: &str) -> EntryStatus {
        EntryStatus::Invalid(reason.to_string())
    }

    #[test]
    fn test_empty_names() {
        assert_eq!(validate("", ".txt"), invalid("empty name"));
        assert_eq!(validate("   ", ".txt"), invalid("empty name"));
    }

    #[test]
    fn test_reserved_character_reports_first() {
        assert_eq!(validate("a:b", ".txt"), invalid("invalid character ':'"));
        assert_eq!(validate("a*b?c", ""), invalid("invalid character '*'"));
        assert_eq!(validate("tab\there", ""), invalid("invalid character '\t'"));
    }

    #[test]
    fn test_reserved_device_names() {
        assert_eq!(validate("CON", ".txt"), invalid("reserved name"));
        assert_eq!(validate("con", ""), invalid("reserved name"));
        assert_eq!(validate("Lpt9", ".log"), invalid("reserved name"));
        assert_eq!(validate("CONSOLE", ".txt"), EntryStatus::Ready);
        assert_eq!(validate("COM10", ".txt"), EntryStatus::Ready);
    }

    #[test]
    fn test_length_limit() {
        let name = "a".repeat(250);
        assert_eq!(validate(&name, ".txt"), EntryStatus::Ready);

        let name = "a".repeat(251);
        assert_eq!(validate(&name, ".txt"), invalid("name too long"));
    }

    #[test]
    fn test_length_counts_characters() {
        let name = "é".repeat(250);
        assert_eq!(validate(&name, ".txt"), EntryStatus::Ready);
    }

    #[test]
    fn test_trailing_dot_or_space() {
        assert_eq!(validate("name.", ".txt"), invalid("trailing dot/space not allowed"));
        assert_eq!(validate("name ", ""), invalid("trailing dot/space not allowed"));
        assert_eq!(validate(" name", ".txt"), EntryStatus::Ready);
    }

    #[test]
    fn test_first_failing_rule_wins() {
        // Reserved character beats trailing dot
        assert_eq!(validate("a|b.", ""), invalid("invalid character '|'"));
    }
}
