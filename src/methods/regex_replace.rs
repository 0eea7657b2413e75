// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Regular expression substitution

use regex::Regex;
use tracing::warn;

/// Replaces every match of a pattern in the name.
///
/// The replacement may reference groups as `$1`, `${name}`, or in the
/// backslash form `\1`, `\g<name>`.
#[derive(Debug, Clone)]
pub struct RegexMethod {
    pattern: String,
    replacement: String,
    compiled: Option<Regex>,
}

impl RegexMethod {
    /// Compile `pattern` once. An empty or invalid pattern turns the method
    /// into a permanent no-op.
    pub fn new(pattern: &str, replacement: &str) -> Self {
        let compiled = if pattern.is_empty() {
            None
        } else {
            match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Invalid regex '{}', method disabled: {}", pattern, e);
                    None
                }
            }
        };

        Self {
            pattern: pattern.to_string(),
            replacement: convert_backslash_groups(replacement),
            compiled,
        }
    }

    pub fn is_active(&self) -> bool {
        self.compiled.is_some()
    }

    pub fn apply(&self, name: &str, extension: &str) -> (String, String) {
        let Some(re) = &self.compiled else {
            return (name.to_string(), extension.to_string());
        };

        if let Some(group) = unknown_group(re, &self.replacement) {
            warn!(
                "Replacement '{}' refers to unknown group '{}' of '{}', leaving '{}' unchanged",
                self.replacement, group, self.pattern, name
            );
            return (name.to_string(), extension.to_string());
        }

        (re.replace_all(name, self.replacement.as_str()).into_owned(), extension.to_string())
    }

    pub fn describe(&self) -> String {
        format!("Regex '{}' -> '{}'", self.pattern, self.replacement)
    }
}

/// Rewrite `\N` and `\g<name>` references into `${N}` / `${name}`.
/// `\\` becomes a literal backslash.
fn convert_backslash_groups(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some(d) if d.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                    digits.push(d);
                    chars.next();
                }
                out.push_str(&format!("${{{}}}", digits));
            }
            Some('g') => {
                let rest: String = chars.clone().collect();
                match rest.strip_prefix("g<").and_then(|r| r.find('>').map(|end| (r, end))) {
                    Some((r, end)) => {
                        out.push_str(&format!("${{{}}}", &r[..end]));
                        // skip "g<" + name + ">"
                        for _ in 0..(r[..end].chars().count() + 3) {
                            chars.next();
                        }
                    }
                    None => out.push('\\'),
                }
            }
            Some('\\') => {
                out.push('\\');
                chars.next();
            }
            _ => out.push('\\'),
        }
    }
    out
}

/// First group reference in `replacement` the pattern does not define
fn unknown_group(re: &Regex, replacement: &str) -> Option<String> {
    let bytes = replacement.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        // `$$` is an escaped dollar
        if bytes.get(i + 1) == Some(&b'$') {
            i += 2;
            continue;
        }

        let (name, next) = if bytes.get(i + 1) == Some(&b'{') {
            match replacement[i + 2..].find('}') {
                Some(end) => (&replacement[i + 2..i + 2 + end], i + 3 + end),
                None => return None,
            }
        } else {
            let len = replacement[i + 1..]
                .bytes()
                .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
                .count();
            (&replacement[i + 1..i + 1 + len], i + 1 + len)
        };
        i = next;

        if name.is_empty() {
            continue;
        }
        let known = match name.parse::<usize>() {
            Ok(index) => index < re.captures_len(),
            Err(_) => re.capture_names().flatten().any(|n| n == name),
        };
        if !known {
            return Some(name.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_groups() {
        let m = RegexMethod::new(r"(\w+)-(\d+)", "${2}_${1}");
        assert_eq!(m.apply("photo-42", ".jpg"), ("42_photo".into(), ".jpg".into()));
    }

    #[test]
    fn test_trailing_word_chars_extend_group_name() {
        // `$2_` names a group called "2_", which does not exist
        let m = RegexMethod::new(r"(\w+)-(\d+)", "$2_$1");
        assert_eq!(m.apply("photo-42", "").0, "photo-42");
    }

    #[test]
    fn test_backslash_groups() {
        let m = RegexMethod::new(r"(\w+)-(\d+)", r"\2_\1");
        assert_eq!(m.apply("photo-42", "").0, "42_photo");

        let m = RegexMethod::new(r"(?P<year>\d{4})_(?P<rest>.+)", r"\g<rest>_\g<year>");
        assert_eq!(m.apply("2024_trip", "").0, "trip_2024");
    }

    #[test]
    fn test_replaces_all_matches() {
        let m = RegexMethod::new(r"\s+", "_");
        assert_eq!(m.apply("a  b c", "").0, "a_b_c");
    }

    #[test]
    fn test_invalid_pattern_is_permanent_identity() {
        let m = RegexMethod::new("(unclosed", "x");
        assert!(!m.is_active());
        assert_eq!(m.apply("keep", ".txt"), ("keep".into(), ".txt".into()));

        let m = RegexMethod::new("", "x");
        assert!(!m.is_active());
        assert_eq!(m.apply("keep", "").0, "keep");
    }

    #[test]
    fn test_unknown_group_is_identity() {
        let m = RegexMethod::new(r"(\d+)", "$3");
        assert!(m.is_active());
        assert_eq!(m.apply("file12", "").0, "file12");

        let m = RegexMethod::new(r"(\d+)", "${missing}");
        assert_eq!(m.apply("file12", "").0, "file12");
    }

    #[test]
    fn test_convert_backslash_groups() {
        assert_eq!(convert_backslash_groups(r"\1-\12"), "${1}-${12}");
        assert_eq!(convert_backslash_groups(r"\g<name>!"), "${name}!");
        assert_eq!(convert_backslash_groups(r"a\\b"), r"a\b");
        assert_eq!(convert_backslash_groups(r"\x"), r"\x");
    }

    #[test]
    fn test_escaped_dollar() {
        let m = RegexMethod::new("USD", "$$");
        assert_eq!(m.apply("10USD", "").0, "10$");
    }
}
