// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Literal find and replace

use regex::{NoExpand, Regex, RegexBuilder};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct ReplaceMethod {
    find: String,
    replace: String,
    case_sensitive: bool,
    full_match: bool,
    /// Escaped-literal matcher for case-insensitive partial replacement
    insensitive: Option<Regex>,
}

impl ReplaceMethod {
    pub fn new(find: String, replace: String, case_sensitive: bool, full_match: bool) -> Self {
        let insensitive = if !find.is_empty() && !case_sensitive && !full_match {
            match RegexBuilder::new(&regex::escape(&find))
                .case_insensitive(true)
                .build()
            {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Cannot build case-insensitive matcher for '{}': {}", find, e);
                    None
                }
            }
        } else {
            None
        };

        Self { find, replace, case_sensitive, full_match, insensitive }
    }

    pub fn apply(&self, name: &str, extension: &str) -> (String, String) {
        (self.replace_in(name), extension.to_string())
    }

    fn replace_in(&self, name: &str) -> String {
        if self.find.is_empty() {
            return name.to_string();
        }

        if self.full_match {
            let matches = if self.case_sensitive {
                name == self.find
            } else {
                name.to_lowercase() == self.find.to_lowercase()
            };
            return if matches { self.replace.clone() } else { name.to_string() };
        }

        if self.case_sensitive {
            return name.replace(&self.find, &self.replace);
        }

        match &self.insensitive {
            Some(re) => re.replace_all(name, NoExpand(&self.replace)).into_owned(),
            None => name.to_string(),
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "Replace '{}' with '{}'{}{}",
            self.find,
            self.replace,
            if self.case_sensitive { " (case-sensitive)" } else { "" },
            if self.full_match { " (whole name)" } else { "" }
        )
    }
}
