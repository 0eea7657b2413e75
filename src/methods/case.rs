// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Letter case changes

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
    Upper,
    Lower,
    /// First character upper case, the rest lower case
    Capitalize,
    /// Every whitespace-delimited word capitalized
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaseTarget {
    #[default]
    Name,
    Ext,
    All,
}

#[derive(Debug, Clone)]
pub struct CaseMethod {
    case_type: CaseType,
    apply_to: CaseTarget,
}

impl CaseMethod {
    pub fn new(case_type: CaseType, apply_to: CaseTarget) -> Self {
        Self { case_type, apply_to }
    }

    pub fn apply(&self, name: &str, extension: &str) -> (String, String) {
        let new_name = match self.apply_to {
            CaseTarget::Name | CaseTarget::All => self.convert(name),
            CaseTarget::Ext => name.to_string(),
        };
        let new_ext = match self.apply_to {
            CaseTarget::Ext | CaseTarget::All if !extension.is_empty() => self.convert(extension),
            _ => extension.to_string(),
        };
        (new_name, new_ext)
    }

    fn convert(&self, text: &str) -> String {
        match self.case_type {
            CaseType::Upper => text.to_uppercase(),
            CaseType::Lower => text.to_lowercase(),
            CaseType::Capitalize => capitalize(text),
            CaseType::Title => title_case(text),
        }
    }

    pub fn describe(&self) -> String {
        format!("Case {:?} ({:?})", self.case_type, self.apply_to)
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_whitespace() {
            out.push(c);
            at_word_start = true;
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_only() {
        let m = CaseMethod::new(CaseType::Upper, CaseTarget::Name);
        assert_eq!(m.apply("Holiday pic", ".jpg"), ("HOLIDAY PIC".into(), ".jpg".into()));
    }

    #[test]
    fn test_extension_only() {
        let m = CaseMethod::new(CaseType::Lower, CaseTarget::Ext);
        assert_eq!(m.apply("IMG", ".JPG"), ("IMG".into(), ".jpg".into()));
    }

    #[test]
    fn test_all() {
        let m = CaseMethod::new(CaseType::Upper, CaseTarget::All);
        assert_eq!(m.apply("img", ".jpg"), ("IMG".into(), ".JPG".into()));
        assert_eq!(m.apply("img", ""), ("IMG".into(), "".into()));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("hELLO wORLD"), "Hello world");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("émile"), "Émile");
    }

    #[test]
    fn test_title() {
        assert_eq!(title_case("the QUICK  brown_fox"), "The Quick  Brown_fox");
        assert_eq!(title_case(""), "");
    }
}
