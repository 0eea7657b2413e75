// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Rename methods
//!
//! A method is one atomic transformation of `(name, extension)`. The set of
//! variants is closed: [`MethodSpec`] is the serializable configuration and
//! [`Method`] the constructed, ready-to-apply form. Bad configuration never
//! fails construction; the method degrades to an identity transform and logs
//! why.

pub mod add_remove;
pub mod case;
pub mod metadata;
pub mod numbering;
pub mod regex_replace;
pub mod replace;
pub mod template;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::metadata::MetadataProvider;
use crate::Result;

pub use add_remove::{AddRemoveMethod, Operation, RemoveMode};
pub use case::{CaseMethod, CaseTarget, CaseType};
pub use metadata::MetadataMethod;
pub use numbering::NumberingMethod;
pub use regex_replace::RegexMethod;
pub use replace::ReplaceMethod;
pub use template::TemplateMethod;

/// Where text is attached to a name
///
/// `Before`/`Start` and `After`/`End` are synonyms; both pairs exist because
/// the add/remove method historically offered all four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Before,
    After,
    Start,
    #[default]
    End,
}

impl Position {
    /// Whether the position refers to the beginning of the name
    pub fn is_leading(self) -> bool {
        matches!(self, Self::Before | Self::Start)
    }

    /// Attach `text` to `name` at this position
    pub fn attach(self, name: &str, text: &str) -> String {
        if self.is_leading() {
            format!("{}{}", text, name)
        } else {
            format!("{}{}", name, text)
        }
    }
}

/// Serializable method configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MethodSpec {
    AddRemove {
        operation: Operation,
        #[serde(default)]
        text: String,
        #[serde(default = "default_add_position")]
        position: Position,
        /// Removal mode; absent means "remove every occurrence of `text`"
        #[serde(default)]
        mode: Option<RemoveMode>,
        /// Raw user input: character count for `chars`, range start for `range`
        #[serde(default)]
        start: Option<String>,
        /// Raw user input: range end for `range`
        #[serde(default)]
        end: Option<String>,
    },
    Replace {
        find: String,
        #[serde(default)]
        replace: String,
        #[serde(default)]
        case_sensitive: bool,
        #[serde(default)]
        full_match: bool,
    },
    Case {
        case_type: CaseType,
        #[serde(default)]
        apply_to: CaseTarget,
    },
    Numbering {
        #[serde(default = "default_start")]
        start: i64,
        #[serde(default = "default_step")]
        step: i64,
        #[serde(default = "default_digits")]
        digits: usize,
        #[serde(default = "default_number_format")]
        format: String,
        #[serde(default)]
        position: Position,
    },
    Metadata {
        tag: String,
        #[serde(default)]
        position: Position,
    },
    Regex {
        pattern: String,
        #[serde(default)]
        replacement: String,
    },
    Template {
        template: String,
        #[serde(default = "default_start")]
        start: i64,
    },
}

fn default_add_position() -> Position { Position::Before }
fn default_start() -> i64 { 1 }
fn default_step() -> i64 { 1 }
fn default_digits() -> usize { 3 }
fn default_number_format() -> String { "({n})".to_string() }

/// A constructed rename method
#[derive(Debug, Clone)]
pub enum Method {
    AddRemove(AddRemoveMethod),
    Replace(ReplaceMethod),
    Case(CaseMethod),
    Numbering(NumberingMethod),
    Metadata(MetadataMethod),
    Regex(RegexMethod),
    Template(TemplateMethod),
}

impl Method {
    /// Build a method from its configuration.
    ///
    /// `provider` is only consulted by the metadata and template variants.
    pub fn from_spec(spec: &MethodSpec, provider: Option<Arc<dyn MetadataProvider>>) -> Self {
        match spec.clone() {
            MethodSpec::AddRemove { operation, text, position, mode, start, end } => {
                Self::AddRemove(AddRemoveMethod::new(
                    operation,
                    text,
                    position,
                    mode,
                    start.as_deref(),
                    end.as_deref(),
                ))
            }
            MethodSpec::Replace { find, replace, case_sensitive, full_match } => {
                Self::Replace(ReplaceMethod::new(find, replace, case_sensitive, full_match))
            }
            MethodSpec::Case { case_type, apply_to } => {
                Self::Case(CaseMethod::new(case_type, apply_to))
            }
            MethodSpec::Numbering { start, step, digits, format, position } => {
                Self::Numbering(NumberingMethod::new(start, step, digits, format, position))
            }
            MethodSpec::Metadata { tag, position } => {
                Self::Metadata(MetadataMethod::new(tag, position, provider))
            }
            MethodSpec::Regex { pattern, replacement } => {
                Self::Regex(RegexMethod::new(&pattern, &replacement))
            }
            MethodSpec::Template { template, start } => {
                Self::Template(TemplateMethod::new(template, start, provider))
            }
        }
    }

    /// Transform `(name, extension)` for the file at `path`.
    ///
    /// An `Err` means this call could not be completed; the pipeline logs it
    /// and carries the unchanged input on to the next method.
    pub fn apply(&mut self, name: &str, extension: &str, path: &Path) -> Result<(String, String)> {
        match self {
            Self::AddRemove(m) => Ok(m.apply(name, extension)),
            Self::Replace(m) => Ok(m.apply(name, extension)),
            Self::Case(m) => Ok(m.apply(name, extension)),
            Self::Numbering(m) => Ok(m.apply(name, extension)),
            Self::Metadata(m) => Ok(m.apply(name, extension, path)),
            Self::Regex(m) => Ok(m.apply(name, extension)),
            Self::Template(m) => m.apply(name, extension, path),
        }
    }

    /// Reset per-batch counters to their seeds
    pub fn reset(&mut self) {
        match self {
            Self::Numbering(m) => m.reset(),
            Self::Template(m) => m.reset(),
            _ => {}
        }
    }

    /// Short human-readable description
    pub fn display_name(&self) -> String {
        match self {
            Self::AddRemove(m) => m.describe(),
            Self::Replace(m) => m.describe(),
            Self::Case(m) => m.describe(),
            Self::Numbering(m) => m.describe(),
            Self::Metadata(m) => m.describe(),
            Self::Regex(m) => m.describe(),
            Self::Template(m) => m.describe(),
        }
    }

    /// Variant name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddRemove(_) => "add_remove",
            Self::Replace(_) => "replace",
            Self::Case(_) => "case",
            Self::Numbering(_) => "numbering",
            Self::Metadata(_) => "metadata",
            Self::Regex(_) => "regex",
            Self::Template(_) => "template",
        }
    }
}
