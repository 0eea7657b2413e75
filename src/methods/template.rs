// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Full-rename templates
//!
//! A template replaces the base name outright unless it contains `{name}`.
//! Variables are substituted in a fixed order so that the file's own name is
//! inserted last and can never be re-read as a variable:
//!
//! 1. `{ext}` - extension without the leading dot
//! 2. `{n}` and `{n:0Nd}` - per-template file number
//! 3. metadata tags such as `{date_created}` or `{width}x{height}`
//! 4. conditional blocks `{if:COND:THEN:ELSE}`
//! 5. `{name}`
//!
//! Conditions support `left==right`, `left!=right`, `left in right` and a
//! bare truthy test. Blocks found in one scan are spliced right to left and
//! the text is rescanned until no block is left, so nested blocks resolve
//! from the inside out.

use regex::{NoExpand, Regex};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::metadata::{MetadataProvider, METADATA_TAGS};
use crate::validate::MAX_FILE_NAME_LEN;
use crate::{RenameError, Result};

/// Upper bound on conditional rescans for one file
pub const MAX_CONDITIONAL_PASSES: usize = 32;

const NAME_TOKEN: &str = "{name}";
const EXT_TOKEN: &str = "{ext}";
const NUMBER_TOKEN: &str = "{n}";

fn padded_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{n:0?(\d+)d\}").expect("valid padded number pattern"))
}

// Condition and THEN may not contain a bare ':'; every part may contain
// simple `{token}` groups.
fn conditional_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\{if:((?:[^:{}]|\{[^{}]*\})*):((?:[^:{}]|\{[^{}]*\})*):((?:[^{}]|\{[^{}]*\})*)\}",
        )
        .expect("valid conditional pattern")
    })
}

#[derive(Clone)]
pub struct TemplateMethod {
    template: String,
    start: i64,
    file_number: i64,
    /// Zero-pad width taken from the first `{n:0Nd}` token, capped at the
    /// longest legal file name
    pad_width: Option<usize>,
    /// Metadata tags present in the template, composite tag first
    tags: Vec<&'static str>,
    provider: Option<Arc<dyn MetadataProvider>>,
}

impl TemplateMethod {
    pub fn new(template: String, start: i64, provider: Option<Arc<dyn MetadataProvider>>) -> Self {
        let pad_width = padded_number_re()
            .captures(&template)
            .and_then(|c| c[1].parse::<usize>().ok())
            .map(|width| width.min(MAX_FILE_NAME_LEN));
        let tags = METADATA_TAGS
            .iter()
            .copied()
            .filter(|tag| template.contains(tag))
            .collect();

        Self {
            template,
            start,
            file_number: start,
            pad_width,
            tags,
            provider,
        }
    }

    /// Number the next `apply` will use
    pub fn file_number(&self) -> i64 {
        self.file_number
    }

    pub fn reset(&mut self) {
        self.file_number = self.start;
    }

    pub fn apply(&mut self, name: &str, extension: &str, path: &Path) -> Result<(String, String)> {
        if self.template.is_empty() {
            return Ok((name.to_string(), extension.to_string()));
        }

        let number = self.file_number;
        self.file_number = self.file_number.saturating_add(1);

        let ext = extension.trim_start_matches('.');
        let mut out = self.template.replace(EXT_TOKEN, ext);

        if let Some(width) = self.pad_width {
            let padded = format!("{:0width$}", number, width = width);
            out = padded_number_re()
                .replace_all(&out, NoExpand(&padded))
                .into_owned();
        }
        out = out.replace(NUMBER_TOKEN, &number.to_string());

        let values = self.resolve_tags(path);
        for (tag, value) in &values {
            out = out.replace(tag, value);
        }

        let vars = Vars { name, ext, values: &values };
        let out = resolve_conditionals(out, &vars)?;

        Ok((out.replace(NAME_TOKEN, name), extension.to_string()))
    }

    /// Look up every tag the template uses, once per file
    fn resolve_tags(&self, path: &Path) -> Vec<(&'static str, String)> {
        self.tags
            .iter()
            .map(|&tag| {
                let value = self
                    .provider
                    .as_ref()
                    .and_then(|p| p.extract(tag, path))
                    .unwrap_or_default();
                if value.is_empty() {
                    debug!("Template tag {} empty for {:?}", tag, path);
                }
                (tag, value)
            })
            .collect()
    }

    pub fn describe(&self) -> String {
        format!("Template '{}'", self.template)
    }
}

impl fmt::Debug for TemplateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateMethod")
            .field("template", &self.template)
            .field("start", &self.start)
            .field("file_number", &self.file_number)
            .field("pad_width", &self.pad_width)
            .field("tags", &self.tags)
            .field("has_provider", &self.provider.is_some())
            .finish()
    }
}

/// Values available while evaluating conditional blocks
struct Vars<'a> {
    name: &'a str,
    ext: &'a str,
    values: &'a [(&'static str, String)],
}

impl Vars<'_> {
    /// Substitute `{ext}` and metadata; `{name}` only when `with_name`
    fn substitute(&self, text: &str, with_name: bool) -> String {
        let mut out = text.replace(EXT_TOKEN, self.ext);
        for (tag, value) in self.values {
            out = out.replace(tag, value);
        }
        if with_name {
            out = out.replace(NAME_TOKEN, self.name);
        }
        out
    }

    fn operand(&self, raw: &str) -> String {
        let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'');
        self.substitute(trimmed, true)
    }

    fn evaluate(&self, condition: &str) -> bool {
        if let Some((left, right)) = condition.split_once("==") {
            self.operand(left) == self.operand(right)
        } else if let Some((left, right)) = condition.split_once("!=") {
            self.operand(left) != self.operand(right)
        } else if let Some((left, right)) = condition.split_once(" in ") {
            self.operand(right).contains(&self.operand(left))
        } else {
            !self.substitute(condition, true).trim().is_empty()
        }
    }
}

fn resolve_conditionals(mut text: String, vars: &Vars<'_>) -> Result<String> {
    let re = conditional_re();

    for _ in 0..MAX_CONDITIONAL_PASSES {
        let blocks: Vec<_> = re
            .captures_iter(&text)
            .map(|c| {
                let whole = c.get(0).map(|m| m.range()).unwrap_or_default();
                (whole, c[1].to_string(), c[2].to_string(), c[3].to_string())
            })
            .collect();

        if blocks.is_empty() {
            return Ok(text);
        }

        for (range, condition, then_part, else_part) in blocks.into_iter().rev() {
            let branch = if vars.evaluate(&condition) { then_part } else { else_part };
            text.replace_range(range, &vars.substitute(&branch, false));
        }
    }

    if re.is_match(&text) {
        return Err(RenameError::method(
            "template",
            format!("conditional blocks still unresolved after {} passes", MAX_CONDITIONAL_PASSES),
        ));
    }
    Ok(text)
}
