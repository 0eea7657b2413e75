// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Sequential numbering

use tracing::warn;

use super::Position;
use crate::validate::MAX_FILE_NAME_LEN;

/// Token replaced by the formatted counter in the number format
pub const NUMBER_TOKEN: &str = "{n}";

/// Appends or prepends a zero-padded counter.
///
/// The counter starts at `start`, advances by `step` after every `apply`,
/// and goes back to `start` on [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct NumberingMethod {
    start: i64,
    step: i64,
    digits: usize,
    format: String,
    position: Position,
    current: i64,
}

impl NumberingMethod {
    /// `digits` is capped at [`MAX_FILE_NAME_LEN`]; a wider counter could
    /// never produce a legal name.
    pub fn new(start: i64, step: i64, digits: usize, format: String, position: Position) -> Self {
        let digits = if digits > MAX_FILE_NAME_LEN {
            warn!("Numbering width {} capped at {}", digits, MAX_FILE_NAME_LEN);
            MAX_FILE_NAME_LEN
        } else {
            digits
        };
        Self { start, step, digits, format, position, current: start }
    }

    pub fn apply(&mut self, name: &str, extension: &str) -> (String, String) {
        let number = format!("{:0width$}", self.current, width = self.digits);
        let formatted = self.format.replace(NUMBER_TOKEN, &number);
        self.current = self.current.saturating_add(self.step);
        (self.position.attach(name, &formatted), extension.to_string())
    }

    /// Value the next `apply` will use
    pub fn current(&self) -> i64 {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = self.start;
    }

    pub fn describe(&self) -> String {
        format!(
            "Number from {} step {} ({} digits, '{}', {:?})",
            self.start, self.step, self.digits, self.format, self.position
        )
    }
}
