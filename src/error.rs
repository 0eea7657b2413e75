// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for rename-plus

use thiserror::Error;

/// Result type alias for rename-plus operations
pub type Result<T> = std::result::Result<T, RenameError>;

/// rename-plus error types
///
/// Per-file problems (illegal names, collisions, failed renames) are surfaced
/// as entry statuses and outcomes, not as errors. This enum covers setup
/// failures and the few conditions a caller must react to.
#[derive(Error, Debug)]
pub enum RenameError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Method '{method}' failed: {reason}")]
    Method { method: String, reason: String },

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("A rename batch is already in progress")]
    BatchInProgress,

    #[error("Nothing to undo")]
    NothingToUndo,
}

impl RenameError {
    pub(crate) fn method(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Method {
            method: method.into(),
            reason: reason.into(),
        }
    }
}
