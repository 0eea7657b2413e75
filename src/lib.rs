// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! rename-plus: batch file renaming
//!
//! Files are loaded into a [`FileSet`], an ordered [`Pipeline`] of rename
//! methods proposes new names, proposals are validated and checked for
//! conflicts, and the [`RenameExecutor`] commits them with optional backups.
//! Every committed batch can be reverted through the [`UndoLog`] or, across
//! runs, through the JSONL [`History`](history::History).

pub mod backup;
pub mod config;
pub mod conflicts;
pub mod entry;
pub mod error;
pub mod executor;
pub mod history;
pub mod metadata;
pub mod methods;
pub mod pipeline;
pub mod session;
pub mod undo;
pub mod validate;

pub use config::AppConfig;
pub use conflicts::detect_conflicts;
pub use entry::{EntryStatus, FileEntry, FileSet};
pub use error::{RenameError, Result};
pub use executor::{
    execute_rename, BatchResult, CancelFlag, ConflictPolicy, ExecuteOptions, RenameExecutor,
    RenameState,
};
pub use metadata::{FileMetadataProvider, MetadataProvider};
pub use methods::{Method, MethodSpec};
pub use pipeline::{apply_pipeline, build_pipeline, Pipeline};
pub use session::Session;
pub use undo::{revert_renames, UndoLog, UndoSnapshot};
pub use validate::validate;
