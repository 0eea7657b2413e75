// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for rename-plus

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::executor::{ConflictPolicy, ExecuteOptions, DEFAULT_MAX_SUFFIX_ATTEMPTS};
use crate::methods::MethodSpec;
use crate::undo::DEFAULT_UNDO_CAPACITY;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub undo: UndoConfig,

    #[serde(default)]
    pub execution: ExecutionConfig,

    #[serde(default)]
    pub backup: BackupConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    /// Default pipeline used when no methods are given on the command line
    #[serde(default)]
    pub methods: Vec<MethodSpec>,

    /// Named templates, usable with `rename --template-name`
    #[serde(default)]
    pub templates: BTreeMap<String, SavedTemplate>,
}

/// A template stored under a name
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SavedTemplate {
    pub template: String,
    #[serde(default = "default_template_start")]
    pub start: i64,
}

impl SavedTemplate {
    pub fn to_spec(&self) -> MethodSpec {
        MethodSpec::Template { template: self.template.clone(), start: self.start }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct UndoConfig {
    #[serde(default = "default_undo_capacity")]
    pub capacity: usize,
}

/// How execution treats an occupied target
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolicyName {
    #[default]
    Fail,
    AutoSuffix,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub create_backup: bool,
    #[serde(default)]
    pub conflict_policy: PolicyName,
    #[serde(default = "default_max_suffix_attempts")]
    pub max_suffix_attempts: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BackupConfig {
    #[serde(default = "default_backup_dir")]
    pub directory: PathBuf,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HistoryConfig {
    #[serde(default = "default_history_path")]
    pub path: PathBuf,
    #[serde(default = "default_history_max")]
    pub max_entries: usize,
}

// Default value functions
fn default_undo_capacity() -> usize { DEFAULT_UNDO_CAPACITY }
fn default_max_suffix_attempts() -> u32 { DEFAULT_MAX_SUFFIX_ATTEMPTS }
fn default_backup_dir() -> PathBuf { PathBuf::from(".rename_plus_backups") }
fn default_retention_days() -> u32 { 30 }
fn default_history_path() -> PathBuf { PathBuf::from("rename_plus_history.jsonl") }
fn default_history_max() -> usize { 100 }
fn default_template_start() -> i64 { 1 }

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            capacity: default_undo_capacity(),
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            create_backup: false,
            conflict_policy: PolicyName::default(),
            max_suffix_attempts: default_max_suffix_attempts(),
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            directory: default_backup_dir(),
            retention_days: default_retention_days(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: default_history_path(),
            max_entries: default_history_max(),
        }
    }
}

impl ExecutionConfig {
    /// Executor options described by this configuration
    pub fn options(&self) -> ExecuteOptions {
        let policy = match self.conflict_policy {
            PolicyName::Fail => ConflictPolicy::Fail,
            PolicyName::AutoSuffix => ConflictPolicy::AutoSuffix {
                max_attempts: self.max_suffix_attempts,
            },
        };
        ExecuteOptions {
            create_backup: self.create_backup,
            policy,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::RenameError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Method for the template saved as `name`
    pub fn saved_template(&self, name: &str) -> crate::Result<MethodSpec> {
        self.templates
            .get(name)
            .map(SavedTemplate::to_spec)
            .ok_or_else(|| crate::RenameError::Config(format!("No saved template named '{}'", name)))
    }

    /// Store `template` under `name`, replacing any template of that name
    pub fn save_template(&mut self, name: &str, template: &str, start: i64) -> crate::Result<()> {
        let (name, template) = (name.trim(), template.trim());
        if name.is_empty() || template.is_empty() {
            return Err(crate::RenameError::Config(
                "Template name and template must not be empty".into(),
            ));
        }
        self.templates.insert(
            name.to_string(),
            SavedTemplate { template: template.to_string(), start },
        );
        Ok(())
    }

    /// Check values that parse but cannot work
    pub fn validate(&self) -> crate::Result<()> {
        if self.undo.capacity == 0 {
            return Err(crate::RenameError::Config("undo.capacity must be at least 1".into()));
        }
        if self.execution.conflict_policy == PolicyName::AutoSuffix
            && self.execution.max_suffix_attempts == 0
        {
            return Err(crate::RenameError::Config(
                "execution.max_suffix_attempts must be at least 1 with auto_suffix".into(),
            ));
        }
        if self.history.path.as_os_str().is_empty() {
            return Err(crate::RenameError::Config("history.path must not be empty".into()));
        }
        if let Some(name) = self.templates.iter().find(|(_, t)| t.template.is_empty()).map(|(n, _)| n) {
            return Err(crate::RenameError::Config(format!("templates.{} is empty", name)));
        }
        Ok(())
    }
}
