// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Persistent batch history for undo across runs
//!
//! One JSON object per line, appended after every batch that committed at
//! least one rename.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::executor::BatchResult;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRecord {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// A committed batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub renames: Vec<RenameRecord>,
    #[serde(default)]
    pub undone: bool,
}

impl BatchRecord {
    /// Record the committed renames of `result`, or `None` if there are none
    pub fn from_result(result: &BatchResult) -> Option<Self> {
        let renames: Vec<RenameRecord> = result
            .committed()
            .map(|o| RenameRecord {
                from: o.source.clone(),
                to: o.target.clone(),
            })
            .collect();

        (!renames.is_empty()).then(|| Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            renames,
            undone: false,
        })
    }

    /// `(from, to)` pairs in execution order
    pub fn pairs(&self) -> Vec<(PathBuf, PathBuf)> {
        self.renames
            .iter()
            .map(|r| (r.from.clone(), r.to.clone()))
            .collect()
    }
}

/// JSONL history file
pub struct History {
    path: PathBuf,
}

impl History {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn append(&self, record: &BatchRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(record)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }

    /// Read every record, oldest first; malformed lines are skipped
    pub fn read_all(&self) -> Result<Vec<BatchRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);

        let mut records = Vec::new();
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Skipping history line {}: {}", number + 1, e);
                }
            }
        }

        Ok(records)
    }

    /// The most recent `count` records, newest first
    pub fn get_recent(&self, count: usize) -> Result<Vec<BatchRecord>> {
        let mut records = self.read_all()?;
        records.reverse();
        records.truncate(count);
        Ok(records)
    }

    /// Newest record that has not been undone
    pub fn last_undoable(&self) -> Result<Option<BatchRecord>> {
        Ok(self.read_all()?.into_iter().rev().find(|r| !r.undone))
    }

    pub fn mark_undone(&self, id: &str) -> Result<()> {
        let records = self.read_all()?;
        self.rewrite(records.into_iter().map(|mut r| {
            if r.id == id {
                r.undone = true;
            }
            r
        }))
    }

    /// Keep only the newest `max` records
    pub fn trim(&self, max: usize) -> Result<()> {
        let records = self.read_all()?;
        if records.len() <= max {
            return Ok(());
        }
        let skip = records.len() - max;
        self.rewrite(records.into_iter().skip(skip))
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rewrite(&self, records: impl Iterator<Item = BatchRecord>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        for record in records {
            writeln!(writer, "{}", serde_json::to_string(&record)?)?;
        }
        writer.flush()?;
        Ok(())
    }
}
