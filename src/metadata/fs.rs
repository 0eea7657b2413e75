// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! File system metadata: dates and sizes

use chrono::{DateTime, Local};
use std::path::Path;
use std::time::SystemTime;
use tracing::debug;

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Creation date as `YYYY-MM-DD`, falling back to the modification date on
/// platforms without birth time
pub fn date_created(path: &Path) -> Option<String> {
    let meta = std::fs::metadata(path)
        .map_err(|e| debug!("Cannot stat {:?}: {}", path, e))
        .ok()?;
    meta.created()
        .or_else(|_| meta.modified())
        .ok()
        .map(format_date)
}

/// Modification date as `YYYY-MM-DD`
pub fn date_modified(path: &Path) -> Option<String> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| debug!("Cannot read modification time of {:?}: {}", path, e))
        .ok()
        .map(format_date)
}

/// Human readable size such as `512B`, `2.0KB`, `1.5MB`
pub fn file_size(path: &Path) -> Option<String> {
    std::fs::metadata(path)
        .map_err(|e| debug!("Cannot read size of {:?}: {}", path, e))
        .ok()
        .map(|m| format_size(m.len()))
}

fn format_date(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format("%Y-%m-%d").to_string()
}

pub fn format_size(size: u64) -> String {
    if size < KB {
        format!("{}B", size)
    } else if size < MB {
        format!("{:.1}KB", size as f64 / KB as f64)
    } else if size < GB {
        format!("{:.1}MB", size as f64 / MB as f64)
    } else {
        format!("{:.1}GB", size as f64 / GB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(1023), "1023B");
        assert_eq!(format_size(1536), "1.5KB");
        assert_eq!(format_size(5 * MB), "5.0MB");
        assert_eq!(format_size(3 * GB / 2), "1.5GB");
    }
}
