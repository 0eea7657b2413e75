// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! rename-plus undo utility
//!
//! Reverts the most recent batch recorded in the history log.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use rename_plus::history::History;
use rename_plus::revert_renames;

#[derive(Parser, Debug)]
#[command(name = "rename-plus-undo")]
#[command(version = "1.0.0")]
#[command(about = "Undo the last rename-plus batch")]
struct Args {
    /// Path to history file
    #[arg(long, default_value = "rename_plus_history.jsonl")]
    history_file: PathBuf,

    /// Show what would be undone without doing it
    #[arg(long)]
    dry_run: bool,

    /// List all batches in history
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if !args.history_file.exists() {
        eprintln!("History file not found: {:?}", args.history_file);
        eprintln!("No renames to undo.");
        return Ok(());
    }

    let history = History::new(args.history_file.clone());

    if args.list {
        let records = history
            .get_recent(usize::MAX)
            .with_context(|| format!("reading {:?}", args.history_file))?;
        println!("Rename History ({} batches):", records.len());
        println!("{:-<80}", "");
        for (i, record) in records.iter().enumerate() {
            println!(
                "{:3}. [{}] {} rename(s){}",
                i + 1,
                record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                record.renames.len(),
                if record.undone { " (undone)" } else { "" }
            );
            for rename in &record.renames {
                println!("     {} -> {}", rename.from.display(), rename.to.display());
            }
        }
        return Ok(());
    }

    let Some(record) = history
        .last_undoable()
        .with_context(|| format!("reading {:?}", args.history_file))?
    else {
        println!("No batches left to undo.");
        return Ok(());
    };

    let pairs = record.pairs();
    println!(
        "{}Undoing batch {} ({} rename(s))...",
        if args.dry_run { "[DRY RUN] " } else { "" },
        record.id,
        pairs.len()
    );

    if args.dry_run {
        for (from, to) in pairs.iter().rev() {
            println!("  Would rename: {} -> {}", to.display(), from.display());
        }
        return Ok(());
    }

    let report = revert_renames(&pairs);
    history
        .mark_undone(&record.id)
        .context("updating history")?;

    for (path, reason) in &report.failed {
        eprintln!("  Failed: {} ({})", path.display(), reason);
    }
    println!();
    println!(
        "Done. {} restored, {} skipped, {} failed.",
        report.restored,
        report.skipped,
        report.failed.len()
    );

    Ok(())
}
