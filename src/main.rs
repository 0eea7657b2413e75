// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! rename-plus: batch file renamer
//!
//! Preview, execute and undo rename batches from the command line.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tracing::{debug, info, warn};

use rename_plus::backup::DirectoryBackup;
use rename_plus::config::AppConfig;
use rename_plus::executor::{BatchResult, CancelFlag, ConflictPolicy, RenameExecutor};
use rename_plus::history::{BatchRecord, History};
use rename_plus::metadata::{FileMetadataProvider, MetadataProvider, METADATA_TAGS};
use rename_plus::methods::{CaseTarget, CaseType, MethodSpec, Operation, Position};
use rename_plus::{revert_renames, FileEntry, RenameError, Result, Session};

/// rename-plus CLI - batch file renamer
#[derive(Parser, Debug)]
#[command(name = "rename-plus")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version = "1.0.0")]
#[command(about = "Batch rename files with composable methods, preview and undo", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(long, default_value = "rename_plus.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CaseArg {
    Upper,
    Lower,
    Title,
    Capitalize,
}

impl From<CaseArg> for CaseType {
    fn from(arg: CaseArg) -> Self {
        match arg {
            CaseArg::Upper => CaseType::Upper,
            CaseArg::Lower => CaseType::Lower,
            CaseArg::Title => CaseType::Title,
            CaseArg::Capitalize => CaseType::Capitalize,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rename files
    ///
    /// Methods run in this order: --methods file, --template-name,
    /// --template, --replace, --regex, --case, --add-prefix, --add-suffix,
    /// --number.
    Rename {
        /// Files, folders or glob patterns
        #[arg(required = true)]
        files: Vec<String>,

        /// Also take files from subfolders of folder arguments
        #[arg(short, long)]
        recursive: bool,

        /// Text to add before the name
        #[arg(long)]
        add_prefix: Option<String>,

        /// Text to add after the name
        #[arg(long)]
        add_suffix: Option<String>,

        /// Replace OLD with NEW (case-insensitive)
        #[arg(long, num_args = 2, value_names = ["OLD", "NEW"])]
        replace: Option<Vec<String>>,

        /// Change letter case of the name
        #[arg(long, value_enum)]
        case: Option<CaseArg>,

        /// Regex substitution
        #[arg(long, num_args = 2, value_names = ["PATTERN", "REPLACE"])]
        regex: Option<Vec<String>>,

        /// Append a counter, optionally from START
        #[arg(long, num_args = 0..=1, default_missing_value = "1", value_name = "START")]
        number: Option<i64>,

        /// Full-name template, e.g. "IMG_{n:03d}" or "{date_created}_{name}"
        #[arg(long)]
        template: Option<String>,

        /// JSON file with a list of method definitions
        #[arg(long, value_name = "FILE")]
        methods: Option<PathBuf>,

        /// Template saved in the config under NAME
        #[arg(long, value_name = "NAME")]
        template_name: Option<String>,

        /// Show the preview without renaming
        #[arg(long)]
        dry_run: bool,

        /// Copy each file to the backup directory before renaming
        #[arg(long)]
        backup: bool,

        /// Add _1, _2, ... when a target is taken instead of failing
        #[arg(long)]
        auto_suffix: bool,

        /// Write the batch result as JSON to FILE
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Revert the most recent batch recorded in history
    Undo {
        /// Show what would be undone
        #[arg(long)]
        dry_run: bool,
    },

    /// History operations
    History {
        #[command(subcommand)]
        action: HistoryCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Saved template management
    Templates {
        #[command(subcommand)]
        action: TemplateCommands,
    },

    /// List metadata tags usable in templates and metadata methods
    Tags,
}

#[derive(Subcommand, Debug)]
enum HistoryCommands {
    /// List recent batches
    List {
        /// Number of batches to show
        #[arg(short, long, default_value = "10")]
        count: usize,
    },

    /// Clear all history
    Clear {
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "rename_plus.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[derive(Subcommand, Debug)]
enum TemplateCommands {
    /// List saved templates
    List,

    /// Save a template under a name
    Save {
        name: String,
        template: String,

        /// First value of {n}
        #[arg(long, default_value = "1")]
        start: i64,
    },

    /// Delete a saved template
    Delete { name: String },

    /// Write all saved templates to a JSON file
    Export {
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Method flags of the rename command
#[derive(Debug, Default)]
struct MethodArgs {
    add_prefix: Option<String>,
    add_suffix: Option<String>,
    replace: Option<Vec<String>>,
    case: Option<CaseArg>,
    regex: Option<Vec<String>>,
    number: Option<i64>,
    template: Option<String>,
    methods: Option<PathBuf>,
    template_name: Option<String>,
}

struct RenameArgs {
    files: Vec<String>,
    recursive: bool,
    dry_run: bool,
    backup: bool,
    auto_suffix: bool,
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load(&cli.config)?;
    let json = cli.format == "json";

    match cli.command {
        Commands::Rename {
            files,
            recursive,
            add_prefix,
            add_suffix,
            replace,
            case,
            regex,
            number,
            template,
            methods,
            template_name,
            dry_run,
            backup,
            auto_suffix,
            output,
        } => {
            let method_args = MethodArgs {
                add_prefix,
                add_suffix,
                replace,
                case,
                regex,
                number,
                template,
                methods,
                template_name,
            };
            let rename_args = RenameArgs { files, recursive, dry_run, backup, auto_suffix, output };
            run_rename(config, method_args, rename_args, json, cli.quiet).await
        }
        Commands::Undo { dry_run } => run_undo(config, dry_run, json),
        Commands::History { action } => run_history_command(config, action, json),
        Commands::Config { action } => run_config_command(config, action, &cli.config),
        Commands::Templates { action } => run_template_command(config, action, &cli.config),
        Commands::Tags => {
            for tag in METADATA_TAGS {
                println!("{}", tag);
            }
            Ok(())
        }
    }
}

/// Translate command line flags into method definitions
fn build_specs(args: &MethodArgs, config: &AppConfig) -> Result<Vec<MethodSpec>> {
    let mut specs = Vec::new();

    if let Some(path) = &args.methods {
        let content = std::fs::read_to_string(path)?;
        let from_file: Vec<MethodSpec> = serde_json::from_str(&content)
            .map_err(|e| RenameError::Config(format!("Invalid methods file {:?}: {}", path, e)))?;
        specs.extend(from_file);
    }
    if let Some(name) = &args.template_name {
        specs.push(config.saved_template(name)?);
    }
    if let Some(template) = &args.template {
        specs.push(MethodSpec::Template { template: template.clone(), start: 1 });
    }
    if let Some([find, replace]) = args.replace.as_deref() {
        specs.push(MethodSpec::Replace {
            find: find.clone(),
            replace: replace.clone(),
            case_sensitive: false,
            full_match: false,
        });
    }
    if let Some([pattern, replacement]) = args.regex.as_deref() {
        specs.push(MethodSpec::Regex {
            pattern: pattern.clone(),
            replacement: replacement.clone(),
        });
    }
    if let Some(case) = args.case {
        specs.push(MethodSpec::Case { case_type: case.into(), apply_to: CaseTarget::Name });
    }
    for (text, position) in [(&args.add_prefix, Position::Start), (&args.add_suffix, Position::End)] {
        if let Some(text) = text {
            specs.push(MethodSpec::AddRemove {
                operation: Operation::Add,
                text: text.clone(),
                position,
                mode: None,
                start: None,
                end: None,
            });
        }
    }
    if let Some(start) = args.number {
        specs.push(MethodSpec::Numbering {
            start,
            step: 1,
            digits: 3,
            format: "_{n}".to_string(),
            position: Position::End,
        });
    }

    if specs.is_empty() {
        specs = config.methods.clone();
    }
    if specs.is_empty() {
        return Err(RenameError::Config(
            "No rename methods given; use flags, --methods or the config file".to_string(),
        ));
    }
    Ok(specs)
}

/// Expand glob patterns; plain paths pass through unchanged
fn expand_paths(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        if pattern.contains(['*', '?', '[']) {
            let before = paths.len();
            for entry in glob::glob(pattern)? {
                match entry {
                    Ok(path) => paths.push(path),
                    Err(e) => warn!("Unreadable match for {}: {}", pattern, e),
                }
            }
            if paths.len() == before {
                warn!("Pattern {} matched nothing", pattern);
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }
    Ok(paths)
}

fn print_preview(entries: &[FileEntry], json: bool) -> Result<()> {
    if json {
        let output: Vec<serde_json::Value> = entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "path": e.current_path().to_string_lossy(),
                    "proposed": e.proposed_file_name(),
                    "changed": e.is_changed(),
                    "status": e.status(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for entry in entries {
        let marker = if !entry.status().is_ready() {
            format!("  [{}]", entry.status())
        } else if !entry.is_changed() {
            "  [unchanged]".to_string()
        } else {
            String::new()
        };
        println!(
            "{}{} -> {}{}",
            entry.base_name(),
            entry.extension(),
            entry.proposed_file_name(),
            marker
        );
    }
    Ok(())
}

fn print_result(result: &BatchResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    println!(
        "\n{} renamed, {} failed{}",
        result.success_count,
        result.error_count,
        if result.cancelled { " (cancelled)" } else { "" }
    );
    for outcome in &result.outcomes {
        if let rename_plus::RenameState::Failed(reason) = &outcome.state {
            println!("  Failed: {} ({})", outcome.source.display(), reason);
        }
    }
    Ok(())
}

/// Preview and execute a rename batch
async fn run_rename(
    config: AppConfig,
    method_args: MethodArgs,
    args: RenameArgs,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let specs = build_specs(&method_args, &config)?;
    let paths = expand_paths(&args.files)?;

    let provider: Arc<dyn MetadataProvider> = Arc::new(FileMetadataProvider::new());
    let mut session = Session::new(&config, Some(provider));
    session.set_methods(&specs);

    let mut added = 0;
    for path in &paths {
        added += if path.is_dir() {
            session.add_dir(path, args.recursive)
        } else {
            session.add_paths([path])
        };
    }
    if added == 0 {
        println!("No files to rename");
        return Ok(());
    }
    debug!("Pipeline: {:?}", session.pipeline().describe());

    print_preview(session.preview(), json)?;

    if args.dry_run {
        if !json {
            println!("\nDry run: no files renamed");
        }
        return Ok(());
    }

    let mut options = config.execution.options();
    if args.backup {
        options.create_backup = true;
    }
    if args.auto_suffix {
        options.policy = ConflictPolicy::AutoSuffix {
            max_attempts: config.execution.max_suffix_attempts,
        };
    }

    let backups = DirectoryBackup::new(&config.backup.directory);
    if options.create_backup {
        backups.cleanup_older_than(config.backup.retention_days);
    }

    let mut executor = RenameExecutor::new().with_backup(Arc::new(backups));
    if !quiet && !json {
        executor = executor.with_progress(|current: usize, total: usize, label: &str| {
            eprintln!("[{}/{}] {}", current, total, label);
        });
    }
    let mut session = session.with_executor(executor);

    // Ctrl+C stops the batch between files
    let cancel = CancelFlag::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, cancelling after the current file...");
            on_signal.cancel();
        }
    });

    let result = session.execute(options, &cancel).await?;

    if let Some(record) = BatchRecord::from_result(&result) {
        let history = History::new(config.history.path.clone());
        history.append(&record)?;
        history.trim(config.history.max_entries)?;
        info!("Recorded batch {} in {:?}", record.id, history.path());
    }

    if let Some(output) = &args.output {
        std::fs::write(output, serde_json::to_string_pretty(&result)?)?;
        info!("Wrote result to {:?}", output);
    }

    print_result(&result, json)?;

    if result.error_count > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Revert the newest batch in history that has not been undone
fn run_undo(config: AppConfig, dry_run: bool, json: bool) -> Result<()> {
    let history = History::new(config.history.path.clone());
    let Some(record) = history.last_undoable()? else {
        println!("Nothing to undo");
        return Ok(());
    };

    let pairs = record.pairs();
    if dry_run {
        for (from, to) in pairs.iter().rev() {
            println!("Would undo: {} -> {}", to.display(), from.display());
        }
        return Ok(());
    }

    let report = revert_renames(&pairs);
    history.mark_undone(&record.id)?;

    if json {
        let output = serde_json::json!({
            "batch": record.id,
            "restored": report.restored,
            "skipped": report.skipped,
            "failed": report.failed.iter().map(|(p, reason)| {
                serde_json::json!({ "path": p.to_string_lossy(), "reason": reason })
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "Undone batch {}: {} restored, {} skipped, {} failed",
            record.id,
            report.restored,
            report.skipped,
            report.failed.len()
        );
        for (path, reason) in &report.failed {
            println!("  Failed: {} ({})", path.display(), reason);
        }
    }
    Ok(())
}

/// Run history commands
fn run_history_command(config: AppConfig, action: HistoryCommands, json: bool) -> Result<()> {
    let history = History::new(config.history.path.clone());

    match action {
        HistoryCommands::List { count } => {
            let records = history.get_recent(count)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(());
            }
            println!("Recent history ({} batches):", records.len());
            for record in records {
                let status = if record.undone { "[UNDONE]" } else { "" };
                println!(
                    "  {} {} ({} renames) {}",
                    record.timestamp.format("%Y-%m-%d %H:%M"),
                    record.id,
                    record.renames.len(),
                    status
                );
                for rename in &record.renames {
                    println!("      {} -> {}", rename.from.display(), rename.to.display());
                }
            }
        }
        HistoryCommands::Clear { force } => {
            if !force {
                eprintln!("Use --force to confirm clearing history");
                return Ok(());
            }
            history.clear()?;
            println!("History cleared");
        }
    }

    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Undo capacity: {}", config.undo.capacity);
            println!("  Conflict policy: {:?}", config.execution.conflict_policy);
            println!("  Backup directory: {:?}", config.backup.directory);
            println!("  History: {:?}", config.history.path);
            println!("  Default methods: {}", config.methods.len());
        }
    }

    Ok(())
}

/// Run saved template commands
fn run_template_command(mut config: AppConfig, action: TemplateCommands, config_path: &Path) -> Result<()> {
    match action {
        TemplateCommands::List => {
            if config.templates.is_empty() {
                println!("No saved templates");
            }
            for (name, saved) in &config.templates {
                println!("  {}: {} (start {})", name, saved.template, saved.start);
            }
        }
        TemplateCommands::Save { name, template, start } => {
            config.save_template(&name, &template, start)?;
            config.save(config_path)?;
            println!("Saved template '{}' to {:?}", name.trim(), config_path);
        }
        TemplateCommands::Delete { name } => {
            if config.templates.remove(&name).is_none() {
                return Err(RenameError::Config(format!("No saved template named '{}'", name)));
            }
            config.save(config_path)?;
            println!("Deleted template '{}'", name);
        }
        TemplateCommands::Export { output } => {
            std::fs::write(&output, serde_json::to_string_pretty(&config.templates)?)?;
            println!("Exported {} template(s) to {:?}", config.templates.len(), output);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_rename_command() {
        let cli = Cli::try_parse_from([
            "rename-plus", "rename", "a.jpg", "b.jpg",
            "--replace", "old", "new", "--number", "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Rename { files, replace, number, dry_run, .. } => {
                assert_eq!(files, vec!["a.jpg", "b.jpg"]);
                assert_eq!(replace, Some(vec!["old".to_string(), "new".to_string()]));
                assert_eq!(number, Some(1));
                assert!(dry_run);
            }
            _ => panic!("Expected Rename command"),
        }
    }

    #[test]
    fn test_cli_number_start_and_case() {
        let cli = Cli::try_parse_from([
            "rename-plus", "--format", "json", "rename", "x.txt", "--number", "10", "--case", "upper",
        ])
        .unwrap();
        assert_eq!(cli.format, "json");

        match cli.command {
            Commands::Rename { number, case, .. } => {
                assert_eq!(number, Some(10));
                assert_eq!(case, Some(CaseArg::Upper));
            }
            _ => panic!("Expected Rename command"),
        }
    }

    #[test]
    fn test_cli_requires_files() {
        assert!(Cli::try_parse_from(["rename-plus", "rename"]).is_err());
    }

    #[test]
    fn test_cli_history_and_undo() {
        let cli = Cli::try_parse_from(["rename-plus", "history", "list", "-c", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::History { action: HistoryCommands::List { count: 3 } }
        ));

        let cli = Cli::try_parse_from(["rename-plus", "undo", "--dry-run"]).unwrap();
        assert!(matches!(cli.command, Commands::Undo { dry_run: true }));
    }

    #[test]
    fn test_build_specs_order() {
        let args = MethodArgs {
            add_prefix: Some("p_".into()),
            case: Some(CaseArg::Lower),
            template: Some("{name}".into()),
            number: Some(5),
            ..Default::default()
        };
        let specs = build_specs(&args, &AppConfig::default()).unwrap();
        assert!(matches!(specs[0], MethodSpec::Template { .. }));
        assert!(matches!(specs[1], MethodSpec::Case { .. }));
        assert!(matches!(specs[2], MethodSpec::AddRemove { position: Position::Start, .. }));
        assert!(matches!(specs[3], MethodSpec::Numbering { start: 5, .. }));
    }

    #[test]
    fn test_build_specs_falls_back_to_config() {
        let mut config = AppConfig::default();
        assert!(build_specs(&MethodArgs::default(), &config).is_err());

        config.methods.push(MethodSpec::Case {
            case_type: CaseType::Upper,
            apply_to: CaseTarget::All,
        });
        assert_eq!(build_specs(&MethodArgs::default(), &config).unwrap().len(), 1);
    }

    #[test]
    fn test_expand_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        for name in ["a.jpg", "b.jpg", "c.png"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        let pattern = dir.path().join("*.jpg").to_string_lossy().into_owned();
        let plain = "not/a/glob.txt".to_string();

        let paths = expand_paths(&[pattern, plain]).unwrap();
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[2], PathBuf::from("not/a/glob.txt"));
    }

    #[test]
    fn test_cli_recursive_and_template_name() {
        let cli = Cli::try_parse_from([
            "rename-plus", "rename", "photos", "-r", "--template-name", "camera",
        ])
        .unwrap();
        match cli.command {
            Commands::Rename { recursive, template_name, .. } => {
                assert!(recursive);
                assert_eq!(template_name.as_deref(), Some("camera"));
            }
            _ => panic!("Expected Rename command"),
        }

        let cli = Cli::try_parse_from(["rename-plus", "templates", "save", "camera", "IMG_{n:03d}"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Templates { action: TemplateCommands::Save { start: 1, .. } }
        ));
    }

    #[test]
    fn test_build_specs_saved_template() {
        let mut config = AppConfig::default();
        config.save_template("camera", "IMG_{n:03d}", 5).unwrap();

        let args = MethodArgs {
            template_name: Some("camera".into()),
            case: Some(CaseArg::Upper),
            ..Default::default()
        };
        let specs = build_specs(&args, &config).unwrap();
        assert!(matches!(&specs[0], MethodSpec::Template { start: 5, .. }));
        assert!(matches!(specs[1], MethodSpec::Case { .. }));

        let args = MethodArgs { template_name: Some("nope".into()), ..Default::default() };
        assert!(matches!(build_specs(&args, &config), Err(RenameError::Config(_))));
    }

    #[test]
    fn test_template_commands_update_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("rename_plus.json");
        let save = TemplateCommands::Save {
            name: "music".into(),
            template: "{artist} - {title}".into(),
            start: 1,
        };
        run_template_command(AppConfig::default(), save, &config_path).unwrap();
        let config = AppConfig::load(&config_path).unwrap();
        assert_eq!(config.templates["music"].template, "{artist} - {title}");

        let export = dir.path().join("templates.json");
        run_template_command(config.clone(), TemplateCommands::Export { output: export.clone() }, &config_path)
            .unwrap();
        assert!(std::fs::read_to_string(&export).unwrap().contains("music"));

        run_template_command(config, TemplateCommands::Delete { name: "music".into() }, &config_path).unwrap();
        assert!(AppConfig::load(&config_path).unwrap().templates.is_empty());
    }
}
