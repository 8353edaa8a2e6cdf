//! Photo Date Restore - restore original photo timestamps
//!
//! A CLI tool that reads the CSV metadata of an iCloud photo export and
//! writes each photo's original capture date back to its filesystem
//! modification (and, where supported, creation) time.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use photo_date_restore::{Cli, Config, FileOutcome, Processor, RunSummary, init_locale};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// Initialize i18n for this binary
rust_i18n::i18n!("locales", fallback = "en");

// CLI Output Module
mod cli_output {
    //! Colored console output for the run summary

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;

    /// CLI theme colors
    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
        pub const ACCENT: Color = Color::Cyan;
    }

    pub fn print_separator() {
        let _ = stdout().execute(Print(format!("{}\n", "─".repeat(60))));
    }

    pub fn print_title(title: &str) {
        let width: usize = 60;
        let padding = width.saturating_sub(title.chars().count()) / 2;
        let left_pad = " ".repeat(padding.saturating_sub(1));

        let _ = stdout().execute(Print(format!(
            "{}{} {}{}\n",
            left_pad,
            "╔".bold(),
            title.bold(),
            "╗".bold(),
        )));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_warning(msg: &str) {
        let _ = stdout().execute(Print(style("⚠ ").with(CliTheme::WARNING).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_hint(msg: &str) {
        let _ = stdout().execute(Print(style("→ ").with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_key_value(key: &str, value: &str, value_color: Option<Color>) {
        let key_styled = style(key).with(CliTheme::HINT);
        let value_styled = match value_color {
            Some(color) => style(value).with(color),
            None => style(value).bold(),
        };
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(key_styled));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(value_styled));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_stat(key: &str, value: usize, color: Color) {
        let key_styled = style(key).with(CliTheme::HINT);
        let value_styled = style(value.to_string()).with(color).bold();
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(key_styled));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(value_styled));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_result(status_icon: &str, status_color: Color, file: &str, msg: &str) {
        let icon_styled = style(status_icon).with(status_color).bold();
        let file_styled = style(file).italic();
        let msg_styled = style(msg).with(CliTheme::HINT);

        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(icon_styled));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(file_styled));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(msg_styled));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

/// Convenience macro for translation
macro_rules! t {
    ($key:expr) => {
        rust_i18n::t!($key)
    };
    ($key:expr, $($tt:tt)*) => {
        rust_i18n::t!($key, $($tt)*)
    };
}

fn main() -> Result<ExitCode> {
    init_locale();

    let cli = Cli::parse();

    let exe_dir = get_executable_dir()?;
    let log_path = get_log_path(&exe_dir, &cli);
    let _guard = setup_logging(&cli, &log_path)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Photo Date Restore starting");

    let config = load_config(&cli, &exe_dir)?;
    if config.verbose {
        info!(?config, "Configuration loaded");
    }
    info!(log_file = %log_path.display(), "Log file location");

    let processor = match Processor::new(config) {
        Ok(processor) => processor,
        Err(e) => {
            error!(error = %e, "Cannot start restoration");
            eprintln!("Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    match processor.run() {
        Ok(summary) => {
            print_summary(&summary, cli.verbose || processor.config().verbose);

            if let Some(report) = &processor.config().report_file {
                cli_output::print_key_value(&t!("cli_report_file"), &report.display().to_string(), None);
            }
            cli_output::print_key_value(&t!("cli_log_file"), &log_path.display().to_string(), None);

            info!(log_file = %log_path.display(), "Restoration complete. Log saved to");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(error = %e, "Restoration failed");
            eprintln!("Error: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Print the colored end-of-run summary
fn print_summary(summary: &RunSummary, verbose: bool) {
    use cli_output::*;

    print_separator();
    if summary.dry_run {
        print_title(&t!("cli_dry_run_complete"));
    } else {
        print_title(&t!("cli_run_complete"));
    }
    print_separator();

    print_blank();
    print_stat(&t!("stat_total"), summary.total(), CliTheme::ACCENT);
    print_stat(&t!("stat_updated"), summary.updated, CliTheme::SUCCESS);
    if summary.creation_time_set > 0 {
        print_stat(&t!("stat_creation_time"), summary.creation_time_set, CliTheme::SUCCESS);
    }
    print_stat(
        &t!("stat_skipped_no_metadata"),
        summary.skipped_no_metadata,
        CliTheme::WARNING,
    );
    if summary.dry_run {
        print_stat(&t!("stat_skipped_dry_run"), summary.skipped_dry_run, CliTheme::ACCENT);
    }
    print_stat(&t!("stat_errors"), summary.errors, CliTheme::ERROR);
    print_blank();

    let metadata = &summary.metadata;
    print_stat(&t!("stat_csv_sources"), metadata.sources_read, CliTheme::ACCENT);
    if !metadata.failed_sources.is_empty() {
        print_stat(&t!("stat_failed_sources"), metadata.failed_sources.len(), CliTheme::ERROR);
    }
    if !metadata.malformed_rows.is_empty() {
        print_stat(&t!("stat_malformed_rows"), metadata.malformed_rows.len(), CliTheme::WARNING);
    }
    if metadata.duplicates_discarded > 0 {
        print_stat(&t!("stat_duplicates"), metadata.duplicates_discarded, CliTheme::HINT);
    }
    print_blank();

    let unknown_error = t!("unknown_error");

    if verbose {
        print_separator();
        print_hint(&t!("cli_detailed_results"));
        print_blank();

        let no_metadata = t!("no_metadata");
        let would_set = t!("would_set");
        for result in &summary.results {
            let date = result.local_time.as_deref().unwrap_or_default();
            match result.outcome {
                FileOutcome::Updated => {
                    print_result("✓", CliTheme::SUCCESS, &result.file_name, &format!("→ {}", date))
                }
                FileOutcome::SkippedDryRun => print_result(
                    "~",
                    CliTheme::ACCENT,
                    &result.file_name,
                    &format!("{} {}", would_set, date),
                ),
                FileOutcome::SkippedNoMetadata => {
                    print_result("⊘", CliTheme::WARNING, &result.file_name, &no_metadata)
                }
                FileOutcome::Error => print_result(
                    "✗",
                    CliTheme::ERROR,
                    &result.file_name,
                    result.error.as_deref().unwrap_or(&unknown_error),
                ),
            }
        }
    }

    if summary.errors > 0 {
        print_separator();
        print_error(&t!("cli_failed_files", count = summary.errors));
        print_blank();
        for result in summary.failed() {
            let error_msg = result.error.as_deref().unwrap_or(&unknown_error);
            print_key_value(&result.file_name, error_msg, Some(CliTheme::ERROR));
        }
    }

    if summary.dry_run {
        print_separator();
        print_warning(&t!("cli_dry_run_notice"));
    }

    print_separator();
}

/// Get the directory where the executable is located
fn get_executable_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    Ok(exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Determine the log file path based on config file or timestamp
fn get_log_path(exe_dir: &Path, cli: &Cli) -> PathBuf {
    let log_dir = cli
        .log_dir
        .clone()
        .unwrap_or_else(|| exe_dir.join("Log"));
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    match cli.config_name() {
        Some(config_name) => log_dir
            .join(&config_name)
            .join(format!("{}_{}.log", config_name, timestamp)),
        None => log_dir.join(format!("Restore_{}.log", timestamp)),
    }
}

/// Resolve config path - supports shorthand syntax
fn resolve_config_path(exe_dir: &Path, config_path: &Path) -> PathBuf {
    if config_path.exists() {
        return config_path.to_path_buf();
    }

    let with_extension = if config_path.extension().is_none() {
        config_path.with_extension("toml")
    } else {
        config_path.to_path_buf()
    };

    if with_extension.exists() {
        return with_extension;
    }

    let filename = config_path.file_name().unwrap_or(config_path.as_os_str());
    let mut in_config_dir = exe_dir.join("Config").join(filename);
    if in_config_dir.extension().is_none() {
        in_config_dir = in_config_dir.with_extension("toml");
    }

    if in_config_dir.exists() {
        return in_config_dir;
    }

    config_path.to_path_buf()
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli, exe_dir: &Path) -> Result<Config> {
    let config = if let Some(ref config_path) = cli.config {
        let resolved_path = resolve_config_path(exe_dir, config_path);
        info!(config_file = %resolved_path.display(), "Loading configuration from file");
        let file_config = Config::load_from_file(&resolved_path)
            .with_context(|| format!("loading {}", resolved_path.display()))?;
        cli.merge_with_config(file_config)
    } else {
        cli.to_config()
    };

    if config.folder.as_os_str().is_empty() {
        anyhow::bail!("{}", t!("cli_no_folder_error"));
    }

    Ok(config)
}

/// Setup logging (file + console)
fn setup_logging(cli: &Cli, log_path: &Path) -> Result<Option<WorkerGuard>> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if cli.json_log {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(Some(guard))
}
