//! Command-line interface definition

use crate::config::{Config, NameMatching};
use clap::Parser;
use std::path::PathBuf;

/// Restore original photo dates from iCloud export CSV metadata
#[derive(Parser, Debug, Clone)]
#[command(name = "photo-date-restore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (TOML format)
    /// Supports shorthand: "-C myconfig" will look for myconfig.toml in the
    /// current directory, then in the Config directory next to the executable
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Folder containing the photos and the CSV metadata files
    #[arg(short, long, env = "PHOTO_DATE_RESTORE_FOLDER")]
    pub folder: Option<PathBuf>,

    /// Dry run mode - show what would be done without changing any file
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Compare file names case-sensitively (default on Linux)
    #[arg(long, conflicts_with = "case_insensitive")]
    pub case_sensitive: bool,

    /// Compare file names case-insensitively (default on Windows and macOS)
    #[arg(long)]
    pub case_insensitive: bool,

    /// Number of threads for updating timestamps (1 = sequential, 0 = auto)
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Write a JSON report of every file outcome to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Directory for log files (defaults to Log/ next to the executable)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long)]
    pub json_log: bool,
}

impl Cli {
    /// Get config file name (without extension) for log naming
    pub fn config_name(&self) -> Option<String> {
        self.config.as_ref().and_then(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
    }

    /// Name matching policy requested on the command line, if any
    pub fn name_matching(&self) -> Option<NameMatching> {
        if self.case_sensitive {
            Some(NameMatching::CaseSensitive)
        } else if self.case_insensitive {
            Some(NameMatching::CaseInsensitive)
        } else {
            None
        }
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref folder) = self.folder {
            config.folder = folder.clone();
        }
        if let Some(matching) = self.name_matching() {
            config.name_matching = Some(matching);
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(ref report) = self.report {
            config.report_file = Some(report.clone());
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_arguments() {
        let cli = Cli::try_parse_from(["photo-date-restore", "--folder", "/photos"]).unwrap();
        let config = cli.to_config();
        assert_eq!(config.folder, PathBuf::from("/photos"));
        assert!(!config.dry_run);
        assert_eq!(config.threads, 1);
        assert!(config.name_matching.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "photo-date-restore",
            "-f",
            "/photos",
            "--dry-run",
            "--case-insensitive",
            "-t",
            "4",
            "--report",
            "out.json",
        ])
        .unwrap();
        let config = cli.to_config();
        assert!(config.dry_run);
        assert_eq!(config.threads, 4);
        assert_eq!(config.name_matching(), NameMatching::CaseInsensitive);
        assert_eq!(config.report_file, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_case_flags_conflict() {
        let result = Cli::try_parse_from([
            "photo-date-restore",
            "--folder",
            "/photos",
            "--case-sensitive",
            "--case-insensitive",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let mut file_config = Config::for_folder("/from-file");
        file_config.threads = 8;
        file_config.name_matching = Some(NameMatching::CaseInsensitive);

        let cli = Cli::try_parse_from([
            "photo-date-restore",
            "--folder",
            "/from-cli",
            "--case-sensitive",
        ])
        .unwrap();
        let merged = cli.merge_with_config(file_config);

        assert_eq!(merged.folder, PathBuf::from("/from-cli"));
        assert_eq!(merged.threads, 8);
        assert_eq!(merged.name_matching(), NameMatching::CaseSensitive);
    }
}
