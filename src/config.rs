//! Configuration types for photo date restoration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How media file names are compared against the `imgName` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameMatching {
    /// Exact byte-for-byte comparison (Linux and other Unix filesystems)
    CaseSensitive,
    /// Unicode lowercase comparison (Windows and macOS filesystems)
    CaseInsensitive,
}

impl NameMatching {
    /// The comparison policy of the platform's default filesystem
    pub fn platform_default() -> Self {
        if cfg!(any(windows, target_os = "macos", target_os = "ios")) {
            NameMatching::CaseInsensitive
        } else {
            NameMatching::CaseSensitive
        }
    }

    /// Normalize a file name into the key used for index insertion and lookup
    pub fn key(&self, name: &str) -> String {
        match self {
            NameMatching::CaseSensitive => name.to_string(),
            NameMatching::CaseInsensitive => name.to_lowercase(),
        }
    }
}

impl Default for NameMatching {
    fn default() -> Self {
        Self::platform_default()
    }
}

/// Configuration for a restoration run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder holding the exported media files and their CSV metadata
    pub folder: PathBuf,

    /// Dry run mode - report intended changes without touching any file
    pub dry_run: bool,

    /// File name comparison policy; platform default when not set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_matching: Option<NameMatching>,

    /// Number of threads for the apply phase (1 = sequential, 0 = auto)
    pub threads: usize,

    /// Write a JSON report of the run to this path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_file: Option<PathBuf>,

    /// Verbose output
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            folder: PathBuf::new(),
            dry_run: false,
            name_matching: None,
            threads: 1,
            report_file: None,
            verbose: false,
        }
    }
}

impl Config {
    /// Build a configuration for a folder with every other setting at its default
    pub fn for_folder(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            ..Self::default()
        }
    }

    /// Effective file name comparison policy
    pub fn name_matching(&self) -> NameMatching {
        self.name_matching.unwrap_or_default()
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError { source: e })?;

        fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Photo Date Restore Configuration File
# This file uses TOML format (https://toml.io)

# Folder containing the exported photos together with the iCloud
# metadata CSV files (flat, subfolders are not scanned)
folder = "D:/iCloud Photos"

# Dry run mode - show what would be done without changing any file
dry_run = false

# File name comparison against the imgName column:
# "case-sensitive" or "case-insensitive".
# Leave unset to follow the platform (case-insensitive on Windows/macOS)
# name_matching = "case-insensitive"

# Number of threads used to update timestamps
# 1 = sequential (default), 0 = auto-detect
threads = 1

# Write a JSON report of every file outcome
# report_file = "restore-report.json"

# Verbose output - show detailed processing information
verbose = false
"#
        .to_string()
    }
}

/// Errors that can occur when loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to write configuration file
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to serialize configuration
    SerializeError { source: toml::ser::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write config file '{}': {}", path.display(), source)
            }
            ConfigError::SerializeError { source } => {
                write!(f, "Failed to serialize config: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
            ConfigError::SerializeError { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.dry_run);
        assert_eq!(config.threads, 1);
        assert_eq!(config.name_matching(), NameMatching::platform_default());
    }

    #[test]
    fn test_name_keys() {
        assert_eq!(NameMatching::CaseSensitive.key("IMG_0001.HEIC"), "IMG_0001.HEIC");
        assert_eq!(NameMatching::CaseInsensitive.key("IMG_0001.HEIC"), "img_0001.heic");
    }

    #[test]
    fn test_sample_config_parses() {
        let config: Config = toml::from_str(&Config::sample_config()).unwrap();
        assert_eq!(config.folder, PathBuf::from("D:/iCloud Photos"));
        assert!(config.name_matching.is_none());
        assert!(config.report_file.is_none());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            folder = "/photos"
            name_matching = "case-sensitive"
            "#,
        )
        .unwrap();
        assert_eq!(config.folder, PathBuf::from("/photos"));
        assert_eq!(config.name_matching(), NameMatching::CaseSensitive);
        assert_eq!(config.threads, 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("restore.toml");

        let mut config = Config::for_folder("/photos");
        config.dry_run = true;
        config.threads = 4;
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.folder, PathBuf::from("/photos"));
        assert!(loaded.dry_run);
        assert_eq!(loaded.threads, 4);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = Config::load_from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}
