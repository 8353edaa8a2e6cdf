//! Error types for photo date restoration
//!
//! Row-level date problems are reported as [`crate::time::DateParseError`]
//! and never surface here; everything below is either per-source, per-file
//! or fatal for the run.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for photo date restoration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for photo date restoration
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read CSV metadata from {path}: {message}")]
    CsvRead { path: PathBuf, message: String },

    #[error("Failed to update timestamps of {path}: {source}")]
    Apply {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Folder not found: {0}")]
    FolderNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error stops the run before any file is touched
    pub fn is_fatal_startup(&self) -> bool {
        matches!(self, Error::FolderNotFound(_) | Error::NotADirectory(_))
    }
}
