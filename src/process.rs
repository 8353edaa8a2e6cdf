//! Restoration run driver
//!
//! Handles the core logic of:
//! - Validating and scanning the export folder (flat, one snapshot)
//! - Building the metadata index from the CSV files found there
//! - Matching each media file against the index
//! - Applying capture times and folding outcomes into a run summary

use crate::apply::{ApplyOutcome, TimestampApplier};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::metadata::{LoadReport, MetadataIndex, MetadataRecord, is_csv};
use crate::os;

use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{Level, error, info, span, warn};
use walkdir::WalkDir;

/// Final outcome of one media file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileOutcome {
    /// Timestamps were written
    Updated,
    /// No CSV row names this file
    SkippedNoMetadata,
    /// Dry run - would have been updated
    SkippedDryRun,
    /// Timestamps could not be written
    Error,
}

/// A media file waiting to be processed, joined with its metadata
#[derive(Debug, Clone)]
pub struct FileTask {
    pub path: PathBuf,
    pub record: Option<MetadataRecord>,
}

impl FileTask {
    /// Join a media file against the index
    pub fn new(path: PathBuf, index: &MetadataIndex) -> Self {
        let record = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|name| index.lookup(name))
            .cloned();
        Self { path, record }
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Result of processing a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: PathBuf,
    pub file_name: String,
    pub outcome: FileOutcome,
    /// Capture instant in UTC (ISO-8601), when metadata was found
    pub timestamp: Option<String>,
    /// Capture time in its original zone, as shown to the user
    pub local_time: Option<String>,
    /// CSV file the metadata came from
    pub metadata_source: Option<PathBuf>,
    /// Whether the creation time was written as well
    pub creation_set: bool,
    /// Error message (if failed)
    pub error: Option<String>,
}

/// Aggregate of a restoration run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub folder: PathBuf,
    pub dry_run: bool,
    pub updated: usize,
    pub skipped_no_metadata: usize,
    pub skipped_dry_run: usize,
    pub errors: usize,
    /// Updated files whose creation time was written too
    pub creation_time_set: usize,
    /// Per-file results in enumeration order
    pub results: Vec<FileResult>,
    /// How the CSV metadata load went
    pub metadata: LoadReport,
}

impl RunSummary {
    pub fn new(folder: PathBuf, dry_run: bool, metadata: LoadReport) -> Self {
        Self {
            folder,
            dry_run,
            metadata,
            ..Self::default()
        }
    }

    /// Fold one file result into the counts
    pub fn record(&mut self, result: FileResult) {
        match result.outcome {
            FileOutcome::Updated => {
                self.updated += 1;
                if result.creation_set {
                    self.creation_time_set += 1;
                }
            }
            FileOutcome::SkippedNoMetadata => self.skipped_no_metadata += 1,
            FileOutcome::SkippedDryRun => self.skipped_dry_run += 1,
            FileOutcome::Error => self.errors += 1,
        }
        self.results.push(result);
    }

    /// Files not updated for a reason other than an error
    pub fn skipped(&self) -> usize {
        self.skipped_no_metadata + self.skipped_dry_run
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileResult> {
        self.results
            .iter()
            .filter(|r| r.outcome == FileOutcome::Error)
    }

    pub fn summary(&self) -> String {
        format!(
            "Done: {} updated, {} skipped ({} without metadata, {} dry run), {} errors",
            self.updated,
            self.skipped(),
            self.skipped_no_metadata,
            self.skipped_dry_run,
            self.errors
        )
    }

    /// Write the summary as pretty JSON
    pub fn save_report(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

/// Files found in the export folder
#[derive(Debug, Clone, Default)]
pub struct FolderListing {
    /// CSV metadata sources, in discovery order
    pub csv_files: Vec<PathBuf>,
    /// Everything else, in enumeration order
    pub media_files: Vec<PathBuf>,
}

impl FolderListing {
    /// Distinct lowercase extensions of the media files
    pub fn media_extensions(&self) -> BTreeSet<String> {
        self.media_files
            .iter()
            .filter_map(|p| p.extension().and_then(|e| e.to_str()))
            .map(|e| e.to_lowercase())
            .collect()
    }
}

/// Drives one restoration run over a folder
pub struct Processor {
    config: Config,
    applier: TimestampApplier,
}

impl Processor {
    /// Create a processor, failing if the folder is missing or not a directory
    pub fn new(config: Config) -> Result<Self> {
        let folder = &config.folder;
        if !folder.exists() {
            return Err(Error::FolderNotFound(folder.clone()));
        }
        if !folder.is_dir() {
            return Err(Error::NotADirectory(folder.clone()));
        }

        // Configure Rayon thread pool
        if config.threads > 1 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(config.threads)
                .build_global()
                .ok(); // Ignore if already initialized
        }

        Ok(Self {
            config,
            applier: TimestampApplier::new(),
        })
    }

    /// Replace the timestamp applier
    pub fn with_applier(mut self, applier: TimestampApplier) -> Self {
        self.applier = applier;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Take a snapshot of the folder's files, sorted by file name
    pub fn scan(&self) -> Result<FolderListing> {
        let mut listing = FolderListing::default();

        for entry in WalkDir::new(&self.config.folder)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable folder entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.into_path();
            if is_csv(&path) {
                listing.csv_files.push(path);
            } else {
                listing.media_files.push(path);
            }
        }

        Ok(listing)
    }

    /// Run the restoration
    pub fn run(&self) -> Result<RunSummary> {
        let _span = span!(Level::INFO, "restore_run", folder = %self.config.folder.display())
            .entered();

        let support = self.applier.creation_support();
        info!(
            creation_time = ?support,
            elevated = os::has_admin_privileges(),
            dry_run = self.config.dry_run,
            "Starting timestamp restoration"
        );
        if support.is_supported() && os::creation_time_needs_elevation() {
            warn!("Not running elevated; creation time updates may be refused");
        }

        info!("Scanning folder...");
        let listing = self.scan()?;

        if listing.csv_files.is_empty() {
            warn!(
                folder = %self.config.folder.display(),
                "No CSV metadata files found, every file will be skipped"
            );
        }
        let (index, report) =
            MetadataIndex::load_files(&listing.csv_files, self.config.name_matching());

        let extensions: Vec<String> = listing.media_extensions().into_iter().collect();
        info!(
            count = listing.media_files.len(),
            "Found {} media file(s) with extensions: {}",
            listing.media_files.len(),
            extensions.join(", ")
        );

        let tasks: Vec<FileTask> = listing
            .media_files
            .into_iter()
            .map(|path| FileTask::new(path, &index))
            .collect();

        let mut summary = RunSummary::new(self.config.folder.clone(), self.config.dry_run, report);

        if self.config.threads == 1 {
            for task in tasks {
                let result = self.process_task(task);
                log_result(&result);
                summary.record(result);
            }
        } else {
            // Collected in enumeration order, logged afterwards
            let results: Vec<FileResult> = tasks
                .into_par_iter()
                .map(|task| self.process_task(task))
                .collect();
            for result in results {
                log_result(&result);
                summary.record(result);
            }
        }

        info!("{}", summary.summary());

        if let Some(report_path) = &self.config.report_file {
            match summary.save_report(report_path) {
                Ok(()) => info!(report = %report_path.display(), "Wrote run report"),
                Err(e) => error!(report = %report_path.display(), error = %e, "Failed to write run report"),
            }
        }

        Ok(summary)
    }

    /// Resolve one file to its outcome
    fn process_task(&self, task: FileTask) -> FileResult {
        let _file_span = span!(Level::DEBUG, "process_file", path = ?task.path).entered();
        let file_name = task.file_name();

        let Some(record) = task.record else {
            return FileResult {
                path: task.path,
                file_name,
                outcome: FileOutcome::SkippedNoMetadata,
                timestamp: None,
                local_time: None,
                metadata_source: None,
                creation_set: false,
                error: None,
            };
        };

        let mut result = FileResult {
            path: task.path,
            file_name,
            outcome: FileOutcome::Updated,
            timestamp: Some(record.created.to_rfc3339()),
            local_time: Some(record.created.display()),
            metadata_source: Some(record.source),
            creation_set: false,
            error: None,
        };

        match self
            .applier
            .apply(&result.path, &record.created, self.config.dry_run)
        {
            ApplyOutcome::Updated { creation_set } => {
                result.creation_set = creation_set;
            }
            ApplyOutcome::SkippedDryRun => {
                result.outcome = FileOutcome::SkippedDryRun;
            }
            ApplyOutcome::Failed(e) => {
                result.outcome = FileOutcome::Error;
                result.error = Some(e.to_string());
            }
        }

        result
    }
}

fn log_result(result: &FileResult) {
    let date = result.local_time.as_deref().unwrap_or_default();
    match result.outcome {
        FileOutcome::Updated => info!(
            file = %result.file_name,
            date,
            creation_set = result.creation_set,
            "[OK] Set {} → {}",
            result.file_name,
            date
        ),
        FileOutcome::SkippedDryRun => info!(
            file = %result.file_name,
            date,
            "[DRY-RUN] Would set {} → {}",
            result.file_name,
            date
        ),
        FileOutcome::SkippedNoMetadata => info!(
            file = %result.file_name,
            "[SKIP] No metadata found for {}",
            result.file_name
        ),
        FileOutcome::Error => error!(
            file = %result.file_name,
            error = result.error.as_deref().unwrap_or_default(),
            "[ERROR] {}",
            result.file_name
        ),
    }
}
