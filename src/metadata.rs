//! CSV metadata index
//!
//! iCloud photo exports ship one or more `*.csv` files next to the media.
//! Every row names a file (`imgName`) and its capture date
//! (`originalCreationDate`); any other column is ignored. All sources are
//! merged into a single name → record map where the first valid row for a
//! name wins and later duplicates are discarded.

use crate::config::NameMatching;
use crate::error::{Error, Result};
use crate::time::{CaptureTime, parse_metadata_date};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Column holding the media file name
pub const NAME_COLUMN: &str = "imgName";

/// Column holding the capture date
pub const DATE_COLUMN: &str = "originalCreationDate";

/// Check whether a path looks like a CSV metadata file
pub fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// One row as read from a CSV source, before validation
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "imgName", default)]
    img_name: Option<String>,
    #[serde(rename = "originalCreationDate", default)]
    original_creation_date: Option<String>,
}

/// The resolved metadata of one media file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    /// File name exactly as written in the CSV
    pub file_name: String,
    /// Original capture time
    pub created: CaptureTime,
    /// CSV file the record was taken from
    pub source: PathBuf,
    /// 1-based data row within the source (header excluded)
    pub row: usize,
}

/// A row that was excluded from the index
#[derive(Debug, Clone, Serialize)]
pub struct MalformedRow {
    pub source: PathBuf,
    pub row: usize,
    pub reason: String,
}

/// A CSV source that could not be read
#[derive(Debug, Clone, Serialize)]
pub struct SourceFailure {
    pub source: PathBuf,
    pub message: String,
}

/// What happened while loading the metadata sources
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    /// Sources read to the end
    pub sources_read: usize,
    /// Data rows seen across all sources
    pub rows_total: usize,
    /// Later rows dropped because an earlier row named the same file
    pub duplicates_discarded: usize,
    pub malformed_rows: Vec<MalformedRow>,
    pub failed_sources: Vec<SourceFailure>,
}

/// Rows read from a single source, held back until the source is read in full
#[derive(Debug, Default)]
struct SourceBatch {
    rows: usize,
    records: Vec<MetadataRecord>,
    malformed: Vec<MalformedRow>,
}

impl SourceBatch {
    fn malformed(&mut self, path: &Path, row: usize, reason: String) {
        warn!(source = %path.display(), row, %reason, "Skipping malformed metadata row");
        self.malformed.push(MalformedRow {
            source: path.to_path_buf(),
            row,
            reason,
        });
    }
}

/// Lookup from media file name to its metadata record
#[derive(Debug, Clone)]
pub struct MetadataIndex {
    matching: NameMatching,
    records: HashMap<String, MetadataRecord>,
}

impl MetadataIndex {
    /// Create an empty index using the given name comparison policy
    pub fn new(matching: NameMatching) -> Self {
        Self {
            matching,
            records: HashMap::new(),
        }
    }

    /// Build an index from sources in the given order.
    ///
    /// Sources are consumed in iteration order and rows in file order, so the
    /// first valid row for a name across all sources is the one retained.
    /// Malformed rows are dropped before that rule applies: a name whose
    /// first row has a bad date still resolves to its next valid row rather
    /// than being reported as an error. A source that fails partway through
    /// contributes nothing.
    pub fn build<R, I>(sources: I, matching: NameMatching) -> (Self, LoadReport)
    where
        R: Read,
        I: IntoIterator<Item = (PathBuf, R)>,
    {
        let mut index = Self::new(matching);
        let mut report = LoadReport::default();

        for (path, reader) in sources {
            index.ingest_or_report(&path, reader, &mut report);
        }

        (index, report)
    }

    /// Build an index from CSV files on disk, in the order given
    pub fn load_files(paths: &[PathBuf], matching: NameMatching) -> (Self, LoadReport) {
        let mut index = Self::new(matching);
        let mut report = LoadReport::default();

        for path in paths {
            match File::open(path) {
                Ok(file) => index.ingest_or_report(path, file, &mut report),
                Err(e) => {
                    let err = Error::CsvRead {
                        path: path.clone(),
                        message: e.to_string(),
                    };
                    warn!(error = %err, "Skipping unreadable CSV source");
                    report.failed_sources.push(SourceFailure {
                        source: path.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            records = index.len(),
            csv_files = report.sources_read,
            failed = report.failed_sources.len(),
            malformed_rows = report.malformed_rows.len(),
            duplicates = report.duplicates_discarded,
            "Loaded metadata for {} records from {} CSV file(s)",
            index.len(),
            report.sources_read
        );

        (index, report)
    }

    fn ingest_or_report<R: Read>(&mut self, path: &Path, reader: R, report: &mut LoadReport) {
        match Self::ingest(path, reader) {
            Ok(batch) => {
                debug!(source = %path.display(), rows = batch.rows, "Read CSV source");
                report.sources_read += 1;
                report.rows_total += batch.rows;
                report.malformed_rows.extend(batch.malformed);
                for record in batch.records {
                    self.insert(record, report);
                }
            }
            Err(err) => {
                warn!(error = %err, "Skipping unreadable CSV source");
                let message = match &err {
                    Error::CsvRead { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                report.failed_sources.push(SourceFailure {
                    source: path.to_path_buf(),
                    message,
                });
            }
        }
    }

    /// Read one CSV source completely. Nothing is merged until the whole
    /// source has been read, so a source that fails partway contributes no rows.
    fn ingest<R: Read>(path: &Path, reader: R) -> Result<SourceBatch> {
        let csv_error = |message: String| Error::CsvRead {
            path: path.to_path_buf(),
            message,
        };

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut batch = SourceBatch::default();
        let headers = rdr.headers().map_err(|e| csv_error(e.to_string()))?.clone();
        if headers.is_empty() {
            return Ok(batch);
        }
        for column in [NAME_COLUMN, DATE_COLUMN] {
            if !headers.iter().any(|h| h == column) {
                return Err(csv_error(format!("missing required column '{column}'")));
            }
        }

        for (idx, result) in rdr.deserialize::<CsvRow>().enumerate() {
            let row = idx + 1;
            batch.rows += 1;

            let parsed = match result {
                Ok(parsed) => parsed,
                Err(e) if e.is_io_error() => return Err(csv_error(e.to_string())),
                Err(e) => {
                    batch.malformed(path, row, e.to_string());
                    continue;
                }
            };

            match Self::validate(path, row, parsed) {
                Ok(record) => batch.records.push(record),
                Err(reason) => batch.malformed(path, row, reason),
            }
        }

        Ok(batch)
    }

    /// Turn a raw row into a record, failing closed on missing fields or bad dates
    fn validate(
        path: &Path,
        row: usize,
        parsed: CsvRow,
    ) -> std::result::Result<MetadataRecord, String> {
        let name = parsed
            .img_name
            .filter(|s| !s.is_empty())
            .ok_or_else(|| format!("missing {NAME_COLUMN}"))?;
        let raw_date = parsed
            .original_creation_date
            .filter(|s| !s.is_empty())
            .ok_or_else(|| format!("missing {DATE_COLUMN} for {name}"))?;
        let created = parse_metadata_date(&raw_date).map_err(|e| format!("{name}: {e}"))?;

        Ok(MetadataRecord {
            file_name: name,
            created,
            source: path.to_path_buf(),
            row,
        })
    }

    fn insert(&mut self, record: MetadataRecord, report: &mut LoadReport) {
        match self.records.entry(self.matching.key(&record.file_name)) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(kept) => {
                debug!(
                    file = %record.file_name,
                    kept_source = %kept.get().source.display(),
                    kept_row = kept.get().row,
                    discarded_source = %record.source.display(),
                    discarded_row = record.row,
                    "Discarding duplicate metadata row"
                );
                report.duplicates_discarded += 1;
            }
        }
    }

    /// Find the record for a media file name
    pub fn lookup(&self, file_name: &str) -> Option<&MetadataRecord> {
        self.records.get(&self.matching.key(file_name))
    }

    pub fn matching(&self) -> NameMatching {
        self.matching
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &MetadataRecord> {
        self.records.values()
    }
}
