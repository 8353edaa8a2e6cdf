//! Photo Date Restore - restore original timestamps of exported photos
//!
//! iCloud photo exports lose the original capture dates on the files
//! themselves but ship CSV metadata next to them. This library provides:
//! - Parsing of the export's human-readable capture dates
//! - Merging of all CSV metadata files into one first-wins index
//! - Modification and creation time updates with per-platform capability
//! - A sequential (or optionally parallel) run driver with dry-run support

pub mod apply;
pub mod cli;
pub mod config;
pub mod error;
pub mod i18n;
pub mod metadata;
pub mod os;
pub mod process;
pub mod time;

pub use apply::{ApplyOutcome, TimestampApplier};
pub use cli::Cli;
pub use config::{Config, ConfigError, NameMatching};
pub use error::{Error, Result};
pub use i18n::init_locale;
pub use metadata::{LoadReport, MetadataIndex, MetadataRecord};
pub use process::{FileOutcome, FileResult, Processor, RunSummary};
pub use time::{CaptureTime, DateParseError, parse_metadata_date};
