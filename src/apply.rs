//! Filesystem timestamp updates

use crate::error::Error;
use crate::os::{self, CreationTimeSupport};
use crate::time::CaptureTime;
use filetime::FileTime;
use std::path::Path;
use tracing::{debug, warn};

/// Result of applying a capture time to one file
#[derive(Debug)]
pub enum ApplyOutcome {
    /// Modification time was set; creation time too when `creation_set`
    Updated { creation_set: bool },
    /// Dry run, nothing was touched
    SkippedDryRun,
    /// The file could not be updated
    Failed(Error),
}

/// Sets modification and, where possible, creation time of media files
#[derive(Debug, Clone, Copy)]
pub struct TimestampApplier {
    creation: CreationTimeSupport,
}

impl Default for TimestampApplier {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampApplier {
    /// Create an applier using the platform's creation time capability
    pub fn new() -> Self {
        Self::with_support(os::creation_time_support())
    }

    pub fn with_support(creation: CreationTimeSupport) -> Self {
        Self { creation }
    }

    pub fn creation_support(&self) -> CreationTimeSupport {
        self.creation
    }

    /// Apply `time` to the file at `path`.
    ///
    /// The modification time must be written for the call to count as an
    /// update; a creation time that cannot be written only downgrades it to
    /// a partial update.
    pub fn apply(&self, path: &Path, time: &CaptureTime, dry_run: bool) -> ApplyOutcome {
        if dry_run {
            debug!(
                file = %path.display(),
                instant = %time.to_rfc3339(),
                "Dry run, leaving timestamps untouched"
            );
            return ApplyOutcome::SkippedDryRun;
        }

        let mtime = FileTime::from_system_time(time.system_time());
        if let Err(source) = filetime::set_file_mtime(path, mtime) {
            return ApplyOutcome::Failed(Error::Apply {
                path: path.to_path_buf(),
                source,
            });
        }

        let creation_set = self.creation.is_supported()
            && match os::set_creation_time(path, time.system_time()) {
                Ok(()) => true,
                Err(e) => {
                    warn!(
                        file = %path.display(),
                        error = %e,
                        "Could not set creation time, modification time was updated"
                    );
                    false
                }
            };

        debug!(file = %path.display(), creation_set, "Updated file timestamps");
        ApplyOutcome::Updated { creation_set }
    }
}
