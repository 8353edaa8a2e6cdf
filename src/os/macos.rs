//! macOS-specific operating system features.

use std::fs::{File, FileTimes};
use std::io;
use std::os::macos::fs::FileTimesExt;
use std::path::Path;
use std::time::SystemTime;

/// Set the APFS/HFS+ birth time of a file.
pub fn set_creation_time(path: &Path, time: SystemTime) -> io::Result<()> {
    let file = File::open(path)?;
    file.set_times(FileTimes::new().set_created(time))
}
