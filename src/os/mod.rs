//! Platform-specific module for operating system features.
//!
//! Modification time is settable everywhere through `filetime`; creation
//! (birth) time is only writable on some platforms. The capability is
//! resolved once per process and reported instead of assumed.

#[cfg(windows)]
pub mod windows;

#[cfg(target_os = "macos")]
pub mod macos;

use std::io;
use std::path::Path;
use std::sync::OnceLock;
use std::time::SystemTime;

/// Whether this platform can write a file's creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationTimeSupport {
    Supported,
    Unsupported,
}

impl CreationTimeSupport {
    pub fn is_supported(&self) -> bool {
        matches!(self, CreationTimeSupport::Supported)
    }
}

static CREATION_TIME_SUPPORT: OnceLock<CreationTimeSupport> = OnceLock::new();

/// Creation time capability of the running platform, resolved once
pub fn creation_time_support() -> CreationTimeSupport {
    *CREATION_TIME_SUPPORT.get_or_init(|| {
        if cfg!(any(windows, target_os = "macos")) {
            CreationTimeSupport::Supported
        } else {
            CreationTimeSupport::Unsupported
        }
    })
}

/// Set the creation time of a file.
#[cfg(windows)]
pub fn set_creation_time(path: &Path, time: SystemTime) -> io::Result<()> {
    windows::set_creation_time(path, time)
}

/// Set the creation time of a file.
#[cfg(target_os = "macos")]
pub fn set_creation_time(path: &Path, time: SystemTime) -> io::Result<()> {
    macos::set_creation_time(path, time)
}

/// Set the creation time of a file.
///
/// Linux and the BSDs expose no portable call for writing birth time.
#[cfg(not(any(windows, target_os = "macos")))]
pub fn set_creation_time(_path: &Path, _time: SystemTime) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "creation time cannot be set on this platform",
    ))
}

/// Check if the current process has administrator privileges.
#[cfg(unix)]
pub fn has_admin_privileges() -> bool {
    // On Unix, check if EUID is 0 (root)
    nix::unistd::geteuid() == nix::unistd::Uid::from_raw(0)
}

/// Check if the current process has administrator privileges.
#[cfg(windows)]
pub fn has_admin_privileges() -> bool {
    windows::is_running_as_admin()
}

/// Whether creation time writes may be refused without elevation
pub fn creation_time_needs_elevation() -> bool {
    cfg!(windows) && !has_admin_privileges()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_is_stable() {
        assert_eq!(creation_time_support(), creation_time_support());
    }

    #[cfg(not(any(windows, target_os = "macos")))]
    #[test]
    fn test_unsupported_platform_reports_unsupported() {
        assert!(!creation_time_support().is_supported());
        let err = set_creation_time(Path::new("whatever"), SystemTime::now()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[cfg(any(windows, target_os = "macos"))]
    #[test]
    fn test_creation_time_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, b"data").unwrap();

        let when = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_672_569_000);
        set_creation_time(&path, when).unwrap();

        let created = std::fs::metadata(&path).unwrap().created().unwrap();
        assert_eq!(created, when);
    }
}
