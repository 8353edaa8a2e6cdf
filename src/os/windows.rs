//! Windows-specific operating system features.

use std::fs::{FileTimes, OpenOptions};
use std::io;
use std::os::windows::fs::{FileTimesExt, OpenOptionsExt};
use std::path::Path;
use std::time::SystemTime;
use winapi::ctypes::c_void;
use winapi::um::handleapi::CloseHandle;
use winapi::um::processthreadsapi::{GetCurrentProcess, OpenProcessToken};
use winapi::um::securitybaseapi::GetTokenInformation;
use winapi::um::winnt::{FILE_WRITE_ATTRIBUTES, HANDLE, TOKEN_ELEVATION, TOKEN_QUERY, TokenElevation};

/// Check if the current process is running with administrator privileges.
pub fn is_running_as_admin() -> bool {
    let mut token_handle: HANDLE = std::ptr::null_mut();
    let mut is_admin = false;

    let success = unsafe { OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token_handle) };

    if success != 0 && !token_handle.is_null() {
        let mut token_info: TOKEN_ELEVATION = unsafe { std::mem::zeroed() };
        let mut return_length: u32 = 0;

        let query_success = unsafe {
            GetTokenInformation(
                token_handle,
                TokenElevation,
                &mut token_info as *mut _ as *mut c_void,
                std::mem::size_of::<TOKEN_ELEVATION>() as u32,
                &mut return_length,
            )
        };

        unsafe {
            CloseHandle(token_handle);
        }

        if query_success != 0 {
            is_admin = token_info.TokenIsElevated != 0;
        }
    }

    is_admin
}

/// Set the NTFS creation time of a file.
///
/// Only `FILE_WRITE_ATTRIBUTES` is requested so read-only files can still
/// have their timestamps updated.
pub fn set_creation_time(path: &Path, time: SystemTime) -> io::Result<()> {
    let file = OpenOptions::new()
        .access_mode(FILE_WRITE_ATTRIBUTES)
        .open(path)?;
    file.set_times(FileTimes::new().set_created(time))
}
