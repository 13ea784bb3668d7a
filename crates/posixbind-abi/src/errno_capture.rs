//! Reading `errno` right after a failed call.

use std::ffi::c_int;

use posixbind_core::OsError;
use posixbind_core::errno;

/// The calling thread's `errno`, or `default_errno` if the OS gave none.
#[inline]
pub(crate) fn last_host_errno(default_errno: c_int) -> c_int {
    std::io::Error::last_os_error()
        .raw_os_error()
        .unwrap_or(default_errno)
}

#[inline]
pub(crate) fn last_os_error(call: &'static str) -> OsError {
    OsError::new(call, last_host_errno(errno::EIO))
}

/// Map the usual `-1 on error` return convention to a `Result`.
#[inline]
pub(crate) fn check_ret(call: &'static str, ret: c_int) -> Result<c_int, OsError> {
    if ret < 0 {
        Err(last_os_error(call))
    } else {
        Ok(ret)
    }
}

/// Same as [`check_ret`] for raw `syscall(2)` results.
#[cfg(any(target_os = "linux", target_os = "android"))]
#[inline]
pub(crate) fn check_syscall(call: &'static str, ret: libc::c_long) -> Result<libc::c_long, OsError> {
    if ret < 0 {
        Err(last_os_error(call))
    } else {
        Ok(ret)
    }
}
