//! Host name.

use posixbind_core::OsError;

use crate::errno_capture::check_ret;
use crate::error::{Error, Result};
use crate::util::c_buffer_bytes;

#[cfg(any(target_os = "linux", target_os = "android"))]
const HOST_NAME_MAX: usize = 64;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const HOST_NAME_MAX: usize = 255;

/// The host name, decoded lossily.
pub fn gethostname() -> std::result::Result<String, OsError> {
    let mut buf = [0u8; HOST_NAME_MAX + 1];
    // SAFETY: `buf` is writable for its full length.
    check_ret("gethostname", unsafe {
        libc::gethostname(buf.as_mut_ptr().cast(), buf.len())
    })?;
    // A truncated name may lack its terminator; the buffer end bounds it.
    Ok(String::from_utf8_lossy(c_buffer_bytes(&buf)).into_owned())
}

/// Set the host name. Requires `CAP_SYS_ADMIN` (or root) on most systems.
pub fn sethostname(name: &str) -> Result<()> {
    if name.as_bytes().contains(&0) {
        return Err(Error::InvalidArgument {
            call: "sethostname",
            reason: "embedded NUL byte",
        });
    }
    #[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd", target_os = "dragonfly"))]
    let len = libc::c_int::try_from(name.len()).map_err(|_| OsError::new("sethostname", libc::EINVAL))?;
    #[cfg(not(any(target_os = "macos", target_os = "ios", target_os = "freebsd", target_os = "dragonfly")))]
    let len = name.len();
    // SAFETY: the pointer/length pair describes `name`; no terminator is read.
    check_ret("sethostname", unsafe { libc::sethostname(name.as_ptr().cast(), len) })?;
    Ok(())
}
