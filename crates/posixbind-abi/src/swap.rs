//! Linux swap area activation.

use posixbind_core::swap::SwapFlags;

use crate::errno_capture::check_syscall;
use crate::error::{Error, Result};
use crate::util::to_cstring;

/// Start swapping to the file or block device at `path`.
pub fn swapon(path: &str, flags: SwapFlags) -> Result<()> {
    let cpath = to_cstring("swapon", path)?;
    let raw_flags = flags.to_raw().map_err(|_| Error::InvalidArgument {
        call: "swapon",
        reason: "swap priority out of range",
    })?;
    // SAFETY: `cpath` is a valid NUL-terminated path.
    check_syscall("swapon", unsafe {
        libc::syscall(libc::SYS_swapon, cpath.as_ptr(), raw_flags)
    })?;
    Ok(())
}

/// Stop swapping to `path`.
pub fn swapoff(path: &str) -> Result<()> {
    let cpath = to_cstring("swapoff", path)?;
    // SAFETY: `cpath` is a valid NUL-terminated path.
    check_syscall("swapoff", unsafe { libc::syscall(libc::SYS_swapoff, cpath.as_ptr()) })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_priority_is_rejected_before_the_call() {
        let flags = SwapFlags {
            priority: Some(0x8000),
            discard: false,
        };
        assert!(matches!(
            swapon("/nonexistent/swapfile", flags),
            Err(Error::InvalidArgument { call: "swapon", .. })
        ));
    }

    #[test]
    fn swapoff_of_missing_file_fails() {
        let err = swapoff("/nonexistent/posixbind/swapfile").unwrap_err();
        assert!(err.errno().is_some());
    }
}
