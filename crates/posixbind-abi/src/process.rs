//! Process identity and session calls from `<unistd.h>`.

use posixbind_core::OsError;

use crate::errno_capture::check_ret;

pub type Pid = libc::pid_t;

#[must_use]
pub fn getpid() -> Pid {
    // SAFETY: getpid has no preconditions and cannot fail.
    unsafe { libc::getpid() }
}

/// Parent process id. Cannot fail.
#[must_use]
pub fn getppid() -> Pid {
    // SAFETY: getppid has no preconditions and cannot fail.
    unsafe { libc::getppid() }
}

/// Process group of `pid` (`0` means the calling process).
pub fn getpgid(pid: Pid) -> Result<Pid, OsError> {
    // SAFETY: plain integer argument.
    check_ret("getpgid", unsafe { libc::getpgid(pid) })
}

/// Process group of the calling process.
pub fn getpgrp() -> Result<Pid, OsError> {
    getpgid(0)
}

/// Move `pid` into process group `pgid`. Zero for either selects the
/// calling process's own id.
pub fn setpgid(pid: Pid, pgid: Pid) -> Result<(), OsError> {
    // SAFETY: plain integer arguments.
    check_ret("setpgid", unsafe { libc::setpgid(pid, pgid) })?;
    Ok(())
}

/// Start a new session; returns the new session id.
pub fn setsid() -> Result<Pid, OsError> {
    // SAFETY: no arguments.
    check_ret("setsid", unsafe { libc::setsid() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use posixbind_core::errno::ESRCH;

    #[test]
    fn parent_is_positive() {
        assert!(getppid() > 0);
        assert_ne!(getppid(), getpid());
    }

    #[test]
    fn own_group_is_readable() {
        assert_eq!(getpgrp(), getpgid(getpid()));
    }

    #[test]
    fn unknown_pid_reports_esrch() {
        // pid_max on Linux is at most 2^22, so this pid cannot exist.
        let err = getpgid(Pid::MAX).unwrap_err();
        assert_eq!(err.call(), "getpgid");
        assert_eq!(err.code(), ESRCH);
    }
}
