//! Root directory change.

use crate::errno_capture::check_ret;
use crate::error::Result;
use crate::util::to_cstring;

/// Change the working directory to `path`, then make it the root directory.
///
/// Entering the directory first means the process never keeps a working
/// directory outside the new root. If the `chdir` fails, the root is left
/// untouched and the error is reported under the call name `chroot: chdir`.
pub fn chroot(path: &str) -> Result<()> {
    let cpath = to_cstring("chroot", path)?;
    // SAFETY: `cpath` is a valid NUL-terminated string for both calls.
    check_ret("chroot: chdir", unsafe { libc::chdir(cpath.as_ptr()) })?;
    check_ret("chroot", unsafe { libc::chroot(cpath.as_ptr()) })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use posixbind_core::errno::ENOENT;

    #[test]
    fn missing_directory_fails_in_chdir() {
        let err = chroot("/nonexistent/posixbind/chroot").unwrap_err();
        match err {
            Error::Os(os) => {
                assert_eq!(os.call(), "chroot: chdir");
                assert_eq!(os.code(), ENOENT);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn interior_nul_is_rejected_before_any_call() {
        assert!(matches!(
            chroot("/tmp\0/x"),
            Err(Error::InvalidArgument { call: "chroot", .. })
        ));
    }
}
