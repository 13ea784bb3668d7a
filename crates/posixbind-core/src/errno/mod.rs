//! Error numbers and the wrapped OS error.
//!
//! The constants below are the classic codes shared by every Unix we
//! target (their values agree across Linux, the BSDs and macOS). Codes
//! outside that range are carried through verbatim but have no symbolic
//! name.

use std::io;

use thiserror::Error;

pub const EPERM: i32 = 1;
pub const ENOENT: i32 = 2;
pub const ESRCH: i32 = 3;
pub const EINTR: i32 = 4;
pub const EIO: i32 = 5;
pub const ENXIO: i32 = 6;
pub const E2BIG: i32 = 7;
pub const ENOEXEC: i32 = 8;
pub const EBADF: i32 = 9;
pub const ECHILD: i32 = 10;
pub const ENOMEM: i32 = 12;
pub const EACCES: i32 = 13;
pub const EFAULT: i32 = 14;
pub const ENOTBLK: i32 = 15;
pub const EBUSY: i32 = 16;
pub const EEXIST: i32 = 17;
pub const EXDEV: i32 = 18;
pub const ENODEV: i32 = 19;
pub const ENOTDIR: i32 = 20;
pub const EISDIR: i32 = 21;
pub const EINVAL: i32 = 22;
pub const ENFILE: i32 = 23;
pub const EMFILE: i32 = 24;
pub const ENOTTY: i32 = 25;
pub const ETXTBSY: i32 = 26;
pub const EFBIG: i32 = 27;
pub const ENOSPC: i32 = 28;
pub const ESPIPE: i32 = 29;
pub const EROFS: i32 = 30;
pub const EMLINK: i32 = 31;
pub const EPIPE: i32 = 32;
pub const EDOM: i32 = 33;
pub const ERANGE: i32 = 34;

const NAMES: [&str; 35] = [
    "",
    "EPERM",
    "ENOENT",
    "ESRCH",
    "EINTR",
    "EIO",
    "ENXIO",
    "E2BIG",
    "ENOEXEC",
    "EBADF",
    "ECHILD",
    // 11 is EAGAIN on Linux and EDEADLK on the BSDs.
    "",
    "ENOMEM",
    "EACCES",
    "EFAULT",
    "ENOTBLK",
    "EBUSY",
    "EEXIST",
    "EXDEV",
    "ENODEV",
    "ENOTDIR",
    "EISDIR",
    "EINVAL",
    "ENFILE",
    "EMFILE",
    "ENOTTY",
    "ETXTBSY",
    "EFBIG",
    "ENOSPC",
    "ESPIPE",
    "EROFS",
    "EMLINK",
    "EPIPE",
    "EDOM",
    "ERANGE",
];

/// Symbolic name for `code`, when it is one of the portable classic codes.
#[must_use]
pub fn name(code: i32) -> Option<&'static str> {
    usize::try_from(code)
        .ok()
        .and_then(|idx| NAMES.get(idx))
        .copied()
        .filter(|name| !name.is_empty())
}

/// A platform error code surfaced verbatim from a read, lookup or install
/// call, tagged with the name of the call that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("{}", describe(.call, .code))]
pub struct OsError {
    call: &'static str,
    code: i32,
}

impl OsError {
    #[must_use]
    pub const fn new(call: &'static str, code: i32) -> Self {
        Self { call, code }
    }

    /// Wrap an `io::Error`, keeping its raw OS code (or `EIO` when the
    /// error did not come from the OS).
    #[must_use]
    pub fn from_io(call: &'static str, err: &io::Error) -> Self {
        Self::new(call, err.raw_os_error().unwrap_or(EIO))
    }

    /// The call that failed, e.g. `"getrlimit"`.
    #[must_use]
    pub const fn call(&self) -> &'static str {
        self.call
    }

    /// The raw errno value.
    #[must_use]
    pub const fn code(&self) -> i32 {
        self.code
    }

    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        name(self.code)
    }
}

fn describe(call: &str, code: &i32) -> String {
    let text = io::Error::from_raw_os_error(*code);
    match name(*code) {
        Some(name) => format!("{call}: {name}, {text}"),
        None => format!("{call}: {text}"),
    }
}

impl From<OsError> for io::Error {
    fn from(err: OsError) -> Self {
        io::Error::from_raw_os_error(err.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_names_resolve() {
        assert_eq!(name(EPERM), Some("EPERM"));
        assert_eq!(name(ENOENT), Some("ENOENT"));
        assert_eq!(name(EINVAL), Some("EINVAL"));
        assert_eq!(name(ERANGE), Some("ERANGE"));
    }

    #[test]
    fn unknown_codes_have_no_name() {
        assert_eq!(name(0), None);
        assert_eq!(name(-1), None);
        assert_eq!(name(11), None);
        assert_eq!(name(9999), None);
    }

    #[test]
    fn display_includes_call_and_symbol() {
        let err = OsError::new("setrlimit", EPERM);
        let text = err.to_string();
        assert!(text.starts_with("setrlimit: EPERM, "), "got {text}");
    }

    #[test]
    fn display_without_symbol_still_names_call() {
        let err = OsError::new("swapon", 9999);
        assert!(err.to_string().starts_with("swapon: "));
        assert_eq!(err.name(), None);
    }

    #[test]
    fn from_io_keeps_raw_code() {
        let io_err = io::Error::from_raw_os_error(EACCES);
        let err = OsError::from_io("open", &io_err);
        assert_eq!(err.code(), EACCES);
        assert_eq!(err.call(), "open");
    }

    #[test]
    fn from_io_without_os_code_maps_to_eio() {
        let io_err = io::Error::other("synthetic");
        assert_eq!(OsError::from_io("read", &io_err).code(), EIO);
    }

    #[test]
    fn converts_back_to_io_error() {
        let io_err: io::Error = OsError::new("chroot", ENOTDIR).into();
        assert_eq!(io_err.raw_os_error(), Some(ENOTDIR));
    }
}
