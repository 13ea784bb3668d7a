//! `openlog` / `syslog` / `closelog` / `setlogmask` forwarding.
//!
//! `openlog` keeps the ident pointer it is given and reads it on every
//! later `syslog` call, so the ident must outlive the call that set it. It
//! is copied into one process-wide fixed buffer; the same lock guards the
//! buffer and every call that may read it, so an ident is never replaced
//! while a message is being written.

use std::ffi::c_int;

use parking_lot::Mutex;
use posixbind_core::syslog::{Facility, LogMask, LogOption, LogOptions, MAX_SYSLOG_IDENT, Priority, ident_prefix};

use crate::error::Result;
use crate::util::{c_buffer_bytes, to_cstring};

struct IdentSlot {
    buf: [u8; MAX_SYSLOG_IDENT + 1],
    /// True between an `openlog` with an ident and the next `closelog`.
    set: bool,
}

static IDENT: Mutex<IdentSlot> = Mutex::new(IdentSlot {
    buf: [0; MAX_SYSLOG_IDENT + 1],
    set: false,
});

fn raw_option(option: LogOption) -> c_int {
    libc_constant! { option, LogOption;
        Pid => LOG_PID,
        Cons => LOG_CONS,
        Ndelay => LOG_NDELAY,
        Odelay => LOG_ODELAY,
        Nowait => LOG_NOWAIT,
    }
}

fn raw_options(options: LogOptions) -> c_int {
    options.iter().fold(0, |acc, option| acc | raw_option(option))
}

/// The C library's `LOG_*` facility code.
#[must_use]
pub fn raw_facility(facility: Facility) -> c_int {
    libc_constant! { facility, Facility;
        Auth => LOG_AUTH,
        Authpriv => LOG_AUTHPRIV,
        Cron => LOG_CRON,
        Daemon => LOG_DAEMON,
        Ftp => LOG_FTP,
        Kern => LOG_KERN,
        Lpr => LOG_LPR,
        Mail => LOG_MAIL,
        News => LOG_NEWS,
        Syslog => LOG_SYSLOG,
        User => LOG_USER,
        Uucp => LOG_UUCP,
        Local0 => LOG_LOCAL0,
        Local1 => LOG_LOCAL1,
        Local2 => LOG_LOCAL2,
        Local3 => LOG_LOCAL3,
        Local4 => LOG_LOCAL4,
        Local5 => LOG_LOCAL5,
        Local6 => LOG_LOCAL6,
        Local7 => LOG_LOCAL7,
    }
}

/// Open the connection to the system logger.
///
/// `ident` is cut at its first NUL and to at most [`MAX_SYSLOG_IDENT`]
/// bytes. `None` lets the C library use the program name.
pub fn openlog(ident: Option<&str>, options: LogOptions, facility: Facility) {
    let mut slot = IDENT.lock();
    if ident.is_none() && slot.set {
        // A null ident keeps the C library's previous tag, which points at
        // the buffer cleared below; closelog resets it to the program name.
        // SAFETY: no arguments.
        unsafe { libc::closelog() };
    }
    slot.buf.fill(0);
    slot.set = false;
    let ident_ptr = match ident {
        Some(ident) => {
            let kept = ident_prefix(ident).as_bytes();
            slot.buf[..kept.len()].copy_from_slice(kept);
            slot.set = true;
            slot.buf.as_ptr().cast()
        }
        None => std::ptr::null(),
    };
    // SAFETY: the ident buffer is static and NUL-terminated (its last byte
    // is never written); it is only changed again under this lock.
    unsafe { libc::openlog(ident_ptr, raw_options(options), raw_facility(facility)) };
}

/// Write one message at `priority`.
///
/// The message is passed as the argument of a `"%s"` format, never as the
/// format itself.
pub fn syslog(priority: Priority, message: &str) -> Result<()> {
    let cmsg = to_cstring("syslog", message)?;
    let _slot = IDENT.lock();
    // SAFETY: both strings are NUL-terminated and outlive the call.
    unsafe { libc::syslog(priority.code(), c"%s".as_ptr(), cmsg.as_ptr()) };
    Ok(())
}

/// Close the logger connection and clear the stored ident.
pub fn closelog() {
    let mut slot = IDENT.lock();
    // SAFETY: no arguments.
    unsafe { libc::closelog() };
    slot.buf.fill(0);
    slot.set = false;
}

/// The ident passed to the last `openlog`, if the log is open with one.
#[must_use]
pub fn current_ident() -> Option<String> {
    let slot = IDENT.lock();
    slot.set
        .then(|| String::from_utf8_lossy(c_buffer_bytes(&slot.buf)).into_owned())
}

/// Install `mask` and return the previous one. An empty mask leaves the
/// current mask unchanged, so `setlogmask(LogMask::empty())` is a query.
pub fn setlogmask(mask: LogMask) -> LogMask {
    // SAFETY: plain integer argument.
    LogMask::from_bits(unsafe { libc::setlogmask(mask.bits()) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_fold_into_bits() {
        let opts = LogOptions::empty().with(LogOption::Pid).with(LogOption::Ndelay);
        assert_eq!(raw_options(opts), libc::LOG_PID | libc::LOG_NDELAY);
        assert_eq!(raw_options(LogOptions::empty()), 0);
    }

    #[test]
    fn facilities_are_distinct() {
        let mut codes: Vec<_> = Facility::all().iter().map(|&f| raw_facility(f)).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), Facility::all().len());
    }

    #[test]
    fn empty_mask_queries() {
        let before = setlogmask(LogMask::empty());
        assert_eq!(setlogmask(LogMask::empty()), before);
    }
}
