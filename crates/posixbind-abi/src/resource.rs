//! `getrlimit` / `setrlimit` forwarding.
//!
//! `setrlimit` accepts a partial request: the missing side is filled in from
//! a fresh `getrlimit` read by [`posixbind_core::resource::resolve_limit`],
//! and the complete pair is installed with a single `setrlimit` call.

use posixbind_core::errno::EINVAL;
use posixbind_core::resource::resolve_limit;
use posixbind_core::{LimitPair, LimitRequest, LimitValue, OsError, ResourceKind};

use crate::errno_capture::check_ret;
use crate::error::{Error, Result};

#[cfg(all(target_os = "linux", target_env = "gnu"))]
pub type RawResource = libc::__rlimit_resource_t;
#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
pub type RawResource = libc::c_int;

/// The C library's `RLIMIT_*` constant for `kind`.
#[must_use]
pub fn raw_resource(kind: ResourceKind) -> RawResource {
    libc_constant! { kind, ResourceKind;
        Core => RLIMIT_CORE,
        Cpu => RLIMIT_CPU,
        Data => RLIMIT_DATA,
        Fsize => RLIMIT_FSIZE,
        Nofile => RLIMIT_NOFILE,
        #[cfg(any(
            target_os = "linux",
            target_os = "android",
            target_os = "macos",
            target_os = "ios",
            target_os = "freebsd",
            target_os = "openbsd",
            target_os = "netbsd",
            target_os = "dragonfly"
        ))]
        Nproc => RLIMIT_NPROC,
        Stack => RLIMIT_STACK,
        #[cfg(any(
            target_os = "linux",
            target_os = "android",
            target_os = "freebsd",
            target_os = "openbsd",
            target_os = "netbsd",
            target_os = "dragonfly"
        ))]
        As => RLIMIT_AS,
    }
}

fn decode(raw: libc::rlim_t) -> LimitValue {
    LimitValue::from_raw(u64::from(raw), u64::from(libc::RLIM_INFINITY))
}

fn encode(call: &'static str, value: LimitValue) -> std::result::Result<libc::rlim_t, OsError> {
    match value {
        LimitValue::Unbounded => Ok(libc::RLIM_INFINITY),
        // Values wider than rlim_t cannot be expressed to the kernel.
        LimitValue::Finite(v) => libc::rlim_t::try_from(v).map_err(|_| OsError::new(call, EINVAL)),
    }
}

fn resource_by_name(call: &'static str, name: &str) -> Result<ResourceKind> {
    ResourceKind::from_name(name).ok_or_else(|| Error::UnknownResource {
        call,
        name: name.to_string(),
    })
}

/// Read the current (soft, hard) pair for `kind`.
pub fn getrlimit(kind: ResourceKind) -> std::result::Result<LimitPair, OsError> {
    let mut rlim = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // SAFETY: `rlim` is a valid, writable rlimit.
    check_ret("getrlimit", unsafe { libc::getrlimit(raw_resource(kind), &mut rlim) })?;
    Ok(LimitPair::new(decode(rlim.rlim_cur), decode(rlim.rlim_max)))
}

/// Install a complete pair for `kind` as-is.
pub fn install_limit(kind: ResourceKind, pair: LimitPair) -> std::result::Result<(), OsError> {
    let rlim = libc::rlimit {
        rlim_cur: encode("setrlimit", pair.soft)?,
        rlim_max: encode("setrlimit", pair.hard)?,
    };
    // SAFETY: `rlim` is a valid rlimit for the duration of the call.
    check_ret("setrlimit", unsafe { libc::setrlimit(raw_resource(kind), &rlim) })?;
    Ok(())
}

/// Apply a partial request for `kind` and return the pair that was installed.
///
/// A request with both sides explicit is installed without reading the
/// current limits. Read and install errors are returned verbatim.
pub fn setrlimit(kind: ResourceKind, request: LimitRequest) -> std::result::Result<LimitPair, OsError> {
    let pair = resolve_limit(kind, request, getrlimit)?;
    install_limit(kind, pair)?;
    Ok(pair)
}

/// [`getrlimit`] addressed by resource name (`"nofile"`, `"core"`, ...).
pub fn getrlimit_by_name(name: &str) -> Result<LimitPair> {
    let kind = resource_by_name("getrlimit", name)?;
    Ok(getrlimit(kind)?)
}

/// [`setrlimit`] addressed by resource name. Unknown names are rejected
/// before any limit is read.
pub fn setrlimit_by_name(name: &str, request: LimitRequest) -> Result<LimitPair> {
    let kind = resource_by_name("setrlimit", name)?;
    Ok(setrlimit(kind, request)?)
}
