//! Real/effective user and group ids, and supplementary groups.
//!
//! The setters accept either a numeric id or a name. Names are resolved
//! through the configured [`directory`](crate::directory()); numeric ids are
//! handed to the kernel unvalidated, so an id with no directory entry is
//! still accepted when the caller has the privilege to use it.

use posixbind_core::identity::{GroupDirectory, UserDirectory, resolve_group, resolve_user};
use posixbind_core::{IdentityRef, OsError};

use crate::directory::directory;
use crate::errno_capture::check_ret;
use crate::error::Result;
use crate::util::to_cstring;

pub type Uid = libc::uid_t;
pub type Gid = libc::gid_t;

#[must_use]
pub fn getuid() -> Uid {
    // SAFETY: no preconditions, cannot fail.
    unsafe { libc::getuid() }
}

#[must_use]
pub fn geteuid() -> Uid {
    // SAFETY: no preconditions, cannot fail.
    unsafe { libc::geteuid() }
}

#[must_use]
pub fn getgid() -> Gid {
    // SAFETY: no preconditions, cannot fail.
    unsafe { libc::getgid() }
}

#[must_use]
pub fn getegid() -> Gid {
    // SAFETY: no preconditions, cannot fail.
    unsafe { libc::getegid() }
}

fn install(call: &'static str, ret: libc::c_int) -> std::result::Result<(), OsError> {
    check_ret(call, ret).map(drop)
}

/// Set the effective user id.
pub fn seteuid(user: &IdentityRef) -> Result<()> {
    seteuid_with(user, directory())
}

pub fn seteuid_with<D: UserDirectory + ?Sized>(user: &IdentityRef, directory: &D) -> Result<()> {
    let uid = resolve_user(user, directory)?;
    // SAFETY: plain integer argument.
    install("seteuid", unsafe { libc::seteuid(uid) })?;
    Ok(())
}

/// Set the effective group id.
pub fn setegid(group: &IdentityRef) -> Result<()> {
    setegid_with(group, directory())
}

pub fn setegid_with<D: GroupDirectory + ?Sized>(group: &IdentityRef, directory: &D) -> Result<()> {
    let gid = resolve_group(group, directory)?;
    // SAFETY: plain integer argument.
    install("setegid", unsafe { libc::setegid(gid) })?;
    Ok(())
}

/// Set the real and effective user ids. Both references are resolved
/// before the call, so a failed lookup changes nothing.
pub fn setreuid(ruid: &IdentityRef, euid: &IdentityRef) -> Result<()> {
    setreuid_with(ruid, euid, directory())
}

pub fn setreuid_with<D: UserDirectory + ?Sized>(
    ruid: &IdentityRef,
    euid: &IdentityRef,
    directory: &D,
) -> Result<()> {
    let ruid = resolve_user(ruid, directory)?;
    let euid = resolve_user(euid, directory)?;
    // SAFETY: plain integer arguments.
    install("setreuid", unsafe { libc::setreuid(ruid, euid) })?;
    Ok(())
}

/// Set the real and effective group ids.
pub fn setregid(rgid: &IdentityRef, egid: &IdentityRef) -> Result<()> {
    setregid_with(rgid, egid, directory())
}

pub fn setregid_with<D: GroupDirectory + ?Sized>(
    rgid: &IdentityRef,
    egid: &IdentityRef,
    directory: &D,
) -> Result<()> {
    let rgid = resolve_group(rgid, directory)?;
    let egid = resolve_group(egid, directory)?;
    // SAFETY: plain integer arguments.
    install("setregid", unsafe { libc::setregid(rgid, egid) })?;
    Ok(())
}

/// Initialize the supplementary group list from every group `user` is a
/// member of, plus `group`.
pub fn initgroups(user: &str, group: &IdentityRef) -> Result<()> {
    initgroups_with(user, group, directory())
}

pub fn initgroups_with<D: GroupDirectory + ?Sized>(user: &str, group: &IdentityRef, directory: &D) -> Result<()> {
    let cuser = to_cstring("initgroups", user)?;
    let gid = resolve_group(group, directory)?;
    // Apple declares the group argument as int.
    #[cfg(any(target_os = "macos", target_os = "ios"))]
    let gid = gid as libc::c_int;
    // SAFETY: `cuser` is a valid NUL-terminated string.
    install("initgroups", unsafe { libc::initgroups(cuser.as_ptr(), gid) })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use posixbind_core::IdentityError;
    use posixbind_core::errno::EPERM;
    use posixbind_core::{GroupEntry, UserEntry};

    struct Empty;

    impl UserDirectory for Empty {
        fn user_by_name(&self, _: &str) -> std::result::Result<Option<UserEntry>, OsError> {
            Ok(None)
        }
        fn user_by_id(&self, _: u32) -> std::result::Result<Option<UserEntry>, OsError> {
            Ok(None)
        }
    }

    impl GroupDirectory for Empty {
        fn group_by_name(&self, _: &str) -> std::result::Result<Option<GroupEntry>, OsError> {
            Ok(None)
        }
        fn group_by_id(&self, _: u32) -> std::result::Result<Option<GroupEntry>, OsError> {
            Ok(None)
        }
    }

    #[test]
    fn setting_current_ids_is_allowed() {
        let euid = geteuid();
        seteuid_with(&IdentityRef::Id(euid), &Empty).unwrap();
        assert_eq!(geteuid(), euid);
        let egid = getegid();
        setegid_with(&IdentityRef::Id(egid), &Empty).unwrap();
        assert_eq!(getegid(), egid);
    }

    #[test]
    fn unknown_name_fails_before_the_call() {
        let err = seteuid_with(&IdentityRef::name("dummyzzz1234"), &Empty).unwrap_err();
        assert!(matches!(err, Error::Identity(IdentityError::NotFound { .. })));
        let err = setregid_with(&IdentityRef::Id(0), &IdentityRef::name("nogroup-x"), &Empty).unwrap_err();
        assert_eq!(err.to_string(), "group id does not exist: nogroup-x");
    }

    #[test]
    fn unprivileged_switch_to_root_is_refused() {
        if geteuid() == 0 {
            return;
        }
        let err = seteuid_with(&IdentityRef::Id(0), &Empty).unwrap_err();
        assert_eq!(err.errno(), Some(EPERM));
    }
}
