//! User and group directory backends.
//!
//! [`NativeDirectory`] asks the C library through the reentrant
//! `getpwnam_r` family, so every NSS source configured on the host applies.
//! [`FilesDirectory`] parses passwd/group files itself and caches each file
//! until its size or modification time changes. [`directory`] returns the
//! backend selected by [`config`](crate::config).

use std::ffi::{c_char, c_int};
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::{Arc, LazyLock};
use std::time::UNIX_EPOCH;

use parking_lot::Mutex;
use posixbind_core::identity::{self, GroupDirectory, UserDirectory};
use posixbind_core::{GroupEntry, IdentityRef, OsError, UserEntry, grp, pwd};

use crate::config::{self, DirectoryBackend};
use crate::error::Result;
use crate::util::{lossy_string, to_cstring};

/// A backend that answers both user and group lookups.
pub trait Directory: UserDirectory + GroupDirectory + Send + Sync {}

impl<T: UserDirectory + GroupDirectory + Send + Sync> Directory for T {}

// ---------------------------------------------------------------------------
// Native (C library / NSS)
// ---------------------------------------------------------------------------

/// Lookups through `getpwnam_r`, `getpwuid_r`, `getgrnam_r` and `getgrgid_r`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeDirectory;

const FALLBACK_BUFFER_LEN: usize = 1024;
const MAX_BUFFER_LEN: usize = 1 << 20;

fn initial_buffer_len(name: c_int) -> usize {
    // SAFETY: sysconf has no memory-safety preconditions.
    let hint = unsafe { libc::sysconf(name) };
    usize::try_from(hint)
        .ok()
        .filter(|&len| len > 0)
        .unwrap_or(FALLBACK_BUFFER_LEN)
}

/// Drive one `*_r` lookup, growing the scratch buffer on `ERANGE`.
///
/// `call` receives the output struct, the buffer and the result slot, and
/// returns the function's error code. The entry is converted while the
/// buffer it points into is still alive.
fn reentrant_lookup<R, T>(
    call: &'static str,
    size_hint: c_int,
    mut lookup: impl FnMut(*mut R, *mut c_char, usize, *mut *mut R) -> c_int,
    convert: impl Fn(&R) -> T,
) -> std::result::Result<Option<T>, OsError> {
    let mut len = initial_buffer_len(size_hint);
    loop {
        let mut buf = vec![0 as c_char; len];
        // SAFETY: passwd and group are plain C structs; all-zero is valid.
        let mut entry: R = unsafe { std::mem::zeroed() };
        let mut result: *mut R = ptr::null_mut();
        let rc = lookup(&raw mut entry, buf.as_mut_ptr(), buf.len(), &raw mut result);
        match rc {
            0 if result.is_null() => return Ok(None),
            0 => return Ok(Some(convert(&entry))),
            libc::ERANGE if len < MAX_BUFFER_LEN => len *= 2,
            // A missing entry is 0 with a null result; any other code means
            // the directory service itself failed.
            code => return Err(OsError::new(call, code)),
        }
    }
}

fn user_from_raw(pw: &libc::passwd) -> UserEntry {
    // SAFETY: a successful *_r call leaves every string field pointing
    // into the live scratch buffer (or null).
    unsafe {
        UserEntry {
            name: lossy_string(pw.pw_name),
            passwd: lossy_string(pw.pw_passwd),
            uid: pw.pw_uid,
            gid: pw.pw_gid,
            #[cfg(not(target_os = "android"))]
            gecos: Some(lossy_string(pw.pw_gecos)),
            #[cfg(target_os = "android")]
            gecos: None,
            dir: lossy_string(pw.pw_dir),
            shell: lossy_string(pw.pw_shell),
        }
    }
}

fn group_from_raw(gr: &libc::group) -> GroupEntry {
    let mut members = Vec::new();
    if !gr.gr_mem.is_null() {
        // SAFETY: gr_mem is a null-terminated array of C strings inside the
        // live scratch buffer.
        unsafe {
            let mut cursor = gr.gr_mem;
            while !(*cursor).is_null() {
                members.push(lossy_string(*cursor));
                cursor = cursor.add(1);
            }
        }
    }
    // SAFETY: as above for the scalar string fields.
    unsafe {
        GroupEntry {
            name: lossy_string(gr.gr_name),
            passwd: lossy_string(gr.gr_passwd),
            gid: gr.gr_gid,
            members,
        }
    }
}

// A name with an interior NUL cannot exist in any C-backed directory.
fn native_name(name: &str) -> Option<std::ffi::CString> {
    to_cstring("getpwnam_r", name).ok()
}

impl UserDirectory for NativeDirectory {
    fn user_by_name(&self, name: &str) -> std::result::Result<Option<UserEntry>, OsError> {
        let Some(cname) = native_name(name) else {
            return Ok(None);
        };
        reentrant_lookup(
            "getpwnam_r",
            libc::_SC_GETPW_R_SIZE_MAX,
            // SAFETY: all pointers come from reentrant_lookup and stay valid
            // for the duration of the call.
            |pwd, buf, len, result| unsafe { libc::getpwnam_r(cname.as_ptr(), pwd, buf, len, result) },
            user_from_raw,
        )
    }

    fn user_by_id(&self, uid: u32) -> std::result::Result<Option<UserEntry>, OsError> {
        reentrant_lookup(
            "getpwuid_r",
            libc::_SC_GETPW_R_SIZE_MAX,
            // SAFETY: see user_by_name.
            |pwd, buf, len, result| unsafe { libc::getpwuid_r(uid, pwd, buf, len, result) },
            user_from_raw,
        )
    }
}

impl GroupDirectory for NativeDirectory {
    fn group_by_name(&self, name: &str) -> std::result::Result<Option<GroupEntry>, OsError> {
        let Some(cname) = native_name(name) else {
            return Ok(None);
        };
        reentrant_lookup(
            "getgrnam_r",
            libc::_SC_GETGR_R_SIZE_MAX,
            // SAFETY: see user_by_name.
            |grp, buf, len, result| unsafe { libc::getgrnam_r(cname.as_ptr(), grp, buf, len, result) },
            group_from_raw,
        )
    }

    fn group_by_id(&self, gid: u32) -> std::result::Result<Option<GroupEntry>, OsError> {
        reentrant_lookup(
            "getgrgid_r",
            libc::_SC_GETGR_R_SIZE_MAX,
            // SAFETY: see user_by_name.
            |grp, buf, len, result| unsafe { libc::getgrgid_r(gid, grp, buf, len, result) },
            group_from_raw,
        )
    }
}

// ---------------------------------------------------------------------------
// Files (/etc/passwd, /etc/group)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileFingerprint {
    len: u64,
    modified_ns: u128,
}

impl FileFingerprint {
    fn of(path: &Path) -> Option<Self> {
        let metadata = std::fs::metadata(path).ok()?;
        let modified_ns = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |duration| duration.as_nanos());
        Some(Self {
            len: metadata.len(),
            modified_ns,
        })
    }
}

/// Reload counters for one cached file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheMetrics {
    pub hits: u64,
    pub reloads: u64,
}

#[derive(Debug, Default)]
struct SnapshotState {
    content: Option<(FileFingerprint, Arc<Vec<u8>>)>,
    metrics: CacheMetrics,
}

/// Cached content of one directory file.
#[derive(Debug)]
struct FileSnapshot {
    path: PathBuf,
    state: Mutex<SnapshotState>,
}

impl FileSnapshot {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: Mutex::new(SnapshotState::default()),
        }
    }

    /// Current file content, re-read when the fingerprint changed.
    fn content(&self, call: &'static str) -> std::result::Result<Arc<Vec<u8>>, OsError> {
        let now = FileFingerprint::of(&self.path);
        let mut state = self.state.lock();

        if let (Some((cached, bytes)), Some(now)) = (&state.content, now)
            && *cached == now
        {
            let bytes = Arc::clone(bytes);
            state.metrics.hits += 1;
            return Ok(bytes);
        }

        match std::fs::read(&self.path) {
            Ok(bytes) => {
                let fingerprint = FileFingerprint::of(&self.path).or(now).unwrap_or(FileFingerprint {
                    len: bytes.len() as u64,
                    modified_ns: 0,
                });
                let bytes = Arc::new(bytes);
                state.content = Some((fingerprint, Arc::clone(&bytes)));
                state.metrics.reloads += 1;
                Ok(bytes)
            }
            Err(err) => {
                state.content = None;
                Err(OsError::from_io(call, &err))
            }
        }
    }

    fn metrics(&self) -> CacheMetrics {
        self.state.lock().metrics
    }
}

/// Lookups parsed directly from passwd and group files.
#[derive(Debug)]
pub struct FilesDirectory {
    passwd: FileSnapshot,
    group: FileSnapshot,
}

impl FilesDirectory {
    pub fn new(passwd_path: impl Into<PathBuf>, group_path: impl Into<PathBuf>) -> Self {
        Self {
            passwd: FileSnapshot::new(passwd_path.into()),
            group: FileSnapshot::new(group_path.into()),
        }
    }

    /// Files backend over the configured paths.
    #[must_use]
    pub fn from_config() -> Self {
        Self::new(config::passwd_path(), config::group_path())
    }

    #[must_use]
    pub fn passwd_path(&self) -> &Path {
        &self.passwd.path
    }

    #[must_use]
    pub fn group_path(&self) -> &Path {
        &self.group.path
    }

    #[must_use]
    pub fn passwd_metrics(&self) -> CacheMetrics {
        self.passwd.metrics()
    }

    #[must_use]
    pub fn group_metrics(&self) -> CacheMetrics {
        self.group.metrics()
    }
}

impl UserDirectory for FilesDirectory {
    fn user_by_name(&self, name: &str) -> std::result::Result<Option<UserEntry>, OsError> {
        let content = self.passwd.content("getpwnam")?;
        Ok(pwd::lookup_by_name(&content, name))
    }

    fn user_by_id(&self, uid: u32) -> std::result::Result<Option<UserEntry>, OsError> {
        let content = self.passwd.content("getpwuid")?;
        Ok(pwd::lookup_by_uid(&content, uid))
    }
}

impl GroupDirectory for FilesDirectory {
    fn group_by_name(&self, name: &str) -> std::result::Result<Option<GroupEntry>, OsError> {
        let content = self.group.content("getgrnam")?;
        Ok(grp::lookup_by_name(&content, name))
    }

    fn group_by_id(&self, gid: u32) -> std::result::Result<Option<GroupEntry>, OsError> {
        let content = self.group.content("getgrgid")?;
        Ok(grp::lookup_by_gid(&content, gid))
    }
}

// ---------------------------------------------------------------------------
// Configured backend and forwarding calls
// ---------------------------------------------------------------------------

static NATIVE: NativeDirectory = NativeDirectory;
static FILES: LazyLock<FilesDirectory> = LazyLock::new(FilesDirectory::from_config);

/// The backend selected by `POSIXBIND_DIRECTORY` (or its override).
#[must_use]
pub fn directory() -> &'static dyn Directory {
    match config::directory_backend() {
        DirectoryBackend::Native => &NATIVE,
        DirectoryBackend::Files => &*FILES,
    }
}

/// Password entry for a user name or uid.
///
/// A missing entry is [`IdentityError::NotFound`](posixbind_core::IdentityError::NotFound);
/// directory failures keep their errno.
pub fn getpwnam(ident: &IdentityRef) -> Result<UserEntry> {
    getpwnam_with(ident, directory())
}

/// [`getpwnam`] against an explicit directory.
pub fn getpwnam_with<D: UserDirectory + ?Sized>(ident: &IdentityRef, directory: &D) -> Result<UserEntry> {
    Ok(identity::lookup_user(ident, directory)?)
}

/// Group entry for a group name or gid.
pub fn getgrnam(ident: &IdentityRef) -> Result<GroupEntry> {
    getgrnam_with(ident, directory())
}

pub fn getgrnam_with<D: GroupDirectory + ?Sized>(ident: &IdentityRef, directory: &D) -> Result<GroupEntry> {
    Ok(identity::lookup_group(ident, directory)?)
}
