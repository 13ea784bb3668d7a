//! Runtime configuration.
//!
//! The directory backend is chosen with the `POSIXBIND_DIRECTORY`
//! environment variable:
//! - `native` (default): user/group lookups go through the C library's
//!   reentrant `getpwnam_r` family, so every configured NSS source applies.
//! - `files`: lookups parse the passwd and group files directly. The paths
//!   default to `/etc/passwd` and `/etc/group` and can be overridden with
//!   `POSIXBIND_PASSWD_PATH` and `POSIXBIND_GROUP_PATH`.
//!
//! The variable is read once and cached; [`set_directory_backend`] replaces
//! the cached value.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};

pub const DIRECTORY_ENV: &str = "POSIXBIND_DIRECTORY";
pub const PASSWD_PATH_ENV: &str = "POSIXBIND_PASSWD_PATH";
pub const GROUP_PATH_ENV: &str = "POSIXBIND_GROUP_PATH";

pub const DEFAULT_PASSWD_PATH: &str = "/etc/passwd";
pub const DEFAULT_GROUP_PATH: &str = "/etc/group";

/// Where user and group lookups are answered from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryBackend {
    #[default]
    Native,
    Files,
}

impl DirectoryBackend {
    /// Parse from string (case-insensitive). Unknown values select the default.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "files" | "file" | "etc" => Self::Files,
            _ => Self::Native,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Files => "files",
        }
    }
}

// 0 = unresolved, otherwise one of the backend tags below.
static CACHED_BACKEND: AtomicU8 = AtomicU8::new(BACKEND_UNRESOLVED);

const BACKEND_UNRESOLVED: u8 = 0;
const BACKEND_NATIVE: u8 = 1;
const BACKEND_FILES: u8 = 2;

fn backend_to_u8(backend: DirectoryBackend) -> u8 {
    match backend {
        DirectoryBackend::Native => BACKEND_NATIVE,
        DirectoryBackend::Files => BACKEND_FILES,
    }
}

fn u8_to_backend(v: u8) -> DirectoryBackend {
    match v {
        BACKEND_FILES => DirectoryBackend::Files,
        _ => DirectoryBackend::Native,
    }
}

/// The configured directory backend (reads the environment on first call).
#[must_use]
pub fn directory_backend() -> DirectoryBackend {
    let cached = CACHED_BACKEND.load(Ordering::Acquire);
    if cached != BACKEND_UNRESOLVED {
        return u8_to_backend(cached);
    }

    let backend = std::env::var(DIRECTORY_ENV)
        .map(|v| DirectoryBackend::from_str_loose(&v))
        .unwrap_or_default();
    // A concurrent set_directory_backend wins over the environment.
    match CACHED_BACKEND.compare_exchange(
        BACKEND_UNRESOLVED,
        backend_to_u8(backend),
        Ordering::AcqRel,
        Ordering::Acquire,
    ) {
        Ok(_) => backend,
        Err(current) => u8_to_backend(current),
    }
}

/// Override the directory backend for the rest of the process.
pub fn set_directory_backend(backend: DirectoryBackend) {
    CACHED_BACKEND.store(backend_to_u8(backend), Ordering::Release);
}

fn path_from_env(var: &str, default: &str) -> PathBuf {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map_or_else(|| PathBuf::from(default), PathBuf::from)
}

/// Passwd file used by the files backend.
#[must_use]
pub fn passwd_path() -> PathBuf {
    path_from_env(PASSWD_PATH_ENV, DEFAULT_PASSWD_PATH)
}

/// Group file used by the files backend.
#[must_use]
pub fn group_path() -> PathBuf {
    path_from_env(GROUP_PATH_ENV, DEFAULT_GROUP_PATH)
}
