//! # posixbind-abi
//!
//! Forwarding layer between posixbind and the host C library / kernel.
//!
//! Every function here performs one OS call (or a short fixed sequence of
//! them), captures `errno` immediately after the call, and surfaces it as an
//! [`OsError`](posixbind_core::OsError) tagged with the call name. Decisions
//! that can be made without the OS, such as filling in the missing side of
//! a resource limit or turning a user name into a uid, are delegated to
//! `posixbind-core`.
//!
//! ```text
//! caller -> forwarding fn (this crate) -> core resolver -> libc -> errno capture
//! ```

#[macro_use]
mod macros;

pub mod config;
pub mod directory;
pub mod error;
pub mod fs;
pub mod hostname;
pub mod privilege;
pub mod process;
pub mod resource;
#[cfg(any(target_os = "linux", target_os = "android"))]
pub mod swap;
pub mod syslog;

mod errno_capture;
mod util;

pub use directory::{Directory, FilesDirectory, NativeDirectory, directory, getgrnam, getpwnam};
pub use error::{Error, Result};
