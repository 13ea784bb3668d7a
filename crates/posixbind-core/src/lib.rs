//! # posixbind-core
//!
//! Safe Rust logic behind the posixbind forwarding layer.
//!
//! This crate holds everything that can be decided without touching the
//! operating system: resolving partial resource-limit requests, resolving
//! user/group references to numeric ids, parsing directory files, and the
//! name tables for syslog and swap constants. No `unsafe` code is permitted
//! at the crate level; the OS calls themselves live in `posixbind-abi`.

#![deny(unsafe_code)]

pub mod errno;
pub mod grp;
pub mod identity;
pub mod pwd;
pub mod resource;
pub mod swap;
pub mod syslog;

pub use errno::OsError;
pub use identity::{GroupEntry, IdentityError, IdentityRef, UserEntry};
pub use resource::{LimitPair, LimitRequest, LimitSetting, LimitValue, ResourceKind};
