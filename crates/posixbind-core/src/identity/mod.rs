//! User and group identity resolution.
//!
//! A privilege call may name its target either by numeric id or by name.
//! Names are resolved through a directory (the passwd/group databases);
//! numeric ids are used as given. A name that does not exist and a
//! directory that cannot be read are reported as different errors.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::errno::OsError;

/// A reference to a user or group: a numeric id, or a name to look up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityRef {
    Id(u32),
    Name(String),
}

impl IdentityRef {
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }
}

impl From<u32> for IdentityRef {
    fn from(id: u32) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for IdentityRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for IdentityRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Textual references that are entirely ASCII digits (and fit in a `u32`)
/// are ids; everything else is a name.
impl FromStr for IdentityRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_empty()
            && s.bytes().all(|b| b.is_ascii_digit())
            && let Ok(id) = s.parse::<u32>()
        {
            return Ok(Self::Id(id));
        }
        Ok(Self::Name(s.to_string()))
    }
}

impl fmt::Display for IdentityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// A passwd database entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserEntry {
    pub name: String,
    pub passwd: String,
    pub uid: u32,
    pub gid: u32,
    /// GECOS field; `None` on platforms whose `struct passwd` lacks it.
    pub gecos: Option<String>,
    pub dir: String,
    pub shell: String,
}

/// A group database entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupEntry {
    pub name: String,
    pub passwd: String,
    pub gid: u32,
    pub members: Vec<String>,
}

/// Lookups against the user database.
///
/// `Ok(None)` means the directory answered and has no such entry.
pub trait UserDirectory {
    fn user_by_name(&self, name: &str) -> Result<Option<UserEntry>, OsError>;
    fn user_by_id(&self, uid: u32) -> Result<Option<UserEntry>, OsError>;
}

/// Lookups against the group database.
pub trait GroupDirectory {
    fn group_by_name(&self, name: &str) -> Result<Option<GroupEntry>, OsError>;
    fn group_by_id(&self, gid: u32) -> Result<Option<GroupEntry>, OsError>;
}

impl<D: UserDirectory + ?Sized> UserDirectory for &D {
    fn user_by_name(&self, name: &str) -> Result<Option<UserEntry>, OsError> {
        (**self).user_by_name(name)
    }

    fn user_by_id(&self, uid: u32) -> Result<Option<UserEntry>, OsError> {
        (**self).user_by_id(uid)
    }
}

impl<D: GroupDirectory + ?Sized> GroupDirectory for &D {
    fn group_by_name(&self, name: &str) -> Result<Option<GroupEntry>, OsError> {
        (**self).group_by_name(name)
    }

    fn group_by_id(&self, gid: u32) -> Result<Option<GroupEntry>, OsError> {
        (**self).group_by_id(gid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    User,
    Group,
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Group => "group",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The directory answered, but has no entry for the reference.
    #[error("{kind} id does not exist: {ident}")]
    NotFound { kind: IdentityKind, ident: IdentityRef },
    /// The directory itself failed.
    #[error(transparent)]
    LookupFailed(#[from] OsError),
}

impl IdentityError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

fn found<T>(
    result: Result<Option<T>, OsError>,
    kind: IdentityKind,
    ident: &IdentityRef,
) -> Result<T, IdentityError> {
    result?.ok_or_else(|| IdentityError::NotFound {
        kind,
        ident: ident.clone(),
    })
}

/// Resolve a user reference to a uid.
///
/// Numeric ids are returned without consulting the directory and without
/// checking that they exist.
pub fn resolve_user<D>(ident: &IdentityRef, directory: &D) -> Result<u32, IdentityError>
where
    D: UserDirectory + ?Sized,
{
    match ident {
        IdentityRef::Id(uid) => Ok(*uid),
        IdentityRef::Name(name) => {
            found(directory.user_by_name(name), IdentityKind::User, ident).map(|entry| entry.uid)
        }
    }
}

/// Resolve a group reference to a gid.
pub fn resolve_group<D>(ident: &IdentityRef, directory: &D) -> Result<u32, IdentityError>
where
    D: GroupDirectory + ?Sized,
{
    match ident {
        IdentityRef::Id(gid) => Ok(*gid),
        IdentityRef::Name(name) => {
            found(directory.group_by_name(name), IdentityKind::Group, ident).map(|entry| entry.gid)
        }
    }
}

/// Fetch the full user entry for either kind of reference.
pub fn lookup_user<D>(ident: &IdentityRef, directory: &D) -> Result<UserEntry, IdentityError>
where
    D: UserDirectory + ?Sized,
{
    let result = match ident {
        IdentityRef::Id(uid) => directory.user_by_id(*uid),
        IdentityRef::Name(name) => directory.user_by_name(name),
    };
    found(result, IdentityKind::User, ident)
}

/// Fetch the full group entry for either kind of reference.
pub fn lookup_group<D>(ident: &IdentityRef, directory: &D) -> Result<GroupEntry, IdentityError>
where
    D: GroupDirectory + ?Sized,
{
    let result = match ident {
        IdentityRef::Id(gid) => directory.group_by_id(*gid),
        IdentityRef::Name(name) => directory.group_by_name(name),
    };
    found(result, IdentityKind::Group, ident)
}
