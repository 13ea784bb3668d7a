//! Errors returned by the forwarding calls.

use posixbind_core::{IdentityError, OsError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The OS call failed; carries the captured errno.
    #[error(transparent)]
    Os(#[from] OsError),
    /// A user or group reference could not be turned into an id.
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error("{call}: unknown resource name: {name}")]
    UnknownResource { call: &'static str, name: String },
    /// Rejected before any OS call was made.
    #[error("{call}: invalid argument: {reason}")]
    InvalidArgument {
        call: &'static str,
        reason: &'static str,
    },
}

impl Error {
    /// The errno value behind this error, if one was captured.
    #[must_use]
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Os(err) | Self::Identity(IdentityError::LookupFailed(err)) => Some(err.code()),
            Self::Identity(IdentityError::NotFound { .. })
            | Self::UnknownResource { .. }
            | Self::InvalidArgument { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use posixbind_core::IdentityRef;
    use posixbind_core::errno::{EPERM, ERANGE};
    use posixbind_core::identity::IdentityKind;

    #[test]
    fn os_errors_keep_their_code() {
        let err = Error::from(OsError::new("setrlimit", EPERM));
        assert_eq!(err.errno(), Some(EPERM));
        assert!(err.to_string().starts_with("setrlimit: EPERM"));
    }

    #[test]
    fn lookup_failures_expose_errno() {
        let err = Error::from(IdentityError::LookupFailed(OsError::new("getpwnam_r", ERANGE)));
        assert_eq!(err.errno(), Some(ERANGE));
    }

    #[test]
    fn not_found_has_no_errno() {
        let err = Error::from(IdentityError::NotFound {
            kind: IdentityKind::Group,
            ident: IdentityRef::name("dummyzzz1234"),
        });
        assert_eq!(err.errno(), None);
        assert_eq!(err.to_string(), "group id does not exist: dummyzzz1234");
    }

    #[test]
    fn unknown_resource_message() {
        let err = Error::UnknownResource {
            call: "getrlimit",
            name: "bogus".into(),
        };
        assert_eq!(err.to_string(), "getrlimit: unknown resource name: bogus");
    }
}
