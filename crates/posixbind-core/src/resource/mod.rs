//! Resource limits: name table, value model and partial-request resolution.
//!
//! Implements the pure-logic half of `getrlimit`/`setrlimit`. Reading and
//! installing limits is done by the ABI crate; this module only decides
//! which pair should be installed.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::errno::OsError;

/// A resource whose limits can be read and set.
///
/// The set is platform dependent: `Nproc` and `As` only exist where the
/// C library defines `RLIMIT_NPROC` / `RLIMIT_AS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Core,
    Cpu,
    Data,
    Fsize,
    Nofile,
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
    Nproc,
    Stack,
    #[cfg(any(
        target_os = "linux",
        target_os = "android",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd",
        target_os = "dragonfly"
    ))]
    As,
}

const ALL_KINDS: &[ResourceKind] = &[
    ResourceKind::Core,
    ResourceKind::Cpu,
    ResourceKind::Data,
    ResourceKind::Fsize,
    ResourceKind::Nofile,
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
    ResourceKind::Nproc,
    ResourceKind::Stack,
    #[cfg(any(
        target_os = "linux",
        target_os = "android",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd",
        target_os = "dragonfly"
    ))]
    ResourceKind::As,
];

static BY_NAME: LazyLock<HashMap<&'static str, ResourceKind>> =
    LazyLock::new(|| ALL_KINDS.iter().map(|&kind| (kind.name(), kind)).collect());

impl ResourceKind {
    /// Every resource available on this platform, in table order.
    #[must_use]
    pub fn all() -> &'static [ResourceKind] {
        ALL_KINDS
    }

    /// Look up a resource by its short name (`"nofile"`, `"core"`, ...).
    ///
    /// Names are case-sensitive. Returns `None` for unknown names and for
    /// names that exist on other platforms only.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        BY_NAME.get(name).copied()
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Cpu => "cpu",
            Self::Data => "data",
            Self::Fsize => "fsize",
            Self::Nofile => "nofile",
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
            Self::Nproc => "nproc",
            Self::Stack => "stack",
            #[cfg(any(
                target_os = "linux",
                target_os = "android",
                target_os = "freebsd",
                target_os = "openbsd",
                target_os = "netbsd",
                target_os = "dragonfly"
            ))]
            Self::As => "as",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One side of a resource limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitValue {
    Finite(u64),
    /// No limit enforced (`RLIM_INFINITY`).
    Unbounded,
}

impl LimitValue {
    /// Decode a raw `rlim_t`, treating `infinity` as [`LimitValue::Unbounded`].
    #[must_use]
    pub const fn from_raw(raw: u64, infinity: u64) -> Self {
        if raw == infinity {
            Self::Unbounded
        } else {
            Self::Finite(raw)
        }
    }

    /// Encode as a raw `rlim_t`.
    ///
    /// A finite value equal to `infinity` encodes identically to
    /// `Unbounded`; the kernel cannot tell them apart either.
    #[must_use]
    pub const fn to_raw(self, infinity: u64) -> u64 {
        match self {
            Self::Finite(v) => v,
            Self::Unbounded => infinity,
        }
    }

    #[must_use]
    pub const fn finite(self) -> Option<u64> {
        match self {
            Self::Finite(v) => Some(v),
            Self::Unbounded => None,
        }
    }
}

impl fmt::Display for LimitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(v) => write!(f, "{v}"),
            Self::Unbounded => f.write_str("unlimited"),
        }
    }
}

/// Unbounded serializes as `null`, finite values as numbers.
impl Serialize for LimitValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Finite(v) => serializer.serialize_u64(*v),
            Self::Unbounded => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid limit value '{0}': expected an integer or 'unlimited'")]
pub struct ParseLimitError(pub String);

impl FromStr for LimitValue {
    type Err = ParseLimitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "unlimited" | "infinity" | "unbounded" => Ok(Self::Unbounded),
            _ if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) => trimmed
                .parse::<u64>()
                .map(Self::Finite)
                .map_err(|_| ParseLimitError(s.to_string())),
            _ => Err(ParseLimitError(s.to_string())),
        }
    }
}

/// A resource's (soft, hard) bound, fully specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LimitPair {
    /// Currently enforced limit.
    pub soft: LimitValue,
    /// Ceiling the soft limit may be raised to.
    pub hard: LimitValue,
}

impl LimitPair {
    #[must_use]
    pub const fn new(soft: LimitValue, hard: LimitValue) -> Self {
        Self { soft, hard }
    }
}

/// One side of a limit request.
///
/// `Unchanged` means the caller expressed no opinion and the current value
/// is kept; it is distinct from an explicit request for `Unbounded`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LimitSetting {
    #[default]
    Unchanged,
    Unbounded,
    Value(u64),
}

impl LimitSetting {
    /// The explicit value, or `None` when the side was left unspecified.
    #[must_use]
    pub const fn explicit(self) -> Option<LimitValue> {
        match self {
            Self::Unchanged => None,
            Self::Unbounded => Some(LimitValue::Unbounded),
            Self::Value(v) => Some(LimitValue::Finite(v)),
        }
    }
}

impl From<LimitValue> for LimitSetting {
    fn from(value: LimitValue) -> Self {
        match value {
            LimitValue::Finite(v) => Self::Value(v),
            LimitValue::Unbounded => Self::Unbounded,
        }
    }
}

impl From<Option<LimitValue>> for LimitSetting {
    fn from(value: Option<LimitValue>) -> Self {
        value.map_or(Self::Unchanged, Self::from)
    }
}

/// A partially specified limit update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LimitRequest {
    pub soft: LimitSetting,
    pub hard: LimitSetting,
}

impl LimitRequest {
    #[must_use]
    pub const fn new(soft: LimitSetting, hard: LimitSetting) -> Self {
        Self { soft, hard }
    }

    /// Request that changes only the soft limit.
    #[must_use]
    pub const fn soft(value: LimitSetting) -> Self {
        Self::new(value, LimitSetting::Unchanged)
    }

    /// Request that changes only the hard limit.
    #[must_use]
    pub const fn hard(value: LimitSetting) -> Self {
        Self::new(LimitSetting::Unchanged, value)
    }

    /// True when neither side needs the current kernel value.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        !matches!(self.soft, LimitSetting::Unchanged) && !matches!(self.hard, LimitSetting::Unchanged)
    }
}

/// Resolve `request` into a full pair for `kind`.
///
/// When both sides are explicit the pair is returned as-is and
/// `current_reader` is never called. Otherwise it is called exactly once
/// and its values fill the unspecified sides. Reader errors propagate
/// unchanged. Ordering between soft and hard is not checked here; the
/// install call decides whether it accepts the pair.
pub fn resolve_limit<F>(
    kind: ResourceKind,
    request: LimitRequest,
    current_reader: F,
) -> Result<LimitPair, OsError>
where
    F: FnOnce(ResourceKind) -> Result<LimitPair, OsError>,
{
    if let (Some(soft), Some(hard)) = (request.soft.explicit(), request.hard.explicit()) {
        return Ok(LimitPair::new(soft, hard));
    }

    let current = current_reader(kind)?;
    Ok(LimitPair::new(
        request.soft.explicit().unwrap_or(current.soft),
        request.hard.explicit().unwrap_or(current.hard),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errno::EPERM;

    const INF: u64 = u64::MAX;

    fn never_called(_: ResourceKind) -> Result<LimitPair, OsError> {
        panic!("current_reader must not be invoked for a complete request");
    }

    fn reader(soft: LimitValue, hard: LimitValue) -> impl FnOnce(ResourceKind) -> Result<LimitPair, OsError> {
        move |_| Ok(LimitPair::new(soft, hard))
    }

    #[test]
    fn name_table_round_trips() {
        for &kind in ResourceKind::all() {
            assert_eq!(ResourceKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(ResourceKind::from_name("foobar"), None);
        assert_eq!(ResourceKind::from_name(""), None);
        assert_eq!(ResourceKind::from_name("NOFILE"), None);
    }

    #[test]
    fn portable_names_always_present() {
        for name in ["core", "cpu", "data", "fsize", "nofile", "stack"] {
            assert!(ResourceKind::from_name(name).is_some(), "{name}");
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn linux_has_nproc_and_as() {
        assert_eq!(ResourceKind::from_name("nproc"), Some(ResourceKind::Nproc));
        assert_eq!(ResourceKind::from_name("as"), Some(ResourceKind::As));
        assert_eq!(ResourceKind::all().len(), 8);
    }

    #[test]
    fn raw_infinity_decodes_as_unbounded() {
        assert_eq!(LimitValue::from_raw(INF, INF), LimitValue::Unbounded);
        assert_eq!(LimitValue::from_raw(1024, INF), LimitValue::Finite(1024));
        assert_eq!(LimitValue::Unbounded.to_raw(INF), INF);
        assert_eq!(LimitValue::Finite(0).to_raw(INF), 0);
    }

    #[test]
    fn parse_limit_values() {
        assert_eq!("500".parse::<LimitValue>(), Ok(LimitValue::Finite(500)));
        assert_eq!("unlimited".parse::<LimitValue>(), Ok(LimitValue::Unbounded));
        assert_eq!("Infinity".parse::<LimitValue>(), Ok(LimitValue::Unbounded));
        assert!("-1".parse::<LimitValue>().is_err());
        assert!("lots".parse::<LimitValue>().is_err());
        assert!("+5".parse::<LimitValue>().is_err());
        assert!("null".parse::<LimitValue>().is_err());
        assert!("".parse::<LimitValue>().is_err());
        assert!("18446744073709551616".parse::<LimitValue>().is_err());
    }

    #[test]
    fn serializes_unbounded_as_null() {
        let pair = LimitPair::new(LimitValue::Finite(1024), LimitValue::Unbounded);
        let json = serde_json::to_value(pair).unwrap();
        assert_eq!(json["soft"], 1024);
        assert!(json["hard"].is_null());
    }

    #[test]
    fn complete_request_skips_reader() {
        for &kind in ResourceKind::all() {
            let request = LimitRequest::new(LimitSetting::Value(10), LimitSetting::Value(20));
            let pair = resolve_limit(kind, request, never_called).unwrap();
            assert_eq!(pair, LimitPair::new(LimitValue::Finite(10), LimitValue::Finite(20)));
        }
    }

    #[test]
    fn complete_unbounded_request_skips_reader() {
        let request = LimitRequest::new(LimitSetting::Unbounded, LimitSetting::Unbounded);
        let pair = resolve_limit(ResourceKind::Core, request, never_called).unwrap();
        assert_eq!(pair, LimitPair::new(LimitValue::Unbounded, LimitValue::Unbounded));
    }

    #[test]
    fn absent_soft_takes_current_soft() {
        let request = LimitRequest::hard(LimitSetting::Value(300));
        let pair = resolve_limit(
            ResourceKind::Nofile,
            request,
            reader(LimitValue::Finite(100), LimitValue::Finite(200)),
        )
        .unwrap();
        assert_eq!(pair, LimitPair::new(LimitValue::Finite(100), LimitValue::Finite(300)));
    }

    #[test]
    fn absent_hard_takes_current_hard() {
        let request = LimitRequest::soft(LimitSetting::Value(500));
        let pair = resolve_limit(
            ResourceKind::Nofile,
            request,
            reader(LimitValue::Finite(1024), LimitValue::Finite(4096)),
        )
        .unwrap();
        assert_eq!(pair, LimitPair::new(LimitValue::Finite(500), LimitValue::Finite(4096)));
    }

    #[test]
    fn both_absent_returns_current_unchanged() {
        let pair = resolve_limit(
            ResourceKind::Stack,
            LimitRequest::default(),
            reader(LimitValue::Finite(8_388_608), LimitValue::Unbounded),
        )
        .unwrap();
        assert_eq!(pair, LimitPair::new(LimitValue::Finite(8_388_608), LimitValue::Unbounded));
    }

    #[test]
    fn explicit_unbounded_is_not_substituted() {
        let request = LimitRequest::soft(LimitSetting::Unbounded);
        let pair = resolve_limit(
            ResourceKind::Core,
            request,
            reader(LimitValue::Finite(100), LimitValue::Finite(200)),
        )
        .unwrap();
        assert_eq!(pair, LimitPair::new(LimitValue::Unbounded, LimitValue::Finite(200)));
    }

    #[test]
    fn reader_is_called_once_with_requested_kind() {
        let mut calls = Vec::new();
        let pair = resolve_limit(ResourceKind::Cpu, LimitRequest::default(), |kind| {
            calls.push(kind);
            Ok(LimitPair::new(LimitValue::Finite(1), LimitValue::Finite(2)))
        })
        .unwrap();
        assert_eq!(calls, vec![ResourceKind::Cpu]);
        assert_eq!(pair.soft, LimitValue::Finite(1));
    }

    #[test]
    fn reader_error_propagates_unchanged() {
        let err = OsError::new("getrlimit", EPERM);
        let requests = [
            LimitRequest::default(),
            LimitRequest::soft(LimitSetting::Value(1)),
            LimitRequest::hard(LimitSetting::Unbounded),
        ];
        for request in requests {
            let got = resolve_limit(ResourceKind::Data, request, |_| Err(err)).unwrap_err();
            assert_eq!(got, err);
        }
    }

    #[test]
    fn inverted_pair_passes_through() {
        let request = LimitRequest::new(LimitSetting::Value(900), LimitSetting::Value(100));
        let pair = resolve_limit(ResourceKind::Fsize, request, never_called).unwrap();
        assert_eq!(pair, LimitPair::new(LimitValue::Finite(900), LimitValue::Finite(100)));
    }

    #[test]
    fn setting_conversions() {
        assert_eq!(LimitSetting::from(None), LimitSetting::Unchanged);
        assert_eq!(LimitSetting::from(Some(LimitValue::Unbounded)), LimitSetting::Unbounded);
        assert_eq!(LimitSetting::from(LimitValue::Finite(7)), LimitSetting::Value(7));
        assert!(!LimitRequest::soft(LimitSetting::Value(1)).is_complete());
        assert!(LimitRequest::new(LimitSetting::Unbounded, LimitSetting::Value(1)).is_complete());
    }
}
