//! Syslog constant tables and mask arithmetic.
//!
//! Callers name priorities, facilities and `openlog` options by string
//! (`"err"`, `"local0"`, `"pid"`). This module maps those names to typed
//! values; the ABI crate maps the typed values to the C library constants.
//! Priority codes are the same on every platform (0..=7), so masks are
//! computed here.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Longest identification string kept for `openlog`, in bytes.
pub const MAX_SYSLOG_IDENT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid syslog constant value: {0}")]
pub struct UnknownConstant(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Emerg = 0,
    Alert = 1,
    Crit = 2,
    Err = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl Priority {
    const ALL: [Priority; 8] = [
        Self::Emerg,
        Self::Alert,
        Self::Crit,
        Self::Err,
        Self::Warning,
        Self::Notice,
        Self::Info,
        Self::Debug,
    ];

    #[must_use]
    pub const fn all() -> &'static [Priority] {
        &Self::ALL
    }

    pub fn from_name(name: &str) -> Result<Self, UnknownConstant> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| UnknownConstant(name.to_string()))
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Emerg => "emerg",
            Self::Alert => "alert",
            Self::Crit => "crit",
            Self::Err => "err",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    /// Numeric priority code (`LOG_EMERG` .. `LOG_DEBUG`).
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// `LOG_MASK(priority)`.
    #[must_use]
    pub const fn mask(self) -> i32 {
        1 << (self as i32)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Facility {
    Auth,
    Authpriv,
    Cron,
    Daemon,
    Ftp,
    Kern,
    Lpr,
    Mail,
    News,
    Syslog,
    User,
    Uucp,
    Local0,
    Local1,
    Local2,
    Local3,
    Local4,
    Local5,
    Local6,
    Local7,
}

impl Facility {
    const ALL: [Facility; 20] = [
        Self::Auth,
        Self::Authpriv,
        Self::Cron,
        Self::Daemon,
        Self::Ftp,
        Self::Kern,
        Self::Lpr,
        Self::Mail,
        Self::News,
        Self::Syslog,
        Self::User,
        Self::Uucp,
        Self::Local0,
        Self::Local1,
        Self::Local2,
        Self::Local3,
        Self::Local4,
        Self::Local5,
        Self::Local6,
        Self::Local7,
    ];

    #[must_use]
    pub const fn all() -> &'static [Facility] {
        &Self::ALL
    }

    pub fn from_name(name: &str) -> Result<Self, UnknownConstant> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| UnknownConstant(name.to_string()))
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Authpriv => "authpriv",
            Self::Cron => "cron",
            Self::Daemon => "daemon",
            Self::Ftp => "ftp",
            Self::Kern => "kern",
            Self::Lpr => "lpr",
            Self::Mail => "mail",
            Self::News => "news",
            Self::Syslog => "syslog",
            Self::User => "user",
            Self::Uucp => "uucp",
            Self::Local0 => "local0",
            Self::Local1 => "local1",
            Self::Local2 => "local2",
            Self::Local3 => "local3",
            Self::Local4 => "local4",
            Self::Local5 => "local5",
            Self::Local6 => "local6",
            Self::Local7 => "local7",
        }
    }
}

/// `openlog` option flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOption {
    Pid,
    Cons,
    Ndelay,
    Odelay,
    Nowait,
}

impl LogOption {
    const ALL: [LogOption; 5] = [
        Self::Pid,
        Self::Cons,
        Self::Ndelay,
        Self::Odelay,
        Self::Nowait,
    ];

    #[must_use]
    pub const fn all() -> &'static [LogOption] {
        &Self::ALL
    }

    pub fn from_name(name: &str) -> Result<Self, UnknownConstant> {
        Self::ALL
            .into_iter()
            .find(|o| o.name() == name)
            .ok_or_else(|| UnknownConstant(name.to_string()))
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pid => "pid",
            Self::Cons => "cons",
            Self::Ndelay => "ndelay",
            Self::Odelay => "odelay",
            Self::Nowait => "nowait",
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// A set of `openlog` options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LogOptions(u8);

impl LogOptions {
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build from a `name -> enabled` map. Every name is checked, including
    /// the ones mapped to `false`.
    pub fn from_flags<'a, I>(flags: I) -> Result<Self, UnknownConstant>
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let mut set = Self::empty();
        for (name, enabled) in flags {
            let option = LogOption::from_name(name)?;
            if enabled {
                set = set.with(option);
            }
        }
        Ok(set)
    }

    #[must_use]
    pub const fn with(self, option: LogOption) -> Self {
        Self(self.0 | option.bit())
    }

    #[must_use]
    pub const fn contains(self, option: LogOption) -> bool {
        self.0 & option.bit() != 0
    }

    pub fn iter(self) -> impl Iterator<Item = LogOption> {
        LogOption::ALL.into_iter().filter(move |o| self.contains(*o))
    }
}

/// The set of priorities `syslog` lets through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LogMask(i32);

impl LogMask {
    /// The empty mask. Passing it to `setlogmask` queries the current mask
    /// without changing it.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn all() -> Self {
        Self(0xff)
    }

    /// `LOG_UPTO(priority)`: every priority at least as severe.
    #[must_use]
    pub const fn up_to(priority: Priority) -> Self {
        Self((1 << (priority as i32 + 1)) - 1)
    }

    #[must_use]
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn with(self, priority: Priority) -> Self {
        Self(self.0 | priority.mask())
    }

    #[must_use]
    pub const fn contains(self, priority: Priority) -> bool {
        self.0 & priority.mask() != 0
    }

    /// Build from a `priority name -> enabled` map.
    pub fn from_flags<'a, I>(flags: I) -> Result<Self, UnknownConstant>
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let mut mask = Self::empty();
        for (name, enabled) in flags {
            let priority = Priority::from_name(name)?;
            if enabled {
                mask = mask.with(priority);
            }
        }
        Ok(mask)
    }

    /// Every priority name mapped to whether the mask lets it through.
    #[must_use]
    pub fn to_flags(self) -> BTreeMap<&'static str, bool> {
        Priority::ALL
            .into_iter()
            .map(|p| (p.name(), self.contains(p)))
            .collect()
    }
}

impl Serialize for LogMask {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_flags().serialize(serializer)
    }
}

/// The bytes of `ident` that are kept for `openlog`: everything before the
/// first NUL, capped at [`MAX_SYSLOG_IDENT`] bytes without splitting a
/// UTF-8 sequence.
#[must_use]
pub fn ident_prefix(ident: &str) -> &str {
    let ident = ident.split('\0').next().unwrap_or_default();
    if ident.len() <= MAX_SYSLOG_IDENT {
        return ident;
    }
    let mut end = MAX_SYSLOG_IDENT;
    while !ident.is_char_boundary(end) {
        end -= 1;
    }
    &ident[..end]
}
