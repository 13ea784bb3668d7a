//! One-shot execution of forwarding calls with JSON reports.
//!
//! [`run`] performs a single [`Operation`] and describes the result as a
//! [`ProbeReport`]; [`run_logged`] does the same and writes one structured
//! log line per call.

use std::collections::BTreeMap;
use std::time::Instant;

use posixbind_abi::{hostname, privilege, process, resource, syslog};
use posixbind_core::syslog::{Facility, LogMask, LogOptions, Priority, UnknownConstant};
use posixbind_core::{IdentityRef, LimitRequest, LimitValue, OsError};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};

/// A forwarding call and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Process, group and credential ids of the probe itself.
    Ids,
    /// Limits for one resource, or for every resource when `None`.
    GetRlimit { resource: Option<String> },
    SetRlimit {
        resource: String,
        soft: Option<LimitValue>,
        hard: Option<LimitValue>,
    },
    GetPwnam(IdentityRef),
    GetGrnam(IdentityRef),
    Hostname,
    SetHostname(String),
    /// Priority name -> enabled. An empty list queries the current mask.
    SetLogMask(Vec<(String, bool)>),
    Syslog {
        ident: Option<String>,
        facility: String,
        options: Vec<String>,
        priority: String,
        message: String,
    },
    Chroot(String),
    SwapOn {
        path: String,
        priority: Option<u16>,
        discard: bool,
    },
    SwapOff(String),
}

impl Operation {
    /// Name of the forwarding call this operation performs.
    #[must_use]
    pub const fn call(&self) -> &'static str {
        match self {
            Self::Ids => "ids",
            Self::GetRlimit { .. } => "getrlimit",
            Self::SetRlimit { .. } => "setrlimit",
            Self::GetPwnam(_) => "getpwnam",
            Self::GetGrnam(_) => "getgrnam",
            Self::Hostname => "gethostname",
            Self::SetHostname(_) => "sethostname",
            Self::SetLogMask(_) => "setlogmask",
            Self::Syslog { .. } => "syslog",
            Self::Chroot(_) => "chroot",
            Self::SwapOn { .. } => "swapon",
            Self::SwapOff(_) => "swapoff",
        }
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Call(#[from] posixbind_abi::Error),
    #[error(transparent)]
    Os(#[from] OsError),
    #[error(transparent)]
    Constant(#[from] UnknownConstant),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{0} is only available on Linux")]
    Unsupported(&'static str),
}

impl ProbeError {
    /// The errno behind the failure, when an OS call produced one.
    #[must_use]
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Call(err) => err.errno(),
            Self::Os(err) => Some(err.code()),
            Self::Constant(_) | Self::Json(_) | Self::Unsupported(_) => None,
        }
    }
}

/// Result of one probe, as printed by `posix-probe`.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub call: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errno: Option<i32>,
    #[serde(skip)]
    pub latency_ns: u64,
}

impl ProbeReport {
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        match (self.ok, self.errno) {
            (true, _) => Outcome::Ok,
            (false, Some(_)) => Outcome::Error,
            (false, None) => Outcome::Rejected,
        }
    }
}

fn ids() -> Result<Value, ProbeError> {
    Ok(json!({
        "pid": process::getpid(),
        "ppid": process::getppid(),
        "pgrp": process::getpgrp()?,
        "uid": privilege::getuid(),
        "euid": privilege::geteuid(),
        "gid": privilege::getgid(),
        "egid": privilege::getegid(),
    }))
}

fn limits(name: Option<&str>) -> Result<Value, ProbeError> {
    match name {
        Some(name) => Ok(serde_json::to_value(resource::getrlimit_by_name(name)?)?),
        None => {
            let mut all = BTreeMap::new();
            for &kind in posixbind_core::ResourceKind::all() {
                all.insert(kind.name(), resource::getrlimit(kind)?);
            }
            Ok(serde_json::to_value(all)?)
        }
    }
}

fn log_mask(flags: &[(String, bool)]) -> Result<Value, ProbeError> {
    let mask = LogMask::from_flags(flags.iter().map(|(name, on)| (name.as_str(), *on)))?;
    let previous = syslog::setlogmask(mask);
    Ok(json!({ "previous": previous, "requested": mask }))
}

fn write_syslog(
    ident: Option<&str>,
    facility: &str,
    options: &[String],
    priority: &str,
    message: &str,
) -> Result<Value, ProbeError> {
    let facility = Facility::from_name(facility)?;
    let options = LogOptions::from_flags(options.iter().map(|name| (name.as_str(), true)))?;
    let priority = Priority::from_name(priority)?;

    syslog::openlog(ident, options, facility);
    let ident_used = syslog::current_ident();
    let written = syslog::syslog(priority, message);
    syslog::closelog();
    written?;
    Ok(json!({ "ident": ident_used, "facility": facility, "priority": priority }))
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn swap_on(path: &str, priority: Option<u16>, discard: bool) -> Result<Value, ProbeError> {
    use posixbind_core::swap::SwapFlags;

    posixbind_abi::swap::swapon(path, SwapFlags { priority, discard })?;
    Ok(json!({ "path": path }))
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn swap_off(path: &str) -> Result<Value, ProbeError> {
    posixbind_abi::swap::swapoff(path)?;
    Ok(json!({ "path": path }))
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn swap_on(_path: &str, _priority: Option<u16>, _discard: bool) -> Result<Value, ProbeError> {
    Err(ProbeError::Unsupported("swapon"))
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn swap_off(_path: &str) -> Result<Value, ProbeError> {
    Err(ProbeError::Unsupported("swapoff"))
}

fn execute(op: &Operation) -> Result<Value, ProbeError> {
    match op {
        Operation::Ids => ids(),
        Operation::GetRlimit { resource } => limits(resource.as_deref()),
        Operation::SetRlimit { resource, soft, hard } => {
            let request = LimitRequest::new((*soft).into(), (*hard).into());
            let installed = resource::setrlimit_by_name(resource, request)?;
            Ok(serde_json::to_value(installed)?)
        }
        Operation::GetPwnam(ident) => Ok(serde_json::to_value(posixbind_abi::getpwnam(ident)?)?),
        Operation::GetGrnam(ident) => Ok(serde_json::to_value(posixbind_abi::getgrnam(ident)?)?),
        Operation::Hostname => Ok(json!(hostname::gethostname()?)),
        Operation::SetHostname(name) => {
            hostname::sethostname(name)?;
            Ok(json!(name))
        }
        Operation::SetLogMask(flags) => log_mask(flags),
        Operation::Syslog {
            ident,
            facility,
            options,
            priority,
            message,
        } => write_syslog(ident.as_deref(), facility, options, priority, message),
        Operation::Chroot(path) => {
            posixbind_abi::fs::chroot(path)?;
            Ok(json!(path))
        }
        Operation::SwapOn {
            path,
            priority,
            discard,
        } => swap_on(path, *priority, *discard),
        Operation::SwapOff(path) => swap_off(path),
    }
}

/// Perform `op` and describe the outcome.
#[must_use]
pub fn run(op: &Operation) -> ProbeReport {
    let started = Instant::now();
    let result = execute(op);
    let latency_ns = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);
    match result {
        Ok(value) => ProbeReport {
            call: op.call(),
            ok: true,
            value: Some(value),
            error: None,
            errno: None,
            latency_ns,
        },
        Err(err) => ProbeReport {
            call: op.call(),
            ok: false,
            value: None,
            error: Some(err.to_string()),
            errno: err.errno(),
            latency_ns,
        },
    }
}

/// [`run`], plus one structured log line describing the call.
pub fn run_logged(op: &Operation, emitter: &mut LogEmitter) -> std::io::Result<ProbeReport> {
    let report = run(op);
    let level = match report.outcome() {
        Outcome::Ok => LogLevel::Info,
        Outcome::Error | Outcome::Rejected => LogLevel::Warn,
    };
    let trace_id = emitter.next_trace_id();
    let mut entry = LogEntry::new(trace_id, level, "forwarding_call")
        .with_call(report.call)
        .with_outcome(report.outcome())
        .with_latency_ns(report.latency_ns);
    if let Some(errno) = report.errno {
        entry = entry.with_errno(errno);
    }
    if let Some(error) = &report.error {
        entry = entry.with_details(json!({ "error": error }));
    }
    emitter.emit_entry(entry)?;
    Ok(report)
}
