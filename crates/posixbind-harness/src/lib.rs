//! Tooling around the posixbind forwarding layer.
//!
//! This crate provides:
//! - `posix-probe`: a CLI that runs one forwarding call and prints a JSON report
//! - Structured JSONL logging for every call the probe makes
//! - Log validation for collected probe runs

#![forbid(unsafe_code)]

pub mod probe;
pub mod structured_log;

pub use probe::{Operation, ProbeReport, run, run_logged};
pub use structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};
