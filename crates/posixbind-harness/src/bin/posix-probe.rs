//! CLI entrypoint for posixbind probes.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use posixbind_abi::config::{self, DirectoryBackend};
use posixbind_core::{IdentityRef, LimitValue};
use posixbind_harness::probe::{self, Operation};
use posixbind_harness::structured_log::LogEmitter;

/// Run one POSIX forwarding call and print the result as JSON.
#[derive(Debug, Parser)]
#[command(name = "posix-probe")]
#[command(about = "Exercise posixbind forwarding calls against the host")]
struct Cli {
    /// Write a structured JSONL log line for the call to this file.
    #[arg(long, global = true)]
    log: Option<PathBuf>,
    /// Directory backend for user/group lookups (overrides POSIXBIND_DIRECTORY).
    #[arg(long, global = true, value_enum)]
    directory: Option<Backend>,
    /// Pretty-print the JSON report.
    #[arg(long, global = true)]
    pretty: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    Native,
    Files,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print pid, parent pid, process group and credential ids.
    Ids,
    /// Read resource limits.
    Getrlimit {
        /// Resource name (`nofile`, `core`, ...).
        #[arg(required_unless_present = "all")]
        resource: Option<String>,
        /// Read every resource available on this platform.
        #[arg(long, conflicts_with = "resource")]
        all: bool,
    },
    /// Change resource limits; an omitted side keeps its current value.
    Setrlimit {
        resource: String,
        /// New soft limit (integer or `unlimited`).
        #[arg(long)]
        soft: Option<LimitValue>,
        /// New hard limit (integer or `unlimited`).
        #[arg(long)]
        hard: Option<LimitValue>,
    },
    /// Look up a user by name or uid.
    Getpwnam { user: IdentityRef },
    /// Look up a group by name or gid.
    Getgrnam { group: IdentityRef },
    /// Print the host name.
    Hostname,
    /// Set the host name.
    Sethostname { name: String },
    /// Set the syslog priority mask; prints the previous mask.
    Setlogmask {
        /// Priorities to enable (`err`, `warning`, ...). None queries the mask.
        priorities: Vec<String>,
    },
    /// Send one message to the system logger.
    Syslog {
        message: String,
        #[arg(long, default_value = "info")]
        priority: String,
        #[arg(long, default_value = "user")]
        facility: String,
        #[arg(long)]
        ident: Option<String>,
        /// openlog options (`pid`, `cons`, `ndelay`, ...).
        #[arg(long = "option")]
        options: Vec<String>,
    },
    /// Enter `path` and make it the root directory.
    Chroot { path: String },
    /// Activate a swap area (Linux).
    Swapon {
        path: String,
        #[arg(long)]
        priority: Option<u16>,
        #[arg(long)]
        discard: bool,
    },
    /// Deactivate a swap area (Linux).
    Swapoff { path: String },
}

impl From<Command> for Operation {
    fn from(command: Command) -> Self {
        match command {
            Command::Ids => Self::Ids,
            Command::Getrlimit { resource, .. } => Self::GetRlimit { resource },
            Command::Setrlimit { resource, soft, hard } => Self::SetRlimit { resource, soft, hard },
            Command::Getpwnam { user } => Self::GetPwnam(user),
            Command::Getgrnam { group } => Self::GetGrnam(group),
            Command::Hostname => Self::Hostname,
            Command::Sethostname { name } => Self::SetHostname(name),
            Command::Setlogmask { priorities } => {
                Self::SetLogMask(priorities.into_iter().map(|p| (p, true)).collect())
            }
            Command::Syslog {
                message,
                priority,
                facility,
                ident,
                options,
            } => Self::Syslog {
                ident,
                facility,
                options,
                priority,
                message,
            },
            Command::Chroot { path } => Self::Chroot(path),
            Command::Swapon {
                path,
                priority,
                discard,
            } => Self::SwapOn {
                path,
                priority,
                discard,
            },
            Command::Swapoff { path } => Self::SwapOff(path),
        }
    }
}

fn run_id() -> String {
    format!("posix-probe-{}", std::process::id())
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(backend) = cli.directory {
        config::set_directory_backend(match backend {
            Backend::Native => DirectoryBackend::Native,
            Backend::Files => DirectoryBackend::Files,
        });
    }

    let op = Operation::from(cli.command);
    let report = match &cli.log {
        Some(path) => {
            let mut emitter = LogEmitter::to_file(path, &run_id())?;
            let report = probe::run_logged(&op, &mut emitter)?;
            emitter.flush()?;
            report
        }
        None => probe::run(&op),
    };

    let text = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{text}");

    Ok(if report.ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
