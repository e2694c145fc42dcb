//! Process details and lookup outcomes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{InvalidPort, Port, SocketEntry};

/// Details of a process that owns a socket.
///
/// Built fresh from live OS state for each lookup and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    /// Process ID.
    pub pid: u32,
    /// Short process name (e.g. `node`).
    pub name: String,
    /// Absolute path of the executable, when readable.
    pub path: Option<PathBuf>,
    /// Full command line, arguments joined by single spaces.
    pub command: String,
    /// Current working directory, when readable.
    pub cwd: Option<PathBuf>,
    /// Start time in platform clock ticks; only used for ordering.
    #[serde(skip)]
    pub start_time: Option<u64>,
}

impl ProcessInfo {
    /// Join raw argv into a display command, falling back to `[name]` for
    /// processes without a command line (kernel threads, zombies).
    pub fn command_from_args<S: AsRef<str>>(args: &[S], name: &str) -> String {
        let joined = args
            .iter()
            .map(AsRef::as_ref)
            .filter(|a| !a.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            format!("[{}]", name)
        } else {
            joined
        }
    }
}

/// A process together with the socket it holds on the requested port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortOwner {
    pub process: ProcessInfo,
    pub socket: SocketEntry,
}

/// Outcome of a single `portpeek` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LookupResult {
    /// At least one process owns the port; the primary owner comes first.
    Found { port: Port, owners: Vec<PortOwner> },
    /// Nothing is listening on (or connected through) the port.
    NotFound { port: Port },
    /// The argument was rejected before any OS query.
    InvalidPort { reason: InvalidPort },
}

impl LookupResult {
    /// The owner that should be reported when only one is shown.
    pub fn primary(&self) -> Option<&PortOwner> {
        match self {
            LookupResult::Found { owners, .. } => owners.first(),
            _ => None,
        }
    }
}
