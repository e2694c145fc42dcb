//! macOS socket scanner implementation using lsof and ps.
//!
//! Without root, lsof only lists the caller's own sockets. netstat lists
//! every socket without owners, so sockets it reports that lsof could not
//! attribute come back with `pid: None`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::{Port, ProcessInfo, Protocol, SocketEntry, SocketState};
use crate::error::{Error, Result};

use super::utils::Utils;
use super::Scanner;

/// macOS-specific socket scanner using lsof.
pub struct DarwinScanner;

impl DarwinScanner {
    /// Create a new macOS scanner.
    pub fn new() -> Self {
        Self
    }

    /// Run a command and return its stdout, or `None` if it exited non-zero.
    ///
    /// lsof and ps both exit 1 when nothing matched.
    async fn run(program: &str, args: &[&str]) -> Result<Option<String>> {
        let output = Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::CommandFailed(format!("Failed to run {}: {}", program, e)))?;

        if !output.status.success() {
            debug!(program, status = ?output.status.code(), "command reported no match");
            return Ok(None);
        }

        String::from_utf8(output.stdout)
            .map(Some)
            .map_err(|e| Error::ParseError(format!("Invalid UTF-8 in {} output: {}", program, e)))
    }

    /// Parse lsof output into sockets whose local port is `port`.
    ///
    /// `lsof -i :PORT` also lists connections whose remote end is `PORT`;
    /// those are dropped.
    fn parse_lsof_output(&self, output: &str, port: Port) -> Vec<SocketEntry> {
        let mut sockets = Vec::new();
        let mut seen: HashSet<(u32, String)> = HashSet::new();

        for line in output.lines().skip(1) {
            if line.is_empty() {
                continue;
            }

            let components: Vec<&str> = line.split_whitespace().collect();
            if components.len() < 9 {
                continue;
            }

            let pid: u32 = match components[1].parse() {
                Ok(p) => p,
                Err(_) => continue,
            };

            let ipv6 = components.iter().any(|c| *c == "IPv6");

            let Some(proto_idx) = components.iter().position(|c| *c == "TCP" || *c == "UDP")
            else {
                continue;
            };
            let protocol = if components[proto_idx] == "TCP" {
                Protocol::Tcp
            } else {
                Protocol::Udp
            };

            let Some(name) = components.get(proto_idx + 1) else {
                continue;
            };
            let (local, has_peer) = match name.split_once("->") {
                Some((local, _)) => (local, true),
                None => (*name, false),
            };

            let (local_address, local_port) = match Utils::parse_address(local, ipv6) {
                Some((a, p)) => (a, p),
                None => continue,
            };
            if local_port != port.get() {
                continue;
            }

            let state = match components.get(proto_idx + 2) {
                Some(raw) => lsof_state(raw.trim_matches(|c| c == '(' || c == ')')),
                None if protocol == Protocol::Udp && has_peer => SocketState::Established,
                None if protocol == Protocol::Udp => SocketState::Bound,
                None => continue,
            };

            // Deduplicate by (pid, name)
            if !seen.insert((pid, name.to_string())) {
                continue;
            }

            sockets.push(SocketEntry {
                protocol,
                local_address,
                port,
                state,
                inode: None,
                pid: Some(pid),
            });
        }

        sockets
    }

    /// Parse `netstat -an -p tcp|udp` output into owner-less sockets on `port`.
    fn parse_netstat_output(&self, output: &str, port: Port) -> Vec<SocketEntry> {
        let mut sockets = Vec::new();

        for line in output.lines() {
            let components: Vec<&str> = line.split_whitespace().collect();
            if components.len() < 5 {
                continue;
            }

            let proto = components[0];
            let protocol = if proto.starts_with("tcp") {
                Protocol::Tcp
            } else if proto.starts_with("udp") {
                Protocol::Udp
            } else {
                continue;
            };
            let ipv6 = proto.ends_with('6');

            let (local_address, local_port) =
                match Utils::parse_netstat_address(components[3], ipv6) {
                    Some((a, p)) => (a, p),
                    None => continue,
                };
            if local_port != port.get() {
                continue;
            }

            let state = match protocol {
                Protocol::Tcp => match components.get(5) {
                    Some(raw) => lsof_state(raw),
                    None => continue,
                },
                Protocol::Udp if components[4] == "*.*" => SocketState::Bound,
                Protocol::Udp => SocketState::Established,
            };

            sockets.push(SocketEntry {
                protocol,
                local_address,
                port,
                state,
                inode: None,
                pid: None,
            });
        }

        sockets
    }

    /// Every TCP and UDP socket on `port`, owners unknown.
    ///
    /// netstat problems only cost the hidden-owner check, so they are logged
    /// rather than returned.
    async fn socket_table(&self, port: Port) -> Vec<SocketEntry> {
        let mut sockets = Vec::new();
        for proto in ["tcp", "udp"] {
            match Self::run("/usr/sbin/netstat", &["-an", "-p", proto]).await {
                Ok(Some(output)) => sockets.extend(self.parse_netstat_output(&output, port)),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "netstat unavailable; hidden owners go undetected"),
            }
        }
        sockets
    }
}

/// Add an owner-less entry for each (protocol, state) that the socket table
/// shows but no attributed socket covers.
fn add_unattributed(sockets: &mut Vec<SocketEntry>, table: Vec<SocketEntry>) {
    let mut covered: HashSet<(Protocol, SocketState)> = sockets
        .iter()
        .map(|s| (s.protocol, s.state.clone()))
        .collect();

    for entry in table {
        if covered.insert((entry.protocol, entry.state.clone())) {
            debug!(protocol = %entry.protocol, state = %entry.state, "socket without visible owner");
            sockets.push(entry);
        }
    }
}

impl Default for DarwinScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for DarwinScanner {
    async fn sockets_on_port(&self, port: Port) -> Result<Vec<SocketEntry>> {
        let selector = format!(":{}", port);
        let stdout = Self::run("/usr/sbin/lsof", &["-nP", "+c", "0", "-i", &selector])
            .await?
            .unwrap_or_default();

        let mut sockets = self.parse_lsof_output(&stdout, port);
        add_unattributed(&mut sockets, self.socket_table(port).await);
        Ok(sockets)
    }

    async fn inspect_process(&self, pid: u32) -> Result<ProcessInfo> {
        let pid_arg = pid.to_string();

        // On macOS `comm` is the full executable path.
        let comm = Self::run("/bin/ps", &["-p", &pid_arg, "-o", "comm="])
            .await?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(Error::ProcessGone(pid))?;

        let command = Self::run("/bin/ps", &["-p", &pid_arg, "-o", "command="])
            .await?
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        let cwd = Self::run("/usr/sbin/lsof", &["-a", "-p", &pid_arg, "-d", "cwd", "-Fn"])
            .await?
            .and_then(|s| parse_lsof_cwd(&s));

        let name = Path::new(&comm)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| comm.clone());
        let path = comm.starts_with('/').then(|| PathBuf::from(&comm));
        let command = if command.is_empty() {
            format!("[{}]", name)
        } else {
            command
        };

        Ok(ProcessInfo {
            pid,
            name,
            path,
            command,
            cwd,
            start_time: None,
        })
    }
}

fn lsof_state(raw: &str) -> SocketState {
    match raw {
        "LISTEN" => SocketState::Listen,
        "ESTABLISHED" => SocketState::Established,
        other => SocketState::Other(other.to_string()),
    }
}

/// Extract the path from `lsof -Fn` output (`p<pid>`, `f<fd>`, `n<path>` lines).
fn parse_lsof_cwd(output: &str) -> Option<PathBuf> {
    output
        .lines()
        .find_map(|line| line.strip_prefix('n'))
        .map(PathBuf::from)
}
