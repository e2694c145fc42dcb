//! Linux socket scanner implementation using procfs.
//!
//! Sockets come from `/proc/net/{tcp,tcp6,udp,udp6}`; ownership is resolved by
//! matching socket inodes against the `/proc/<pid>/fd` links of every process.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;

use procfs::net::{TcpNetEntry, TcpState, UdpNetEntry, UdpState};
use procfs::process::{FDTarget, Process};
use procfs::ProcError;
use tracing::{debug, warn};

use crate::domain::{Port, ProcessInfo, Protocol, SocketEntry, SocketState};
use crate::error::{Error, Result};

use super::Scanner;

/// Linux-specific socket scanner.
pub struct LinuxScanner;

/// A socket table row before ownership has been resolved.
struct RawSocket {
    protocol: Protocol,
    local_address: SocketAddr,
    state: SocketState,
    inode: u64,
}

impl LinuxScanner {
    pub fn new() -> Self {
        Self
    }

    /// Read every TCP and UDP socket table, IPv4 and IPv6.
    ///
    /// A missing table (e.g. IPv6 disabled) counts as empty.
    fn read_socket_tables() -> Result<Vec<RawSocket>> {
        let mut sockets = Vec::new();

        for (table, entries) in [("tcp", procfs::net::tcp()), ("tcp6", procfs::net::tcp6())] {
            match entries {
                Ok(entries) => sockets.extend(entries.iter().map(Self::from_tcp)),
                Err(ProcError::NotFound(_)) => debug!(table, "socket table not present"),
                Err(e) => return Err(map_proc_error(e, table)),
            }
        }

        for (table, entries) in [("udp", procfs::net::udp()), ("udp6", procfs::net::udp6())] {
            match entries {
                Ok(entries) => sockets.extend(entries.iter().map(Self::from_udp)),
                Err(ProcError::NotFound(_)) => debug!(table, "socket table not present"),
                Err(e) => return Err(map_proc_error(e, table)),
            }
        }

        Ok(sockets)
    }

    fn from_tcp(entry: &TcpNetEntry) -> RawSocket {
        RawSocket {
            protocol: Protocol::Tcp,
            local_address: entry.local_address,
            state: tcp_state(&entry.state),
            inode: entry.inode,
        }
    }

    fn from_udp(entry: &UdpNetEntry) -> RawSocket {
        let state = match entry.state {
            UdpState::Established => SocketState::Established,
            _ => SocketState::Bound,
        };
        RawSocket {
            protocol: Protocol::Udp,
            local_address: entry.local_address,
            state,
            inode: entry.inode,
        }
    }

    /// Map socket inodes to every PID holding them.
    ///
    /// A socket can be shared by several processes (pre-fork servers, forked
    /// children), so the whole process table is walked. Processes whose fd
    /// directory cannot be read are skipped; the caller sees their sockets
    /// as unowned.
    fn owners_of(inodes: &HashSet<u64>) -> Result<HashMap<u64, Vec<u32>>> {
        let mut owners: HashMap<u64, Vec<u32>> = HashMap::new();
        if inodes.is_empty() {
            return Ok(owners);
        }

        let processes =
            procfs::process::all_processes().map_err(|e| map_proc_error(e, "process list"))?;

        let mut denied = 0usize;
        for process in processes.flatten() {
            let fds = match process.fd() {
                Ok(fds) => fds,
                Err(ProcError::PermissionDenied(_)) => {
                    denied += 1;
                    continue;
                }
                Err(_) => continue,
            };

            let pid = process.pid() as u32;
            for fd in fds.flatten() {
                if let FDTarget::Socket(inode) = fd.target {
                    if inodes.contains(&inode) {
                        let holders = owners.entry(inode).or_default();
                        // The same socket may sit on several fds of one process.
                        if !holders.contains(&pid) {
                            holders.push(pid);
                        }
                    }
                }
            }
        }

        debug!(
            wanted = inodes.len(),
            resolved = owners.len(),
            denied,
            "resolved socket owners"
        );
        Ok(owners)
    }

    fn scan_blocking(port: Port) -> Result<Vec<SocketEntry>> {
        let matching: Vec<RawSocket> = Self::read_socket_tables()?
            .into_iter()
            .filter(|s| s.local_address.port() == port.get())
            .collect();

        // TIME_WAIT and friends report inode 0; they have no owner to find.
        let inodes: HashSet<u64> = matching
            .iter()
            .map(|s| s.inode)
            .filter(|&inode| inode != 0)
            .collect();
        let owners = Self::owners_of(&inodes)?;

        Ok(attach_owners(matching, &owners, port))
    }

    fn inspect_blocking(pid: u32) -> Result<ProcessInfo> {
        let process = Process::new(pid as i32).map_err(|e| match e {
            ProcError::NotFound(_) => Error::ProcessGone(pid),
            other => map_proc_error(other, "process"),
        })?;

        let stat = process.stat().map_err(|e| match e {
            ProcError::NotFound(_) => Error::ProcessGone(pid),
            other => map_proc_error(other, "process stat"),
        })?;

        let path = process
            .exe()
            .inspect_err(|e| debug!(pid, error = %e, "executable path unavailable"))
            .ok();
        let cwd = process
            .cwd()
            .inspect_err(|e| debug!(pid, error = %e, "working directory unavailable"))
            .ok();
        let args = process.cmdline().unwrap_or_else(|e| {
            warn!(pid, error = %e, "command line unavailable");
            Vec::new()
        });

        Ok(ProcessInfo {
            pid,
            command: ProcessInfo::command_from_args(&args, &stat.comm),
            name: stat.comm,
            path,
            cwd,
            start_time: Some(stat.starttime),
        })
    }
}

impl Default for LinuxScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for LinuxScanner {
    async fn sockets_on_port(&self, port: Port) -> Result<Vec<SocketEntry>> {
        tokio::task::spawn_blocking(move || Self::scan_blocking(port))
            .await
            .map_err(|e| Error::SocketTable(format!("scan task failed: {}", e)))?
    }

    async fn inspect_process(&self, pid: u32) -> Result<ProcessInfo> {
        tokio::task::spawn_blocking(move || Self::inspect_blocking(pid))
            .await
            .map_err(|e| Error::SocketTable(format!("inspect task failed: {}", e)))?
    }
}

/// One entry per (socket, holder); sockets nobody visibly holds keep `pid: None`.
fn attach_owners(
    sockets: Vec<RawSocket>,
    owners: &HashMap<u64, Vec<u32>>,
    port: Port,
) -> Vec<SocketEntry> {
    let mut entries = Vec::with_capacity(sockets.len());
    for s in sockets {
        let entry = SocketEntry {
            protocol: s.protocol,
            local_address: s.local_address.ip(),
            port,
            state: s.state,
            inode: Some(s.inode),
            pid: None,
        };
        match owners.get(&s.inode) {
            Some(pids) => entries.extend(pids.iter().map(|&pid| SocketEntry {
                pid: Some(pid),
                ..entry.clone()
            })),
            None => entries.push(entry),
        }
    }
    entries
}

fn tcp_state(state: &TcpState) -> SocketState {
    match state {
        TcpState::Listen => SocketState::Listen,
        TcpState::Established => SocketState::Established,
        TcpState::SynSent => SocketState::Other("SYN_SENT".to_string()),
        TcpState::SynRecv => SocketState::Other("SYN_RECV".to_string()),
        TcpState::FinWait1 => SocketState::Other("FIN_WAIT_1".to_string()),
        TcpState::FinWait2 => SocketState::Other("FIN_WAIT_2".to_string()),
        TcpState::TimeWait => SocketState::Other("TIME_WAIT".to_string()),
        TcpState::Close => SocketState::Other("CLOSED".to_string()),
        TcpState::CloseWait => SocketState::Other("CLOSE_WAIT".to_string()),
        TcpState::LastAck => SocketState::Other("LAST_ACK".to_string()),
        TcpState::Closing => SocketState::Other("CLOSING".to_string()),
        other => SocketState::Other(format!("{:?}", other).to_uppercase()),
    }
}

fn map_proc_error(error: ProcError, what: &str) -> Error {
    match error {
        ProcError::PermissionDenied(_) => {
            Error::PermissionDenied(format!("cannot read {}: {}", what, error))
        }
        other => Error::SocketTable(format!("cannot read {}: {}", what, other)),
    }
}
