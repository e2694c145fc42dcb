//! Port lookup application service.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::LookupConfig;
use crate::domain::{LookupResult, Port, PortOwner, SocketEntry};
use crate::error::{Error, Result};
use crate::ports::SocketScannerPort;

/// Application service answering "which process owns this port?".
///
/// This service uses the `SocketScannerPort` trait for the actual OS queries,
/// allowing different implementations to be injected.
pub struct LookupService<S: SocketScannerPort> {
    scanner: S,
    config: LookupConfig,
}

impl<S: SocketScannerPort> LookupService<S> {
    /// Create a new lookup service with the given scanner and configuration.
    pub fn new(scanner: S, config: LookupConfig) -> Self {
        Self { scanner, config }
    }

    /// The configuration this service filters with.
    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Resolve the processes owning `port`.
    ///
    /// Owners are ordered listening-first, then by process start time, then
    /// by PID. Sockets whose owner is hidden from us are an error, not a
    /// `NotFound`: the port is in use, we just may not say by whom.
    pub async fn lookup(&self, port: Port) -> Result<LookupResult> {
        let sockets = self.scanner.sockets_on_port(port).await?;
        debug!(%port, total = sockets.len(), "sockets on port");

        let candidates: Vec<SocketEntry> = sockets
            .into_iter()
            .filter(|s| self.config.accepts(s))
            .collect();

        if candidates.is_empty() {
            info!(%port, "no owning socket");
            return Ok(LookupResult::NotFound { port });
        }

        if let Some(hidden) = hidden_outranking(&candidates) {
            return Err(Error::PermissionDenied(format!(
                "port {} has a {} {} socket whose owning process could not be inspected; \
                 try again with elevated privileges (e.g. sudo)",
                port, hidden.protocol, hidden.state
            )));
        }

        let best = best_socket_per_pid(&candidates);

        let mut owners = Vec::with_capacity(best.len());
        for socket in best.into_values() {
            let Some(pid) = socket.pid else { continue };
            match self.scanner.inspect_process(pid).await {
                Ok(process) => owners.push(PortOwner { process, socket }),
                Err(Error::ProcessGone(pid)) => debug!(pid, "owner exited before inspection"),
                Err(e) => return Err(e),
            }
        }

        if owners.is_empty() {
            return Ok(LookupResult::NotFound { port });
        }

        owners.sort_by(compare_owners);
        info!(%port, owners = owners.len(), primary = owners[0].process.pid, "resolved port");
        Ok(LookupResult::Found { port, owners })
    }
}

/// The best-ranked owner-less socket, if no visible socket ranks as well.
///
/// A hidden listener must not be answered with whoever holds a connection
/// to it.
fn hidden_outranking(sockets: &[SocketEntry]) -> Option<&SocketEntry> {
    let best = |pid_known: bool| {
        sockets
            .iter()
            .filter(|s| s.pid.is_some() == pid_known)
            .min_by_key(|s| s.state.rank())
    };

    let hidden = best(false)?;
    match best(true) {
        Some(visible) if visible.state.rank() <= hidden.state.rank() => None,
        _ => Some(hidden),
    }
}

/// Keep one socket per owning PID: the best-ranked one.
///
/// Sockets without a known owner are dropped.
fn best_socket_per_pid(sockets: &[SocketEntry]) -> HashMap<u32, SocketEntry> {
    let mut best: HashMap<u32, SocketEntry> = HashMap::new();
    for socket in sockets {
        let Some(pid) = socket.pid else { continue };
        match best.get(&pid) {
            Some(current) if current.state.rank() <= socket.state.rank() => {}
            _ => {
                best.insert(pid, socket.clone());
            }
        }
    }
    best
}

fn compare_owners(a: &PortOwner, b: &PortOwner) -> Ordering {
    a.socket
        .state
        .rank()
        .cmp(&b.socket.state.rank())
        .then_with(|| match (a.process.start_time, b.process.start_time) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.process.pid.cmp(&b.process.pid))
}
