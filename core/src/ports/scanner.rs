//! Socket scanner port (interface).

use crate::domain::{Port, ProcessInfo, SocketEntry};
use crate::error::Result;

/// Port for inspecting the operating system's socket and process tables.
///
/// This trait defines the interface the lookup service relies on.
/// Implementations handle platform-specific details (procfs, lsof, ps, etc.)
pub trait SocketScannerPort: Send + Sync {
    /// List every TCP/UDP socket whose local port is `port`, in any state.
    ///
    /// Owners that cannot be determined are reported with `pid: None` rather
    /// than dropped, so callers can tell "nothing there" from "not allowed to
    /// see who".
    fn sockets_on_port(
        &self,
        port: Port,
    ) -> impl std::future::Future<Output = Result<Vec<SocketEntry>>> + Send;

    /// Read name, executable path, command line and working directory of `pid`.
    ///
    /// Returns `Error::ProcessGone` if the process no longer exists.
    fn inspect_process(
        &self,
        pid: u32,
    ) -> impl std::future::Future<Output = Result<ProcessInfo>> + Send;
}
