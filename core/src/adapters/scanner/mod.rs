//! Socket scanner adapters.
//!
//! Platform-specific implementations of socket and process inspection.

#[cfg(target_os = "macos")]
mod darwin;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod unsupported;

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
mod utils;

use crate::domain::{Port, ProcessInfo, SocketEntry};
use crate::error::Result;
use crate::ports::SocketScannerPort;

/// The main socket scanner that uses platform-specific implementations.
pub struct PortScanner {
    #[cfg(target_os = "macos")]
    inner: darwin::DarwinScanner,

    #[cfg(target_os = "linux")]
    inner: linux::LinuxScanner,

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    inner: unsupported::UnsupportedScanner,
}

impl PortScanner {
    /// Create a new scanner for the current platform.
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "macos")]
            inner: darwin::DarwinScanner::new(),

            #[cfg(target_os = "linux")]
            inner: linux::LinuxScanner::new(),

            #[cfg(not(any(target_os = "linux", target_os = "macos")))]
            inner: unsupported::UnsupportedScanner::new(),
        }
    }
}

impl Default for PortScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl SocketScannerPort for PortScanner {
    async fn sockets_on_port(&self, port: Port) -> Result<Vec<SocketEntry>> {
        self.inner.sockets_on_port(port).await
    }

    async fn inspect_process(&self, pid: u32) -> Result<ProcessInfo> {
        self.inner.inspect_process(pid).await
    }
}

/// Internal trait for platform-specific implementations.
trait Scanner: Send + Sync {
    fn sockets_on_port(
        &self,
        port: Port,
    ) -> impl std::future::Future<Output = Result<Vec<SocketEntry>>> + Send;

    fn inspect_process(
        &self,
        pid: u32,
    ) -> impl std::future::Future<Output = Result<ProcessInfo>> + Send;
}
