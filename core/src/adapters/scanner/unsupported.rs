//! Fallback scanner for platforms without a socket inspection backend.

use crate::domain::{Port, ProcessInfo, SocketEntry};
use crate::error::{Error, Result};

use super::Scanner;

pub struct UnsupportedScanner;

impl UnsupportedScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnsupportedScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for UnsupportedScanner {
    async fn sockets_on_port(&self, _port: Port) -> Result<Vec<SocketEntry>> {
        Err(Error::UnsupportedPlatform(format!(
            "port lookup is not implemented for {}",
            std::env::consts::OS
        )))
    }

    async fn inspect_process(&self, _pid: u32) -> Result<ProcessInfo> {
        Err(Error::UnsupportedPlatform(format!(
            "process inspection is not implemented for {}",
            std::env::consts::OS
        )))
    }
}
