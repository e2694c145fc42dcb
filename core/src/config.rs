//! Lookup configuration.
//!
//! Defaults can be overridden from a JSON file at
//! `<config dir>/portpeek/config.json` (e.g. `~/.config/portpeek/config.json`
//! on Linux). The file is optional; command-line flags take precedence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::domain::{Protocol, SocketEntry, SocketState};
use crate::error::{Error, Result};

/// Which sockets count as "owning" a port, and how much to report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupConfig {
    /// Consider UDP sockets bound to the port.
    #[serde(default = "default_true")]
    pub include_udp: bool,

    /// Consider established connections whose local side uses the port.
    #[serde(default = "default_true")]
    pub include_established: bool,

    /// Report every owning process instead of only the primary one.
    #[serde(default)]
    pub show_all: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            include_udp: true,
            include_established: true,
            show_all: false,
        }
    }
}

impl LookupConfig {
    /// Whether a socket is relevant to ownership under this configuration.
    ///
    /// Listening sockets always are; transient TCP states never are.
    pub fn accepts(&self, socket: &SocketEntry) -> bool {
        if socket.protocol == Protocol::Udp && !self.include_udp {
            return false;
        }
        match socket.state {
            SocketState::Listen | SocketState::Bound => true,
            SocketState::Established => self.include_established,
            SocketState::Other(_) => false,
        }
    }
}

/// Loads [`LookupConfig`] from disk.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a config store with the default path.
    ///
    /// Default path: `<config dir>/portpeek/config.json`
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        Ok(Self {
            config_path: config_dir.join("portpeek").join("config.json"),
        })
    }

    /// Create a config store with a custom path.
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Path of the configuration file.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from disk.
    ///
    /// Returns the default config if the file doesn't exist.
    pub async fn load(&self) -> Result<LookupConfig> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "no config file, using defaults");
            return Ok(LookupConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }
}
