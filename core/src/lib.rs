//! portpeek Core Library
//!
//! Finds the process that owns a network port and reports its PID, name,
//! executable path, command line and working directory.
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure data models (ports, sockets, processes, lookup results)
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: Operating system implementations
//! - `application`: Use case services
//!
//! # Platform Support
//! - Linux: Reads `/proc` through the `procfs` crate
//! - macOS: Uses `lsof` and `ps` commands
//! - Other platforms: lookups fail with `Error::UnsupportedPlatform`

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod error;

// Re-export domain types (primary API)
pub use domain::{
    InvalidPort, LookupResult, Port, PortOwner, ProcessInfo, Protocol, SocketEntry, SocketState,
};

// Re-export other commonly used types
pub use adapters::PortScanner;
pub use application::LookupService;
pub use config::{ConfigStore, LookupConfig};
pub use error::{Error, Result};
pub use ports::SocketScannerPort;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
