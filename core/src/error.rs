//! Error types for the portpeek-core library.

use thiserror::Error;

/// Result type alias for portpeek operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving the owner of a port.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to execute a system command.
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// Failed to parse command output.
    #[error("Failed to parse output: {0}")]
    ParseError(String),

    /// The operating system socket table could not be read.
    #[error("Failed to read socket table: {0}")]
    SocketTable(String),

    /// Permission denied for an operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The process exited before it could be inspected.
    #[error("Process {0} is no longer running")]
    ProcessGone(u32),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Platform not supported.
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),
}
