//! Socket table entries as reported by the operating system.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use super::Port;

/// Transport protocol of a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
        }
    }
}

/// Connection state of a socket, reduced to what matters for ownership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SocketState {
    /// TCP socket accepting connections.
    Listen,
    /// UDP socket bound to the port without a peer.
    Bound,
    /// Connected TCP or UDP socket.
    Established,
    /// Any other TCP state (TIME_WAIT, CLOSE_WAIT, ...).
    Other(String),
}

impl SocketState {
    /// Ordering key used to pick the primary owner; lower is preferred.
    ///
    /// `None` for states that never identify an owner.
    pub fn rank(&self) -> Option<u8> {
        match self {
            SocketState::Listen => Some(0),
            SocketState::Bound => Some(1),
            SocketState::Established => Some(2),
            SocketState::Other(_) => None,
        }
    }

    /// Upper-case label in the style of netstat/lsof.
    pub fn label(&self) -> &str {
        match self {
            SocketState::Listen => "LISTEN",
            SocketState::Bound => "BOUND",
            SocketState::Established => "ESTABLISHED",
            SocketState::Other(name) => name,
        }
    }
}

impl fmt::Display for SocketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One socket whose local port matches the requested port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketEntry {
    pub protocol: Protocol,
    /// Local address the socket is bound to (unspecified for wildcard binds).
    pub local_address: IpAddr,
    pub port: Port,
    pub state: SocketState,
    /// Kernel inode of the socket, where the platform exposes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inode: Option<u64>,
    /// Owning process, if it could be determined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
}

impl SocketEntry {
    /// Human-readable local address; wildcard binds render as `*`.
    pub fn display_address(&self) -> String {
        if self.local_address.is_unspecified() {
            "*".to_string()
        } else {
            self.local_address.to_string()
        }
    }
}
