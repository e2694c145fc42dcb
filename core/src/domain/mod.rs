//! Domain layer - Pure data models for port lookups.
//!
//! These types have no I/O dependencies and can be tested in isolation.

mod port;
mod process;
mod socket;

// Re-export all domain types
pub use port::{InvalidPort, Port};
pub use process::{LookupResult, PortOwner, ProcessInfo};
pub use socket::{Protocol, SocketEntry, SocketState};
