//! Port number domain model and argument validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// InvalidPort
// ============================================================================

/// Why a port argument was rejected.
///
/// Every variant renders with an `Invalid port` prefix so callers can print it
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "input", rename_all = "camelCase")]
pub enum InvalidPort {
    /// The argument was empty.
    #[error("Invalid port: no port number given (expected {min}-{max})", min = Port::MIN, max = Port::MAX)]
    Empty,

    /// The argument is not an integer.
    #[error("Invalid port: '{0}' is not a number (expected {min}-{max})", min = Port::MIN, max = Port::MAX)]
    NotANumber(String),

    /// The argument is an integer outside 1-65535.
    #[error("Invalid port: {0} is out of range (expected {min}-{max})", min = Port::MIN, max = Port::MAX)]
    OutOfRange(String),
}

// ============================================================================
// Port
// ============================================================================

/// A validated TCP/UDP port number in `1..=65535`.
///
/// Port 0 is never representable, so any `Port` value is safe to hand to the
/// socket scanners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Lowest valid port.
    pub const MIN: u16 = 1;
    /// Highest valid port.
    pub const MAX: u16 = u16::MAX;

    /// Create a port from a raw number, rejecting 0.
    pub fn new(value: u16) -> Result<Self, InvalidPort> {
        if value < Self::MIN {
            return Err(InvalidPort::OutOfRange(value.to_string()));
        }
        Ok(Self(value))
    }

    /// Parse a command-line argument into a port.
    ///
    /// Only ASCII digits are accepted (leading zeros allowed). A leading `-`
    /// followed by digits is classified as out of range rather than as
    /// garbage, so `-5` and `99999` produce the same kind of message.
    pub fn parse(input: &str) -> Result<Self, InvalidPort> {
        if input.is_empty() {
            return Err(InvalidPort::Empty);
        }

        let digits = input.strip_prefix('-').unwrap_or(input);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidPort::NotANumber(input.to_string()));
        }

        if input.starts_with('-') {
            // Negative zero is still zero.
            return Err(InvalidPort::OutOfRange(input.to_string()));
        }

        // Anything that overflows u16 is out of range, however long it is.
        match digits.parse::<u16>() {
            Ok(value) => Self::new(value).map_err(|_| InvalidPort::OutOfRange(input.to_string())),
            Err(_) => Err(InvalidPort::OutOfRange(input.to_string())),
        }
    }

    /// The raw port number.
    pub fn get(self) -> u16 {
        self.0
    }
}

impl FromStr for Port {
    type Err = InvalidPort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<u16> for Port {
    type Error = InvalidPort;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_ports() {
        assert_eq!(Port::parse("1").unwrap().get(), 1);
        assert_eq!(Port::parse("8080").unwrap().get(), 8080);
        assert_eq!(Port::parse("65535").unwrap().get(), 65535);
        assert_eq!(Port::parse("080").unwrap().get(), 80);
    }

    #[test]
    fn test_boundaries_rejected() {
        assert!(matches!(Port::parse("0"), Err(InvalidPort::OutOfRange(_))));
        assert!(matches!(Port::parse("65536"), Err(InvalidPort::OutOfRange(_))));
        assert!(matches!(Port::parse("99999"), Err(InvalidPort::OutOfRange(_))));
        assert!(matches!(
            Port::parse("123456789012345678901234567890"),
            Err(InvalidPort::OutOfRange(_))
        ));
    }

    #[test]
    fn test_negative_is_out_of_range() {
        assert!(matches!(Port::parse("-1"), Err(InvalidPort::OutOfRange(_))));
        assert!(matches!(Port::parse("-0"), Err(InvalidPort::OutOfRange(_))));
    }

    #[test]
    fn test_garbage_is_not_a_number() {
        for input in ["abc", "80a", " 80", "80 ", "+80", "8.0", "-", "0x50", "--help"] {
            assert!(
                matches!(Port::parse(input), Err(InvalidPort::NotANumber(_))),
                "{input:?} should be rejected as not a number"
            );
        }
        assert_eq!(Port::parse(""), Err(InvalidPort::Empty));
    }

    #[test]
    fn test_error_messages_mention_invalid_port() {
        for input in ["", "abc", "0", "99999", "-3"] {
            let err = Port::parse(input).unwrap_err();
            assert!(err.to_string().contains("Invalid port"), "{err}");
        }
        assert_eq!(
            Port::parse("99999").unwrap_err().to_string(),
            "Invalid port: 99999 is out of range (expected 1-65535)"
        );
    }

    #[test]
    fn test_serde_rejects_zero() {
        let port: Port = serde_json::from_str("443").unwrap();
        assert_eq!(port.get(), 443);
        assert_eq!(serde_json::to_string(&port).unwrap(), "443");
        assert!(serde_json::from_str::<Port>("0").is_err());
    }
}
