//! Common error types for all transports

use std::fmt;

/// Result type alias for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Transport-agnostic error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Bounded buffer has no room for another frame
    Full { capacity: usize },

    /// Pipe was closed by its owner
    ConnectionClosed,

    /// Pipe failed and cannot be used again (e.g. peer vanished)
    Broken(String),

    /// Timed wait elapsed without data
    Timeout,

    /// No more pipes can be opened
    Exhausted { limit: usize },

    /// Frame could not be encoded or decoded
    Codec(String),

    /// Invalid configuration
    InvalidConfig(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full { capacity } => write!(f, "Pipe full ({} frames)", capacity),
            Self::ConnectionClosed => write!(f, "Connection closed"),
            Self::Broken(reason) => write!(f, "Broken pipe: {}", reason),
            Self::Timeout => write!(f, "Operation timed out"),
            Self::Exhausted { limit } => write!(f, "Pipe limit reached ({} open)", limit),
            Self::Codec(msg) => write!(f, "Codec error: {}", msg),
            Self::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}
