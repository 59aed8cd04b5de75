//! Error types for mcadmin
//!
//! Provides a unified error type for all operations. Every public operation
//! returns [`Result`], which plays the role of a command result: `Ok` is
//! success and `Err` carries the failure kind plus raw diagnostic detail.

use std::io;

use thiserror::Error;

/// Result type alias using McError
pub type Result<T> = std::result::Result<T, McError>;

/// Unified error type for mcadmin operations
#[derive(Debug, Error)]
pub enum McError {
    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Connect error ({endpoint}): {reason}")]
    Connect { endpoint: String, reason: String },

    #[error("Timeout while {during}")]
    Timeout { during: String },

    #[error("IO error: {0}")]
    Io(#[source] io::Error),

    // -------------------------------------------------------------------------
    // Reply Errors
    // -------------------------------------------------------------------------
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Unexpected reply: {0:?}")]
    UnexpectedReply(String),

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Classification of a failure, independent of its detail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ErrorKind {
    ConnectError,
    Timeout,
    IoError,
    ParseError,
    ProtocolViolation,
    UnexpectedReply,
    InvalidArgument,
    ConfigError,
}

impl McError {
    /// The kind of failure this error represents
    pub fn kind(&self) -> ErrorKind {
        match self {
            McError::Connect { .. } => ErrorKind::ConnectError,
            McError::Timeout { .. } => ErrorKind::Timeout,
            McError::Io(_) => ErrorKind::IoError,
            McError::Parse(_) => ErrorKind::ParseError,
            McError::ProtocolViolation(_) => ErrorKind::ProtocolViolation,
            McError::UnexpectedReply(_) => ErrorKind::UnexpectedReply,
            McError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            McError::Config(_) => ErrorKind::ConfigError,
        }
    }

    /// Classify an I/O error raised while `during` was in progress.
    ///
    /// Socket timeouts surface as `WouldBlock` on unix and `TimedOut` on
    /// windows; both become [`McError::Timeout`].
    pub fn from_io(err: io::Error, during: &str) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => McError::Timeout {
                during: during.to_string(),
            },
            _ => McError::Io(err),
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        McError::InvalidArgument(msg.into())
    }

    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        McError::Parse(msg.into())
    }
}

impl From<io::Error> for McError {
    fn from(err: io::Error) -> Self {
        McError::from_io(err, "performing socket I/O")
    }
}
