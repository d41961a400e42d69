//! Error types for the emitter
//!
//! Most of the conditions the translator meets are not errors at all
//! (untracked tables, deletes, bare updates). What remains is I/O on the
//! outbound channel, bad configuration, decode failures in the pgoutput
//! host, and the host driving the transaction framer out of order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error categories for metrics and alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Writing to the outbound channel failed
    Output,
    /// Replication stream could not be decoded
    Replication,
    /// A protocol line could not be parsed
    Protocol,
    /// Configuration errors (invalid options)
    Configuration,
    /// The host broke the begin/change/commit contract
    HostContract,
    /// Other/unknown errors
    Other,
}

/// Emitter errors
#[derive(Error, Debug)]
pub enum EmitError {
    /// I/O error on the outbound channel
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// pgoutput decode error
    #[cfg(feature = "postgres")]
    #[error("Decode error: {0}")]
    Decode(#[from] crate::postgres::DecodeError),

    /// Malformed protocol line
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Begin/commit/change invoked out of sequence
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl EmitError {
    /// Create a new parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Whether the stream must be abandoned after this error.
    ///
    /// Host contract violations leave the framer in a state the protocol
    /// cannot represent, so no further output is trustworthy.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidState(_) | Self::Io(_))
    }

    /// Get the error category for metrics and alerting.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Io(_) => ErrorCategory::Output,
            #[cfg(feature = "postgres")]
            Self::Decode(_) => ErrorCategory::Replication,
            Self::Parse(_) => ErrorCategory::Protocol,
            Self::Config(_) => ErrorCategory::Configuration,
            Self::InvalidState(_) => ErrorCategory::HostContract,
            Self::Other(_) => ErrorCategory::Other,
        }
    }

    /// Get a metric-safe error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io_error",
            #[cfg(feature = "postgres")]
            Self::Decode(_) => "decode_error",
            Self::Parse(_) => "parse_error",
            Self::Config(_) => "config_error",
            Self::InvalidState(_) => "invalid_state",
            Self::Other(_) => "unknown",
        }
    }
}

/// Result type for emitter operations
pub type Result<T> = std::result::Result<T, EmitError>;
