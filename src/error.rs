//! Error types for randwalk
//!
//! The taxonomy follows the three ways a run can fail:
//! - **Configuration**: malformed launch parameters, caught before any walker or
//!   coordinator logic runs
//! - **Transport**: a walker cannot deliver its completion message, or the
//!   coordinator cannot receive one
//! - **Protocol**: the coordinator saw a message that breaks the exactly-once
//!   contract (unknown sender, duplicate report)
//!
//! Library code returns these typed errors at the core seams. Application code
//! wraps them in `anyhow`; `main` handles `ConfigError` before anything runs.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for a random walk simulation
#[derive(Error, Debug)]
pub enum WalkError {
    /// Launch parameter errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Message delivery errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Exactly-once contract violations seen by the coordinator
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Launch parameter errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Wrong number of positional launch parameters
    #[error("expected {expected} launch parameters (<domain_bound> <max_steps>), got {got}")]
    ParameterCount { expected: usize, got: usize },

    /// A parameter could not be parsed as a positive integer
    #[error("invalid {name} '{value}': expected a positive integer")]
    InvalidValue { name: &'static str, value: String },

    /// A parameter parsed but is out of range
    #[error("{name} must be {constraint}, got {value}")]
    OutOfRange {
        name: &'static str,
        constraint: &'static str,
        value: u64,
    },

    /// A required setting is missing for the selected mode
    #[error("{0} is required in this mode")]
    Missing(&'static str),

    /// Failed to read a TOML configuration file
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a TOML configuration file
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    /// Whether this error is a usage error (wrong parameter shape on the command line)
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            ConfigError::ParameterCount { .. }
                | ConfigError::InvalidValue { .. }
                | ConfigError::OutOfRange { .. }
                | ConfigError::Missing(_)
        )
    }
}

/// Message delivery errors
#[derive(Error, Debug)]
pub enum TransportError {
    /// A walker could not hand its completion message to the transport
    #[error("walker {walker_id} failed to send completion: {reason}")]
    SendFailed { walker_id: u32, reason: String },

    /// The coordinator's receive call failed
    #[error("coordinator receive failed: {0}")]
    ReceiveFailed(String),

    /// Every sender is gone while completions are still outstanding
    #[error("all senders disconnected with {outstanding} completion(s) outstanding")]
    Disconnected { outstanding: usize },

    /// Could not establish the connection to the coordinator
    #[error("failed to connect to coordinator at {addr} after {attempts} attempt(s): {source}")]
    Connect {
        addr: String,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    /// Frame encoding or decoding failed
    #[error("codec error: {0}")]
    Codec(String),

    /// Socket-level I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Exactly-once contract violations
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// Sender id outside the walker rank range
    #[error("completion from unknown source {source_id} (walkers are 1..={num_walkers})")]
    UnknownSource { source_id: u32, num_walkers: usize },

    /// Second completion from the same walker
    #[error("duplicate completion from source {source_id}")]
    DuplicateReport { source_id: u32 },

    /// Completion arrived after the expected count was already reached
    #[error("unexpected completion from source {source_id}: all {expected} walkers already reported")]
    Surplus { source_id: u32, expected: usize },

    /// Envelope sender and message source disagree
    #[error("message claims source {claimed} but arrived from {actual}")]
    SourceMismatch { claimed: u32, actual: u32 },
}

/// Result alias for core operations with typed errors
pub type WalkResult<T> = std::result::Result<T, WalkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_count_message() {
        let err = ConfigError::ParameterCount { expected: 2, got: 1 };
        assert_eq!(
            err.to_string(),
            "expected 2 launch parameters (<domain_bound> <max_steps>), got 1"
        );
        assert!(err.is_usage());
    }

    #[test]
    fn test_file_errors_are_not_usage() {
        let err = ConfigError::Read {
            path: PathBuf::from("/missing.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "nope"),
        };
        assert!(!err.is_usage());
    }

    #[test]
    fn test_walk_error_from_protocol() {
        let err: WalkError = ProtocolError::DuplicateReport { source_id: 3 }.into();
        assert!(matches!(err, WalkError::Protocol(_)));
        assert!(err.to_string().contains("duplicate completion from source 3"));
    }
}
