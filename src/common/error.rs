//! Error types for the test group orchestrator
//!
//! Every error is non-recoverable from the orchestrator's point of view: the
//! operation stops and the message is surfaced to whoever invoked it. The
//! messages of the validation and lookup variants are matched by callers, so
//! keep them stable.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the orchestrator
#[derive(Error, Debug)]
pub enum Error {
    // === Validation Errors ===
    #[error("{0} must be specified")]
    MissingField(&'static str),

    // === Lookup Errors ===
    #[error("Unknow probe")]
    UnknownProbe { name: String },

    #[error("Unknow test script")]
    UnknownScript { package: String, name: String },

    #[error("Test group status for {group_id} lists no tests")]
    NoTestsInStatus { group_id: String },

    // === Test Outcome ===
    #[error("Test failed!")]
    TestFailed { status: String },

    #[error("Test group still {status} after {attempts} status checks")]
    PollLimitExceeded { status: String, attempts: u32 },

    // === Remote Call Errors ===
    #[error("XML-RPC fault {code}: {message}")]
    Fault { code: i64, message: String },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Service returned HTTP {status} for {method}")]
    Http { method: String, status: u16 },

    #[error("Malformed XML-RPC message: {0}")]
    XmlRpc(String),

    #[error("Unexpected response to {method}: {reason}")]
    UnexpectedResponse { method: String, reason: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an unknown script error
    pub fn unknown_script(package: &str, name: &str) -> Self {
        Self::UnknownScript {
            package: package.to_string(),
            name: name.to_string(),
        }
    }

    /// Create an unexpected response error for a remote method
    pub fn unexpected_response(method: &str, reason: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            method: method.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error came from talking to the remote service
    /// (transport, HTTP status, fault or an unparseable reply)
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::Fault { .. }
                | Error::Transport(_)
                | Error::Http { .. }
                | Error::XmlRpc(_)
                | Error::UnexpectedResponse { .. }
        )
    }
}
