use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the pairdash workspace.
///
/// Errors are always local to one pair, session or connection; none of them is
/// meant to bring the dashboard down.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DashError {
    /// The transport failed before a response was received.
    #[error("{transport} failed: {msg}")]
    Transport {
        /// Transport name that failed.
        transport: String,
        /// Human-readable error message.
        msg: String,
    },

    /// The backend answered with a non-success status code.
    #[error("status {code} for {path}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Request path relative to the API base URL.
        path: String,
    },

    /// A response body could not be decoded into the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// A resource or pair could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "bars for BTCUSD".
        what: String,
    },

    /// Invalid input argument or configuration.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The key/value store rejected a read or write.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// The log socket could not be opened or failed mid-stream.
    #[error("socket error: {0}")]
    Socket(String),

    /// The component was already shut down.
    #[error("closed")]
    Closed,

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl DashError {
    /// Helper: build a `Transport` error with the transport name and message.
    pub fn transport(transport: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Transport {
            transport: transport.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `Status` error for a request path.
    pub fn status(code: u16, path: impl Into<String>) -> Self {
        Self::Status {
            code,
            path: path.into(),
        }
    }

    /// Helper: build a `Decode` error from any displayable cause.
    pub fn decode(cause: impl std::fmt::Display) -> Self {
        Self::Decode(cause.to_string())
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build an `InvalidArg` error.
    pub fn invalid_arg(msg: impl Into<String>) -> Self {
        Self::InvalidArg(msg.into())
    }

    /// Returns true if retrying the same request later could plausibly succeed.
    ///
    /// Decoding and argument problems are deterministic; transport, socket and
    /// 5xx status failures are not.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Socket(_) => true,
            Self::Status { code, .. } => *code >= 500,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for DashError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
