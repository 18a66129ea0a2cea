//! Error types for the securityspy-stream crate.

use std::time::Duration;

/// Connectivity failures of a stream session.
///
/// These are the only errors [`crate::EventSession::run`] returns; all of
/// them are retryable, and whether to reconnect (and with what backoff) is
/// the caller's decision.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The streaming request could not be established
    #[error("failed to connect to {endpoint}: {message}")]
    Connect {
        /// The event stream endpoint
        endpoint: String,
        /// What went wrong opening it
        message: String,
    },

    /// The transport failed or closed while streaming
    #[error("event stream transport error: {0}")]
    Transport(String),

    /// No line arrived within the configured read timeout
    #[error("event stream read timed out after {0:?}")]
    Timeout(Duration),
}

impl StreamError {
    /// Whether the caller may retry by starting a new session.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::Connect { .. } | StreamError::Transport(_) | StreamError::Timeout(_) => {
                true
            }
        }
    }
}

/// A line that passed the timestamp-prefix check but could not be decoded.
///
/// Never fatal: the session logs the line and keeps streaming.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The line has fewer space-delimited fields than its kind requires
    #[error("event line has only {found} fields")]
    TooFewFields {
        /// Number of fields present
        found: usize,
    },

    /// Field 2 was neither an integer camera id nor the `X` sentinel
    #[error("invalid camera id field: {0:?}")]
    InvalidCameraId(String),

    /// A kind-specific field failed to parse
    #[error("invalid {field} field for {kind} event: {value:?}")]
    InvalidField {
        /// Event kind token
        kind: &'static str,
        /// Which field was bad
        field: &'static str,
        /// The raw field text
        value: String,
    },
}

/// Convenience Result type alias for session operations.
pub type Result<T> = std::result::Result<T, StreamError>;
