//! Domain error types
//!
//! This module defines the error hierarchy for geexport. Errors are split by
//! blast radius: per-job errors ([`GeeError::FeatureNotFound`],
//! [`GeeError::Submission`]) are recovered by the scheduler, while
//! [`GeeError::InvalidDateRange`] and [`GeeError::RunAborted`] stop a run.
//! None of the variants expose third-party types.

use std::fmt;
use thiserror::Error;

/// Main geexport error type
#[derive(Debug, Error)]
pub enum GeeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed or empty date range
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    /// The feature collection has no feature with this index
    #[error("Feature not found: index {0}")]
    FeatureNotFound(i64),

    /// Creating or starting a remote export failed
    #[error("Submission failed: {0}")]
    Submission(String),

    /// Polling the remote task list failed
    #[error("Failed to read remote task status: {0}")]
    RemoteStatus(String),

    /// A run-level failure; the whole run stops
    #[error("Run aborted during {phase}: {message}")]
    RunAborted {
        /// Phase in which the run failed
        phase: RunPhase,
        /// Interval or index context, when known
        context: Option<String>,
        /// Underlying error message
        message: String,
    },

    /// Remote service errors
    #[error("Remote service error: {0}")]
    Remote(#[from] RemoteError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl GeeError {
    /// Wrap an error as a run-level abort
    pub fn aborted(phase: RunPhase, context: Option<String>, err: impl fmt::Display) -> Self {
        GeeError::RunAborted {
            phase,
            context,
            message: err.to_string(),
        }
    }

    /// Whether this error only affects a single job
    pub fn is_job_scoped(&self) -> bool {
        matches!(
            self,
            GeeError::FeatureNotFound(_) | GeeError::Submission(_) | GeeError::Remote(_)
        )
    }
}

/// Phase of a run, used to give run-level failures context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Partitioning the date range
    Planning,
    /// Initial contact with the remote service
    Handshake,
    /// Resolving the image for a date interval
    ImageResolution,
    /// Submitting jobs
    Submitting,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunPhase::Planning => "planning",
            RunPhase::Handshake => "service handshake",
            RunPhase::ImageResolution => "image resolution",
            RunPhase::Submitting => "submission",
        };
        f.write_str(s)
    }
}

/// Remote service errors
///
/// HTTP-level failures when talking to the processing service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Failed to connect to the service
    #[error("Failed to connect: {0}")]
    ConnectionFailed(String),

    /// Authentication failed (401/403)
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid response from server
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded (429)
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl RemoteError {
    /// Whether a retry may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RemoteError::ConnectionFailed(_)
                | RemoteError::RateLimitExceeded(_)
                | RemoteError::ServerError { .. }
                | RemoteError::Timeout(_)
        )
    }
}

impl From<std::io::Error> for GeeError {
    fn from(err: std::io::Error) -> Self {
        GeeError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GeeError {
    fn from(err: serde_json::Error) -> Self {
        GeeError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for GeeError {
    fn from(err: toml::de::Error) -> Self {
        GeeError::Configuration(format!("TOML parse error: {err}"))
    }
}
