//! Global error types for the ServiceBook client.
//!
//! All error categories across the workspace are unified into a single
//! `SbError` enum with conversions from underlying library errors.

use thiserror::Error;

/// Convenience type alias for Results using SbError.
pub type SbResult<T> = Result<T, SbError>;

/// Unified error type covering all error categories in ServiceBook.
#[derive(Error, Debug)]
pub enum SbError {
    // -- Configuration errors --
    /// Failed to load or parse application configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    // -- Network errors --
    /// HTTP request failed before a response was received.
    #[error("http error: {0}")]
    Http(String),

    /// HTTP request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Server returned a non-success response.
    #[error("server error (status {status}): {message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Error message from server.
        message: String,
    },

    /// Realtime channel error (handshake, transport).
    #[error("channel error: {0}")]
    Channel(String),

    /// The realtime channel is not open.
    #[error("channel is not connected")]
    ChannelClosed,

    // -- Auth errors --
    /// The server rejected our credentials or token.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// An operation needs a session and none is present.
    #[error("not authenticated")]
    NotAuthenticated,

    // -- Payload errors --
    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A payload parsed but is missing a required field.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // -- Generic --
    /// An unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Wrapping anyhow errors for interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse error taxonomy used to decide how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network or channel failure, including non-2xx responses.
    Transport,
    /// JSON parse failure or missing field.
    MalformedPayload,
    /// Expired or invalid token, rejected credentials.
    Authorization,
    /// Bad or missing local configuration.
    Config,
    /// Local faults (I/O, internal invariants).
    Internal,
}

impl SbError {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http(_)
            | Self::Timeout(_)
            | Self::ServerError { .. }
            | Self::Channel(_)
            | Self::ChannelClosed => ErrorCategory::Transport,
            Self::Serialization(_) | Self::MalformedPayload(_) => ErrorCategory::MalformedPayload,
            Self::AuthFailed(_) | Self::NotAuthenticated => ErrorCategory::Authorization,
            Self::Config(_) | Self::MissingConfig(_) => ErrorCategory::Config,
            Self::Io(_) | Self::Internal(_) | Self::Other(_) => ErrorCategory::Internal,
        }
    }

    /// Whether this error means the stored session is no longer valid.
    pub fn is_auth_failure(&self) -> bool {
        self.category() == ErrorCategory::Authorization
    }
}

impl From<serde_json::Error> for SbError {
    fn from(e: serde_json::Error) -> Self {
        SbError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for SbError {
    fn from(e: toml::de::Error) -> Self {
        SbError::Config(e.to_string())
    }
}
