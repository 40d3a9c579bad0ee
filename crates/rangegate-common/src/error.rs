//! Common error types used throughout rangegate.
//!
//! Store backends and the HTTP layer funnel their failures into [`Error`],
//! which carries enough context for handlers to derive a status code via
//! [`Error::http_status`] and for logs to tell failure kinds apart via
//! [`Error::kind`].

use std::fmt;

/// Common error type for rangegate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested object does not exist, or its metadata is unusable.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "object").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The remote store could not be reached or refused the request.
    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable {
        /// Human-readable description of the transport or auth failure.
        message: String,
    },

    /// Invalid input was provided.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::UpstreamUnavailable { .. } => 502,
            Error::Validation(_) => 400,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable label, used in logs and JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::UpstreamUnavailable { .. } => "upstream_unavailable",
            Error::Validation(_) => "validation_error",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Create a new NotFound error.
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Create a new UpstreamUnavailable error.
    pub fn upstream(message: impl Into<String>) -> Self {
        Error::UpstreamUnavailable {
            message: message.into(),
        }
    }

    /// Create a new Validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Whether this error means "the object is not there" as opposed to
    /// "the store could not answer".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
