//! Error types for the engine.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::method::Method;

/// An error returned by a handler.
///
/// Carries the status code the engine's error handler should answer with.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{status}: {message}")]
pub struct HttpError {
    /// HTTP status code.
    pub status: u16,
    /// Human readable message, used as the default response body.
    pub message: String,
}

impl HttpError {
    /// Creates a new error with the given status and message.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    /// Creates a 401 Unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(401, message)
    }

    /// Creates a 404 Not Found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }

    /// Creates a 500 Internal Server Error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }
}

/// Engine-level errors: configuration, serving and dispatch.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address we tried to bind.
        addr: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// IO error while serving.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `shutdown` was called while nothing was being served.
    #[error("server is not listening")]
    NotListening,

    /// `listen`/`serve` was called while already serving.
    #[error("server is already listening on {0}")]
    AlreadyListening(SocketAddr),

    /// An in-process dispatch did not complete in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// A route path could not be compiled into a pattern.
    #[error("invalid path pattern: {0}")]
    InvalidPattern(String),

    /// A route was registered without any handler.
    #[error("missing handler for {method} {path}")]
    MissingHandler {
        /// Route method.
        method: Method,
        /// Route path.
        path: String,
    },

    /// A method token no route can be registered for.
    #[error("unsupported method: {0}")]
    UnknownMethod(String),

    /// The configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
