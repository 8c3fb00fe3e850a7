//! Error types for route composition.

use burrow_http::EngineError;
use thiserror::Error;

/// Errors raised while building the routing tree.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A route path was the empty string.
    #[error("route path must not be empty")]
    EmptyPath,

    /// A group or mount prefix was the empty string.
    #[error("prefix must not be empty")]
    EmptyPrefix,

    /// The receiver cannot perform this operation.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// The app a scope registers into has been dropped.
    #[error("the app behind this scope no longer exists")]
    Detached,

    /// The engine rejected the registration.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Result type alias for composition operations.
pub type Result<T> = std::result::Result<T, RouteError>;
