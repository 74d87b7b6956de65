//! Error types for the Floodgate library.

use thiserror::Error;

/// Main error type for Floodgate operations.
///
/// These surface only at construction and configuration time. Once a
/// limiter is built, the request path is infallible: backend failures are
/// absorbed by the fail-open policy instead of propagating to callers.
#[derive(Error, Debug)]
pub enum FloodgateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Distributed counter store errors
    #[error("Counter store error: {0}")]
    Backend(#[from] redis::RedisError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Floodgate operations.
pub type Result<T> = std::result::Result<T, FloodgateError>;
