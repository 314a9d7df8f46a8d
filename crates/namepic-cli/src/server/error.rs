//! Server lifecycle errors.

use std::io;

/// Errors that can occur while starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The configuration failed validation before startup.
    #[error("invalid server configuration: {0}")]
    InvalidConfig(String),

    /// Binding the listener to the configured address failed.
    #[error("failed to bind to {address}: {source}")]
    Bind {
        /// The address the server tried to bind.
        address: String,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The server terminated with an I/O error while running.
    #[error("server runtime error: {0}")]
    Runtime(#[from] io::Error),
}

/// A specialized [`Result`] type for server lifecycle operations.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = ServerError> = std::result::Result<T, E>;
