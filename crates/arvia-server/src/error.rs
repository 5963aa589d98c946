//! Error types for the HTTP servers.

use std::io;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        /// Address that was requested.
        address: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error while serving.
    #[error("Server error: {0}")]
    Io(#[from] io::Error),
}
