//! Transport error types.

use thiserror::Error;

/// Errors produced by transport operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying socket operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport has been closed and cannot send
    #[error("transport closed")]
    TransportClosed,
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, Error>;
