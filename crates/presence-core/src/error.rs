//! Error types for the presence engine.

use thiserror::Error;

/// Errors produced by the presence engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration was missing or inconsistent
    #[error("configuration error: {message}")]
    Config { message: String },

    /// A presence document could not be used
    #[error("presence document error: {message}")]
    Pidf { message: String },

    /// A hostname did not resolve
    #[error("address resolution error: {message}")]
    Resolve { message: String },

    /// Error from the SIP message layer
    #[error("SIP message error: {0}")]
    Sip(#[from] ctx_sip_core::Error),

    /// Error from the transport layer
    #[error("transport error: {0}")]
    Transport(#[from] ctx_sip_transport::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    pub fn pidf(message: impl Into<String>) -> Self {
        Error::Pidf {
            message: message.into(),
        }
    }

    pub fn resolve(message: impl Into<String>) -> Self {
        Error::Resolve {
            message: message.into(),
        }
    }
}

/// Result type for presence engine operations.
pub type Result<T> = std::result::Result<T, Error>;
