//! Error types for SIP message handling.

use thiserror::Error;

/// Errors produced while parsing or assembling SIP messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The datagram could not be parsed as a SIP message
    #[error("parse error: {0}")]
    Parser(String),

    /// A From/To style address value was malformed
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A CSeq header value was malformed
    #[error("invalid CSeq: {0}")]
    InvalidCSeq(String),

    /// A header value was not usable in context
    #[error("invalid header {name}: {message}")]
    InvalidHeader { name: String, message: String },
}

impl Error {
    pub fn parser(message: impl Into<String>) -> Self {
        Error::Parser(message.into())
    }

    pub fn invalid_header(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidHeader {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result type for SIP message operations.
pub type Result<T> = std::result::Result<T, Error>;
