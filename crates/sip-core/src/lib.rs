//! Minimal SIP message layer for the context server.
//!
//! This crate covers exactly what a presence-consuming endpoint needs:
//! a message model ([`types`]), a datagram parser ([`parser`]) and
//! builders for outgoing requests and responses ([`builder`]). There is
//! no transaction layer and no dialog state; retransmission and
//! reliability are left to the peers.

pub mod builder;
pub mod error;
pub mod parser;
pub mod types;

pub use builder::{RequestBuilder, ResponseBuilder};
pub use error::{Error, Result};
pub use parser::parse_message;
pub use types::{Address, CSeq, Header, Headers, Message, Method, Request, Response};

/// Common imports for working with SIP messages.
pub mod prelude {
    pub use crate::builder::{RequestBuilder, ResponseBuilder};
    pub use crate::error::{Error, Result};
    pub use crate::parser::parse_message;
    pub use crate::types::{
        Address, CSeq, Header, Headers, Message, Method, Request, Response, SIP_VERSION,
    };
}
