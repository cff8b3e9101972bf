//! Core SIP message types.

pub mod address;
pub mod cseq;
pub mod headers;
pub mod message;
pub mod method;

pub use address::Address;
pub use cseq::CSeq;
pub use headers::{Header, Headers};
pub use message::{Message, Request, Response, SIP_VERSION};
pub use method::Method;
