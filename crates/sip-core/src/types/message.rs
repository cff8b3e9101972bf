//! Request, response and message types.

use std::fmt;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::types::address::Address;
use crate::types::cseq::CSeq;
use crate::types::headers::Headers;
use crate::types::method::Method;

/// Protocol version emitted on every start line.
pub const SIP_VERSION: &str = "SIP/2.0";

/// A SIP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub uri: String,
    pub headers: Headers,
    pub body: Bytes,
}

impl Request {
    pub fn new(method: Method, uri: impl Into<String>) -> Request {
        Request {
            method,
            uri: uri.into(),
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    /// Parsed CSeq header.
    pub fn cseq(&self) -> Result<CSeq> {
        parse_cseq(&self.headers)
    }

    /// Parsed From header.
    pub fn from_address(&self) -> Result<Address> {
        parse_address(&self.headers, "From")
    }

    /// Parsed To header.
    pub fn to_address(&self) -> Result<Address> {
        parse_address(&self.headers, "To")
    }

    pub fn call_id(&self) -> Option<&str> {
        self.headers.first("Call-ID")
    }

    /// The body as UTF-8 text, if it is valid UTF-8.
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Serializes the request to its wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(256 + self.body.len());
        out.extend_from_slice(self.method.as_str().as_bytes());
        out.push(b' ');
        out.extend_from_slice(self.uri.as_bytes());
        out.push(b' ');
        out.extend_from_slice(SIP_VERSION.as_bytes());
        out.extend_from_slice(b"\r\n");
        write_headers_and_body(&mut out, &self.headers, &self.body);
        out
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.uri, SIP_VERSION)?;
        fmt_headers_and_body(f, &self.headers, &self.body)
    }
}

/// A SIP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub reason: String,
    pub headers: Headers,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, reason: impl Into<String>) -> Response {
        Response {
            status,
            reason: reason.into(),
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    /// True for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parsed CSeq header, which carries the method of the request this
    /// response answers.
    pub fn cseq(&self) -> Result<CSeq> {
        parse_cseq(&self.headers)
    }

    pub fn to_address(&self) -> Result<Address> {
        parse_address(&self.headers, "To")
    }

    pub fn call_id(&self) -> Option<&str> {
        self.headers.first("Call-ID")
    }

    /// Serializes the response to its wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(256 + self.body.len());
        out.extend_from_slice(SIP_VERSION.as_bytes());
        out.extend_from_slice(format!(" {} {}", self.status, self.reason).as_bytes());
        out.extend_from_slice(b"\r\n");
        write_headers_and_body(&mut out, &self.headers, &self.body);
        out
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", SIP_VERSION, self.status, self.reason)?;
        fmt_headers_and_body(f, &self.headers, &self.body)
    }
}

/// Either kind of SIP message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Request(Request),
    Response(Response),
}

impl Message {
    pub fn is_request(&self) -> bool {
        matches!(self, Message::Request(_))
    }

    pub fn is_response(&self) -> bool {
        matches!(self, Message::Response(_))
    }

    pub fn as_request(&self) -> Option<&Request> {
        match self {
            Message::Request(request) => Some(request),
            Message::Response(_) => None,
        }
    }

    pub fn as_response(&self) -> Option<&Response> {
        match self {
            Message::Request(_) => None,
            Message::Response(response) => Some(response),
        }
    }

    pub fn headers(&self) -> &Headers {
        match self {
            Message::Request(request) => &request.headers,
            Message::Response(response) => &response.headers,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Message::Request(request) => request.to_bytes(),
            Message::Response(response) => response.to_bytes(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Request(request) => request.fmt(f),
            Message::Response(response) => response.fmt(f),
        }
    }
}

impl From<Request> for Message {
    fn from(request: Request) -> Message {
        Message::Request(request)
    }
}

impl From<Response> for Message {
    fn from(response: Response) -> Message {
        Message::Response(response)
    }
}

fn parse_cseq(headers: &Headers) -> Result<CSeq> {
    headers
        .first("CSeq")
        .ok_or_else(|| Error::invalid_header("CSeq", "header missing"))?
        .parse()
}

fn parse_address(headers: &Headers, name: &str) -> Result<Address> {
    headers
        .first(name)
        .ok_or_else(|| Error::invalid_header(name, "header missing"))?
        .parse()
}

fn write_headers_and_body(out: &mut Vec<u8>, headers: &Headers, body: &Bytes) {
    for header in headers {
        out.extend_from_slice(header.name.as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(header.value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
}

fn fmt_headers_and_body(f: &mut fmt::Formatter<'_>, headers: &Headers, body: &Bytes) -> fmt::Result {
    writeln!(f)?;
    for header in headers {
        writeln!(f, "{header}")?;
    }
    writeln!(f)?;
    if !body.is_empty() {
        write!(f, "{}", String::from_utf8_lossy(body))?;
    }
    Ok(())
}
