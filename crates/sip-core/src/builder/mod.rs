//! Fluent builders for outgoing messages.
//!
//! ```
//! use ctx_sip_core::builder::RequestBuilder;
//! use ctx_sip_core::types::{Address, Method};
//!
//! let request = RequestBuilder::new(Method::Subscribe, "sip:alice@open-ims.test")
//!     .via("192.168.1.10:7777", "z9hG4bK74bf9")
//!     .max_forwards(70)
//!     .from_address(&Address::new("sip:context_server@open-ims.test").with_tag("1928301774"))
//!     .to_address(&Address::new("sip:alice@open-ims.test"))
//!     .call_id("a84b4c76e66710")
//!     .cseq(1)
//!     .event("presence")
//!     .build();
//! assert_eq!(request.headers.first("CSeq"), Some("1 SUBSCRIBE"));
//! ```

use bytes::Bytes;

use crate::types::address::Address;
use crate::types::cseq::CSeq;
use crate::types::message::{Request, Response};
use crate::types::method::Method;

/// Builds a [`Request`] header by header.
///
/// `build` stamps a Content-Length matching the body, so callers never
/// set that header themselves.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    pub fn new(method: Method, uri: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            request: Request::new(method, uri),
        }
    }

    /// Adds a Via header for a UDP hop.
    pub fn via(mut self, sent_by: &str, branch: &str) -> RequestBuilder {
        self.request
            .headers
            .push("Via", format!("SIP/2.0/UDP {sent_by};branch={branch}"));
        self
    }

    pub fn max_forwards(mut self, hops: u32) -> RequestBuilder {
        self.request.headers.push("Max-Forwards", hops.to_string());
        self
    }

    pub fn from_address(mut self, address: &Address) -> RequestBuilder {
        self.request.headers.push("From", address.to_string());
        self
    }

    pub fn to_address(mut self, address: &Address) -> RequestBuilder {
        self.request.headers.push("To", address.to_string());
        self
    }

    pub fn call_id(mut self, value: impl Into<String>) -> RequestBuilder {
        self.request.headers.push("Call-ID", value.into());
        self
    }

    /// Adds a CSeq header using the request's own method.
    pub fn cseq(mut self, seq: u32) -> RequestBuilder {
        let cseq = CSeq::new(seq, self.request.method.clone());
        self.request.headers.push("CSeq", cseq.to_string());
        self
    }

    pub fn contact(mut self, uri: &str) -> RequestBuilder {
        self.request.headers.push("Contact", format!("<{uri}>"));
        self
    }

    /// Adds an Event header naming the subscribed event package.
    pub fn event(mut self, package: &str) -> RequestBuilder {
        self.request.headers.push("Event", package);
        self
    }

    pub fn accept(mut self, media_type: &str) -> RequestBuilder {
        self.request.headers.push("Accept", media_type);
        self
    }

    pub fn expires(mut self, seconds: u32) -> RequestBuilder {
        self.request.headers.push("Expires", seconds.to_string());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> RequestBuilder {
        self.request.headers.push(name, value);
        self
    }

    /// Sets the body and its Content-Type.
    pub fn body(mut self, content_type: &str, body: impl Into<Bytes>) -> RequestBuilder {
        self.request.headers.set("Content-Type", content_type);
        self.request.body = body.into();
        self
    }

    pub fn build(mut self) -> Request {
        let length = self.request.body.len();
        self.request
            .headers
            .set("Content-Length", length.to_string());
        self.request
    }
}

/// Builds a [`Response`].
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    response: Response,
}

impl ResponseBuilder {
    pub fn new(status: u16, reason: impl Into<String>) -> ResponseBuilder {
        ResponseBuilder {
            response: Response::new(status, reason),
        }
    }

    /// Starts a response to `request`, echoing the headers that tie a
    /// response to its request: every Via in order, From, To, Call-ID
    /// and CSeq.
    pub fn from_request(request: &Request, status: u16, reason: impl Into<String>) -> ResponseBuilder {
        let mut builder = ResponseBuilder::new(status, reason);
        for via in request.headers.all("Via") {
            builder.response.headers.push("Via", via);
        }
        for name in ["From", "To", "Call-ID", "CSeq"] {
            if let Some(value) = request.headers.first(name) {
                builder.response.headers.push(name, value);
            }
        }
        builder
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> ResponseBuilder {
        self.response.headers.push(name, value);
        self
    }

    pub fn body(mut self, content_type: &str, body: impl Into<Bytes>) -> ResponseBuilder {
        self.response.headers.set("Content-Type", content_type);
        self.response.body = body.into();
        self
    }

    pub fn build(mut self) -> Response {
        let length = self.response.body.len();
        self.response
            .headers
            .set("Content-Length", length.to_string());
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_message;
    use pretty_assertions::assert_eq;

    fn subscribe() -> Request {
        RequestBuilder::new(Method::Subscribe, "sip:alice@open-ims.test")
            .via("192.168.1.10:7777", "z9hG4bK74bf9")
            .max_forwards(70)
            .from_address(&Address::new("sip:context_server@open-ims.test").with_tag("19283"))
            .to_address(&Address::new("sip:alice@open-ims.test"))
            .call_id("f81d4fae-7dec-11d0-a765-00a0c91e6bf6")
            .cseq(1)
            .contact("sip:context_server@192.168.1.10:7777")
            .event("presence")
            .accept("application/pidf+xml")
            .expires(3600)
            .build()
    }

    #[test]
    fn request_builder_stamps_all_headers() {
        let request = subscribe();
        assert_eq!(request.method, Method::Subscribe);
        assert_eq!(
            request.headers.first("Via"),
            Some("SIP/2.0/UDP 192.168.1.10:7777;branch=z9hG4bK74bf9")
        );
        assert_eq!(request.headers.first("Max-Forwards"), Some("70"));
        assert_eq!(
            request.headers.first("From"),
            Some("<sip:context_server@open-ims.test>;tag=19283")
        );
        assert_eq!(request.headers.first("Event"), Some("presence"));
        assert_eq!(request.headers.first("Expires"), Some("3600"));
        assert_eq!(request.headers.first("Content-Length"), Some("0"));
    }

    #[test]
    fn body_sets_content_type_and_length() {
        let request = RequestBuilder::new(Method::Message, "sip:scim@open-ims.test")
            .cseq(2)
            .body("text/plain", "alice@open-ims.test:open")
            .build();
        assert_eq!(request.headers.first("Content-Type"), Some("text/plain"));
        assert_eq!(request.headers.first("Content-Length"), Some("24"));
        assert_eq!(request.body_str(), Some("alice@open-ims.test:open"));
    }

    #[test]
    fn built_requests_parse_back() {
        let request = subscribe();
        let reparsed = parse_message(&request.to_bytes()).unwrap();
        assert_eq!(reparsed.as_request().unwrap(), &request);
    }

    #[test]
    fn response_echoes_request_headers() {
        let mut request = subscribe();
        request.headers.push("Via", "SIP/2.0/UDP proxy:5060;branch=z9hG4bKx");

        let response = ResponseBuilder::from_request(&request, 200, "OK").build();
        assert_eq!(response.status, 200);
        let vias: Vec<&str> = response.headers.all("Via").collect();
        assert_eq!(vias.len(), 2);
        assert!(vias[0].contains("192.168.1.10:7777"));
        assert_eq!(response.headers.first("CSeq"), Some("1 SUBSCRIBE"));
        assert_eq!(
            response.headers.first("Call-ID"),
            Some("f81d4fae-7dec-11d0-a765-00a0c91e6bf6")
        );
        assert_eq!(response.headers.first("Content-Length"), Some("0"));
    }

    #[test]
    fn response_without_optional_request_headers() {
        let request = Request::new(Method::Options, "sip:x@y");
        let response = ResponseBuilder::from_request(&request, 200, "OK").build();
        assert!(response.headers.first("Via").is_none());
        assert!(response.headers.first("CSeq").is_none());
    }
}
