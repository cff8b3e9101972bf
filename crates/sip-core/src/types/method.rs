//! SIP request methods.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// SIP request method.
///
/// The common methods are modeled as variants so they can be matched on
/// directly; anything else is carried through as an [`Method::Extension`]
/// with the original token preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Invite,
    Register,
    Bye,
    Ack,
    Cancel,
    Options,
    Message,
    Refer,
    Subscribe,
    Notify,
    Publish,
    Info,
    Update,
    /// Any method token not covered by the variants above
    Extension(String),
}

impl Method {
    /// Interprets a method token, case-insensitively.
    ///
    /// Unrecognized tokens are preserved verbatim in [`Method::Extension`],
    /// so this never fails on a syntactically valid token.
    pub fn from_token(token: &str) -> Method {
        match token {
            t if t.eq_ignore_ascii_case("INVITE") => Method::Invite,
            t if t.eq_ignore_ascii_case("REGISTER") => Method::Register,
            t if t.eq_ignore_ascii_case("BYE") => Method::Bye,
            t if t.eq_ignore_ascii_case("ACK") => Method::Ack,
            t if t.eq_ignore_ascii_case("CANCEL") => Method::Cancel,
            t if t.eq_ignore_ascii_case("OPTIONS") => Method::Options,
            t if t.eq_ignore_ascii_case("MESSAGE") => Method::Message,
            t if t.eq_ignore_ascii_case("REFER") => Method::Refer,
            t if t.eq_ignore_ascii_case("SUBSCRIBE") => Method::Subscribe,
            t if t.eq_ignore_ascii_case("NOTIFY") => Method::Notify,
            t if t.eq_ignore_ascii_case("PUBLISH") => Method::Publish,
            t if t.eq_ignore_ascii_case("INFO") => Method::Info,
            t if t.eq_ignore_ascii_case("UPDATE") => Method::Update,
            other => Method::Extension(other.to_string()),
        }
    }

    /// Canonical wire representation of the method.
    pub fn as_str(&self) -> &str {
        match self {
            Method::Invite => "INVITE",
            Method::Register => "REGISTER",
            Method::Bye => "BYE",
            Method::Ack => "ACK",
            Method::Cancel => "CANCEL",
            Method::Options => "OPTIONS",
            Method::Message => "MESSAGE",
            Method::Refer => "REFER",
            Method::Subscribe => "SUBSCRIBE",
            Method::Notify => "NOTIFY",
            Method::Publish => "PUBLISH",
            Method::Info => "INFO",
            Method::Update => "UPDATE",
            Method::Extension(token) => token,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Method> {
        let token = s.trim();
        if token.is_empty() || !token.chars().all(is_token_char) {
            return Err(Error::parser(format!("invalid method token: {s:?}")));
        }
        Ok(Method::from_token(token))
    }
}

/// RFC 3261 `token` character set, which method names are drawn from.
pub(crate) fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-.!%*_+`'~".contains(c)
}
