//! From/To style addresses.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A parsed name-addr as it appears in From, To and Contact headers.
///
/// Holds an optional display name, the embedded URI (angle brackets
/// stripped) and any header parameters that followed the closing bracket,
/// such as `tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    display_name: Option<String>,
    uri: String,
    params: Vec<(String, Option<String>)>,
}

impl Address {
    /// Creates an address from a bare URI with no display name or parameters.
    pub fn new(uri: impl Into<String>) -> Address {
        Address {
            display_name: None,
            uri: uri.into(),
            params: Vec::new(),
        }
    }

    /// Parses a header value such as `"Alice" <sip:alice@example.com>;tag=88sja8x`.
    ///
    /// Both the name-addr form (with angle brackets) and the addr-spec form
    /// (bare URI) are accepted.
    pub fn parse(input: &str) -> Result<Address> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::InvalidAddress("empty address".to_string()));
        }

        if let Some(open) = input.find('<') {
            let close = input[open..]
                .find('>')
                .map(|i| open + i)
                .ok_or_else(|| Error::InvalidAddress(format!("unterminated name-addr: {input}")))?;

            let display = input[..open].trim().trim_matches('"').trim();
            let uri = input[open + 1..close].trim();
            if uri.is_empty() {
                return Err(Error::InvalidAddress(format!("empty URI in {input}")));
            }

            Ok(Address {
                display_name: (!display.is_empty()).then(|| display.to_string()),
                uri: uri.to_string(),
                params: parse_params(&input[close + 1..]),
            })
        } else {
            // addr-spec form: everything up to the first semicolon is the URI
            let (uri, rest) = match input.find(';') {
                Some(i) => (&input[..i], &input[i..]),
                None => (input, ""),
            };
            let uri = uri.trim();
            if uri.is_empty() {
                return Err(Error::InvalidAddress(format!("empty URI in {input}")));
            }

            Ok(Address {
                display_name: None,
                uri: uri.to_string(),
                params: parse_params(rest),
            })
        }
    }

    /// The embedded URI, angle brackets stripped.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Sets the display name, replacing any previous one.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Address {
        self.display_name = Some(name.into());
        self
    }

    /// The URI with the `sip:` / `sips:` scheme prefix removed.
    ///
    /// For `<sip:alice@open-ims.test>` this yields `alice@open-ims.test`,
    /// the form reporters are keyed by.
    pub fn user_at_host(&self) -> &str {
        let uri = self.uri.as_str();
        // byte 4/5 of a non-ASCII URI need not be a char boundary
        if uri.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("sip:")) {
            &uri[4..]
        } else if uri.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("sips:")) {
            &uri[5..]
        } else {
            uri
        }
    }

    /// Value of the `tag` parameter, if present.
    pub fn tag(&self) -> Option<&str> {
        self.params.iter().find_map(|(name, value)| {
            name.eq_ignore_ascii_case("tag")
                .then(|| value.as_deref())
                .flatten()
        })
    }

    /// Sets the `tag` parameter, replacing any previous value.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Address {
        let tag = tag.into();
        if let Some(entry) = self
            .params
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case("tag"))
        {
            entry.1 = Some(tag);
        } else {
            self.params.push(("tag".to_string(), Some(tag)));
        }
        self
    }

    /// Header parameters in order of appearance.
    pub fn params(&self) -> &[(String, Option<String>)] {
        &self.params
    }
}

fn parse_params(input: &str) -> Vec<(String, Option<String>)> {
    input
        .split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| match p.split_once('=') {
            Some((name, value)) => (name.trim().to_string(), Some(value.trim().to_string())),
            None => (p.to_string(), None),
        })
        .collect()
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.display_name {
            write!(f, "\"{name}\" ")?;
        }
        write!(f, "<{}>", self.uri)?;
        for (name, value) in &self.params {
            match value {
                Some(value) => write!(f, ";{name}={value}")?,
                None => write!(f, ";{name}")?,
            }
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Address> {
        Address::parse(s)
    }
}
