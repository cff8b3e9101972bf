//! Header list handling.

use std::fmt;

/// A single header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Header {
        Header {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// An ordered header list.
///
/// Headers keep their arrival order and may repeat (Via commonly does).
/// Name lookups are case-insensitive per RFC 3261.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<Header>,
}

impl Headers {
    pub fn new() -> Headers {
        Headers::default()
    }

    /// Appends a header, keeping any existing ones with the same name.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push(Header::new(name, value));
    }

    /// Value of the first header with this name.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Values of every header with this name, in order.
    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.first(name).is_some()
    }

    /// Replaces the first header with this name, or appends if absent.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        match self
            .entries
            .iter_mut()
            .find(|h| h.name.eq_ignore_ascii_case(name))
        {
            Some(header) => header.value = value.into(),
            None => self.push(name, value),
        }
    }

    /// Parsed Content-Length value, if the header is present and numeric.
    pub fn content_length(&self) -> Option<usize> {
        self.first("Content-Length")?.trim().parse().ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<Header> for Headers {
    fn extend<T: IntoIterator<Item = Header>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Headers {
        let mut headers = Headers::new();
        headers.push("Via", "SIP/2.0/UDP host1;branch=z9hG4bKa");
        headers.push("Via", "SIP/2.0/UDP host2;branch=z9hG4bKb");
        headers.push("From", "<sip:alice@open-ims.test>;tag=1");
        headers.push("Content-Length", "42");
        headers
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let headers = sample();
        assert_eq!(headers.first("FROM"), Some("<sip:alice@open-ims.test>;tag=1"));
        assert_eq!(headers.first("content-length"), Some("42"));
        assert!(headers.contains("vIa"));
        assert_eq!(headers.first("Subject"), None);
    }

    #[test]
    fn all_preserves_order_of_repeated_headers() {
        let headers = sample();
        let vias: Vec<&str> = headers.all("Via").collect();
        assert_eq!(vias.len(), 2);
        assert!(vias[0].contains("host1"));
        assert!(vias[1].contains("host2"));
    }

    #[test]
    fn set_replaces_first_occurrence_only() {
        let mut headers = sample();
        headers.set("From", "<sip:bob@open-ims.test>");
        assert_eq!(headers.first("From"), Some("<sip:bob@open-ims.test>"));
        headers.set("Subject", "hello");
        assert_eq!(headers.first("Subject"), Some("hello"));
    }

    #[test]
    fn content_length_parses_numeric_values() {
        let headers = sample();
        assert_eq!(headers.content_length(), Some(42));

        let mut bad = Headers::new();
        bad.push("Content-Length", "many");
        assert_eq!(bad.content_length(), None);
        assert!(bad.contains("Content-Length"));
    }
}
