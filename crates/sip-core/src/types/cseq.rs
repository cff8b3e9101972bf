//! CSeq header values.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::types::method::Method;

/// A CSeq header value: sequence number plus the method of the request
/// the message belongs to.
///
/// Responses are routed on the method half, which identifies the original
/// request kind without any transaction state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CSeq {
    pub seq: u32,
    pub method: Method,
}

impl CSeq {
    pub fn new(seq: u32, method: Method) -> CSeq {
        CSeq { seq, method }
    }
}

impl fmt::Display for CSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.seq, self.method)
    }
}

impl FromStr for CSeq {
    type Err = Error;

    fn from_str(s: &str) -> Result<CSeq> {
        let mut parts = s.split_whitespace();
        let seq = parts
            .next()
            .ok_or_else(|| Error::InvalidCSeq(format!("empty CSeq: {s:?}")))?
            .parse::<u32>()
            .map_err(|_| Error::InvalidCSeq(format!("non-numeric sequence in {s:?}")))?;
        let method = parts
            .next()
            .ok_or_else(|| Error::InvalidCSeq(format!("missing method in {s:?}")))?
            .parse::<Method>()?;
        if parts.next().is_some() {
            return Err(Error::InvalidCSeq(format!("trailing tokens in {s:?}")));
        }
        Ok(CSeq::new(seq, method))
    }
}
