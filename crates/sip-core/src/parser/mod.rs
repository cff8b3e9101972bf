//! Datagram parsing.
//!
//! Each UDP datagram carries at most one SIP message. The header section
//! must be UTF-8; the body is kept as raw bytes. Parsing is deliberately
//! lenient where the wild is lenient: LF-only line endings are accepted,
//! a missing blank line means an empty body, and a Content-Length shorter
//! than the received body truncates it.

use bytes::Bytes;
use nom::{
    IResult,
    bytes::complete::{tag, take_till1, take_while1},
    character::complete::{char, digit1, space1},
    combinator::{map_res, opt, rest},
    sequence::{preceded, separated_pair},
};

use crate::error::{Error, Result};
use crate::types::headers::Headers;
use crate::types::message::{Message, Request, Response, SIP_VERSION};
use crate::types::method::{Method, is_token_char};

/// Parses one datagram into a request or response.
pub fn parse_message(data: &[u8]) -> Result<Message> {
    if data.is_empty() {
        return Err(Error::parser("empty datagram"));
    }

    let (head, body) = split_head_body(data);
    let head = std::str::from_utf8(head)
        .map_err(|_| Error::parser("header section is not valid UTF-8"))?;

    let mut lines = head.lines();
    let start = lines
        .next()
        .filter(|line| !line.trim().is_empty())
        .ok_or_else(|| Error::parser("missing start line"))?;

    let headers = parse_headers(lines)?;
    let body = clamp_body(body, &headers);

    // No method token can contain '/', so the version prefix is unambiguous.
    if start.starts_with(SIP_VERSION) {
        let (status, reason) = parse_status_line(start)?;
        Ok(Message::Response(Response {
            status,
            reason,
            headers,
            body,
        }))
    } else {
        let (method, uri) = parse_request_line(start)?;
        Ok(Message::Request(Request {
            method,
            uri,
            headers,
            body,
        }))
    }
}

/// Splits at the first blank line, CRLF or bare LF. A CRLF blank line
/// later in the body must not win over an earlier LF one. Without any
/// separator the whole datagram is the header section and the body is
/// empty.
fn split_head_body(data: &[u8]) -> (&[u8], &[u8]) {
    let crlf = find(data, b"\r\n\r\n").map(|i| (i, 4));
    let lf = find(data, b"\n\n").map(|i| (i, 2));
    let split = match (crlf, lf) {
        (Some(c), Some(l)) => Some(if c.0 < l.0 { c } else { l }),
        (c, l) => c.or(l),
    };
    match split {
        Some((i, len)) => (&data[..i], &data[i + len..]),
        None => (data, &[]),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Folds continuation lines (RFC 3261 allows headers to span lines when
/// the following line starts with whitespace) and collects header pairs.
fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> Result<Headers> {
    let mut headers = Headers::new();
    let mut pending: Option<(String, String)> = None;

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            match &mut pending {
                Some((_, value)) => {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                None => return Err(Error::parser("continuation line before any header")),
            }
        } else {
            if let Some((name, value)) = pending.take() {
                headers.push(name, value);
            }
            let (name, value) = parse_header_line(line)?;
            pending = Some((name.to_string(), value.to_string()));
        }
    }
    if let Some((name, value)) = pending.take() {
        headers.push(name, value);
    }
    Ok(headers)
}

fn clamp_body(body: &[u8], headers: &Headers) -> Bytes {
    match headers.content_length() {
        Some(len) if len < body.len() => Bytes::copy_from_slice(&body[..len]),
        _ => Bytes::copy_from_slice(body),
    }
}

fn request_line(input: &str) -> IResult<&str, (Method, &str)> {
    let (input, method) = take_while1(is_token_char)(input)?;
    let (input, _) = space1(input)?;
    let (input, uri) = take_while1(|c: char| !c.is_ascii_whitespace())(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag(SIP_VERSION)(input)?;
    Ok((input, (Method::from_token(method), uri)))
}

fn status_line(input: &str) -> IResult<&str, (u16, &str)> {
    let (input, _) = tag(SIP_VERSION)(input)?;
    let (input, _) = space1(input)?;
    let (input, status) = map_res(digit1, str::parse::<u16>)(input)?;
    let (input, reason) = opt(preceded(space1, rest))(input)?;
    Ok((input, (status, reason.unwrap_or(""))))
}

fn header_line(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(take_till1(|c| c == ':'), char(':'), rest)(input)
}

fn parse_request_line(line: &str) -> Result<(Method, String)> {
    let (remainder, (method, uri)) = request_line(line)
        .map_err(|_| Error::parser(format!("malformed request line: {line:?}")))?;
    if !remainder.trim().is_empty() {
        return Err(Error::parser(format!(
            "trailing content after request line: {line:?}"
        )));
    }
    Ok((method, uri.to_string()))
}

fn parse_status_line(line: &str) -> Result<(u16, String)> {
    let (_, (status, reason)) = status_line(line)
        .map_err(|_| Error::parser(format!("malformed status line: {line:?}")))?;
    Ok((status, reason.trim().to_string()))
}

fn parse_header_line(line: &str) -> Result<(&str, &str)> {
    let (_, (name, value)) = header_line(line)
        .map_err(|_| Error::parser(format!("malformed header line: {line:?}")))?;
    let name = name.trim_end();
    if name.is_empty() || !name.chars().all(is_token_char) {
        return Err(Error::parser(format!("invalid header name: {name:?}")));
    }
    Ok((name, value.trim()))
}
