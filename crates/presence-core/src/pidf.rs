//! Presence document (RFC 3863 PIDF) extraction.
//!
//! The server does not model full PIDF. It scans a document for two
//! things: the `<basic>` status and the `<note>`, both in the PIDF
//! namespace, wherever they occur in the tree. Multi-tuple documents
//! collapse to their last occurrence of each.

use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};

use ctx_sip_core::types::Request;

use crate::error::{Error, Result};

/// XML namespace of RFC 3863 presence documents.
pub const PIDF_NAMESPACE: &str = "urn:ietf:params:xml:ns:pidf";

/// One presence update, ready for the aggregate store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceReport {
    /// Bare `user@host` of the party the update describes
    pub reporter: String,
    /// Basic status value, normally `open` or `closed`
    pub status: String,
    /// Free-text note, empty when the document carries none
    pub note: String,
}

impl PresenceReport {
    /// Extracts a report from a NOTIFY request.
    ///
    /// The reporter is derived from the From header; status and note come
    /// from the body. A document yielding neither a status nor a note is
    /// rejected.
    pub fn from_notify(request: &Request, namespace: &str) -> Result<PresenceReport> {
        let reporter = request.from_address()?.user_at_host().to_string();
        let body = request
            .body_str()
            .ok_or_else(|| Error::pidf("presence document is not valid UTF-8"))?;
        let (status, note) = extract_status_note(body, namespace)?;
        Ok(PresenceReport {
            reporter,
            status,
            note,
        })
    }
}

// What the next text node should be stored as
#[derive(Clone, Copy)]
enum Capture {
    None,
    Status,
    Note,
}

/// Scans a presence document for the basic status and the note.
///
/// Only elements bound to `namespace` count, whatever prefix they use.
/// When an element occurs more than once the last occurrence wins.
/// Returns empty strings for whichever of the two is absent, and an
/// error if both are.
pub fn extract_status_note(xml: &str, namespace: &str) -> Result<(String, String)> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut status: Option<String> = None;
    let mut note: Option<String> = None;
    let mut capture = Capture::None;

    loop {
        match reader.read_resolved_event() {
            Ok((ns, Event::Start(e))) => {
                capture = classify(&ns, e.local_name().as_ref(), namespace);
            }
            Ok((ns, Event::Empty(e))) => {
                // A self-closing element carries an empty value
                match classify(&ns, e.local_name().as_ref(), namespace) {
                    Capture::Status => status = Some(String::new()),
                    Capture::Note => note = Some(String::new()),
                    Capture::None => {}
                }
            }
            Ok((_, Event::Text(t))) => {
                let text = t
                    .unescape()
                    .map_err(|e| Error::pidf(format!("malformed presence document: {e}")))?;
                match capture {
                    Capture::Status => status = Some(text.into_owned()),
                    Capture::Note => note = Some(text.into_owned()),
                    Capture::None => {}
                }
                capture = Capture::None;
            }
            Ok((_, Event::End(_))) => capture = Capture::None,
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::pidf(format!("malformed presence document: {e}"))),
        }
    }

    if status.is_none() && note.is_none() {
        return Err(Error::pidf(
            "document contains neither a status nor a note",
        ));
    }
    Ok((status.unwrap_or_default(), note.unwrap_or_default()))
}

fn classify(ns: &ResolveResult<'_>, local_name: &[u8], namespace: &str) -> Capture {
    match ns {
        ResolveResult::Bound(Namespace(bound)) if *bound == namespace.as_bytes() => {
            match local_name {
                b"basic" => Capture::Status,
                b"note" => Capture::Note,
                _ => Capture::None,
            }
        }
        _ => Capture::None,
    }
}
