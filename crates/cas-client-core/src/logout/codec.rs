//! Logout message encoding and decoding.
//!
//! The logout notification is a minimal SAML-like `LogoutRequest`
//! envelope whose `SessionIndex` equals the server ticket id. The codec
//! knows nothing about transport; binding to a query or body parameter
//! is the handler's responsibility.

use base64::{Engine, engine::general_purpose::STANDARD};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::CasResult;
use crate::error::CasError;

/// Refuse to decode payloads beyond this size.
const MAX_PAYLOAD_BYTES: usize = 512 * 1024;

/// The NameID placeholder: the envelope identifies the session by ticket
/// id, not by principal.
const NAME_ID_NOT_USED: &str = "@NOT_USED@";

/// A decoded logout notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutMessage {
    /// The session index, equal to the original ticket id.
    pub session_index: String,
    /// The payload as received.
    pub raw: String,
    /// Relay state accompanying a front-channel delivery, attached by
    /// the handler (never part of the envelope).
    pub relay_state: Option<String>,
}

impl LogoutMessage {
    /// Attaches the relay state carried alongside the payload.
    #[must_use]
    pub fn with_relay_state(mut self, relay_state: Option<String>) -> Self {
        self.relay_state = relay_state;
        self
    }
}

/// Encodes a logout envelope for back-channel delivery (raw XML, POSTed
/// as a body parameter by the authentication server).
#[must_use]
pub fn encode_back_channel(ticket_id: &str) -> String {
    build_envelope(ticket_id)
}

/// Encodes a logout envelope for front-channel delivery.
///
/// Base64-wrapped so the payload survives URL embedding once the caller
/// applies transport encoding.
#[must_use]
pub fn encode_front_channel(ticket_id: &str) -> String {
    STANDARD.encode(build_envelope(ticket_id).as_bytes())
}

fn build_envelope(ticket_id: &str) -> String {
    let request_id = format!("LR-{}", Uuid::new_v4());
    let issue_instant = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();

    let mut xml = String::new();
    xml.push_str("<samlp:LogoutRequest xmlns:samlp=\"urn:oasis:names:tc:SAML:2.0:protocol\" ID=\"");
    xml.push_str(&xml_escape(&request_id));
    xml.push_str("\" Version=\"2.0\" IssueInstant=\"");
    xml.push_str(&issue_instant);
    xml.push_str("\">");
    xml.push_str("<saml:NameID xmlns:saml=\"urn:oasis:names:tc:SAML:2.0:assertion\">");
    xml.push_str(NAME_ID_NOT_USED);
    xml.push_str("</saml:NameID>");
    xml.push_str("<samlp:SessionIndex>");
    xml.push_str(&xml_escape(ticket_id));
    xml.push_str("</samlp:SessionIndex>");
    xml.push_str("</samlp:LogoutRequest>");
    xml
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Decodes a logout payload, accepting raw XML or base64-wrapped XML.
///
/// The parser extracts the `SessionIndex` element by local name and
/// ignores everything else: unknown attributes, namespaces, and extra
/// elements must not cause rejection (forward compatibility).
///
/// # Errors
///
/// Returns [`CasError::MalformedLogoutMessage`] if the payload is not
/// parseable or carries no recognizable session index.
pub fn decode(payload: &str) -> CasResult<LogoutMessage> {
    if payload.len() > MAX_PAYLOAD_BYTES {
        return Err(CasError::malformed_logout_message("payload too large"));
    }

    let trimmed = payload.trim();
    let xml = if trimmed.starts_with('<') {
        trimmed.to_string()
    } else {
        let decoded = STANDARD
            .decode(trimmed)
            .map_err(|e| CasError::malformed_logout_message(format!("base64 decode failed: {e}")))?;
        String::from_utf8(decoded)
            .map_err(|e| CasError::malformed_logout_message(format!("invalid UTF-8: {e}")))?
    };

    let session_index = extract_session_index(&xml)?;

    Ok(LogoutMessage {
        session_index,
        raw: payload.to_string(),
        relay_state: None,
    })
}

fn extract_session_index(xml: &str) -> CasResult<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut current_element = String::new();
    let mut session_index = None;

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                current_element =
                    String::from_utf8_lossy(e.local_name().into_inner()).to_string();
            }
            Ok(Event::Text(ref e)) => {
                if current_element == "SessionIndex" && session_index.is_none() {
                    let text = e.unescape().unwrap_or_default().to_string();
                    if !text.is_empty() {
                        session_index = Some(text);
                    }
                }
            }
            Ok(Event::End(_)) => {
                current_element.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(CasError::malformed_logout_message(format!(
                    "XML parse error: {e}"
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    session_index
        .ok_or_else(|| CasError::malformed_logout_message("no session index in logout payload"))
}
