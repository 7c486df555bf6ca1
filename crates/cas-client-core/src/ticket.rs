//! Ticket value types and protocol variants.
//!
//! A [`Ticket`] is an opaque credential string issued by the
//! authentication server. No internal structure may be assumed beyond
//! string equality; the [`TicketKind`] derived from the conventional
//! prefix is advisory only.

use serde::{Deserialize, Serialize};

/// Conventional prefix of service tickets.
pub const SERVICE_TICKET_PREFIX: &str = "ST-";
/// Conventional prefix of proxy tickets.
pub const PROXY_TICKET_PREFIX: &str = "PT-";
/// Conventional prefix of proxy-granting tickets.
pub const PROXY_GRANTING_TICKET_PREFIX: &str = "PGT-";
/// Conventional prefix of proxy-granting-ticket IOUs.
pub const PROXY_GRANTING_TICKET_IOU_PREFIX: &str = "PGTIOU-";

/// Kind of credential, derived from the conventional ticket prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketKind {
    /// Single-use credential issued after a successful login (`ST-`).
    Service,
    /// Credential presented by a proxying application (`PT-`).
    Proxy,
    /// Credential enabling proxy-ticket issuance (`PGT-`).
    ProxyGranting,
    /// Synchronously-returned placeholder for a PGT (`PGTIOU-`).
    ProxyGrantingIou,
    /// No recognized prefix; treated as an opaque artifact.
    Opaque,
}

/// An opaque ticket exchanged with the authentication server.
///
/// Unique per issuance; equality is string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket {
    value: String,
}

impl Ticket {
    /// Wraps a raw ticket string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The raw ticket string as issued by the server.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The advisory kind derived from the ticket prefix.
    #[must_use]
    pub fn kind(&self) -> TicketKind {
        // PGTIOU- must be checked before PGT-.
        if self.value.starts_with(PROXY_GRANTING_TICKET_IOU_PREFIX) {
            TicketKind::ProxyGrantingIou
        } else if self.value.starts_with(PROXY_GRANTING_TICKET_PREFIX) {
            TicketKind::ProxyGranting
        } else if self.value.starts_with(PROXY_TICKET_PREFIX) {
            TicketKind::Proxy
        } else if self.value.starts_with(SERVICE_TICKET_PREFIX) {
            TicketKind::Service
        } else {
            TicketKind::Opaque
        }
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl From<&str> for Ticket {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Supported protocol variants, as data rather than a validator hierarchy.
///
/// Each variant carries the default request parameter names the
/// authentication server recognizes for that protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// CAS protocol 1.0 (plain-text validation responses).
    Cas10,
    /// CAS protocol 2.0 (XML service responses, proxy support).
    Cas20,
    /// CAS protocol 3.0 (attribute release).
    Cas30,
    /// SAML 1.1 artifact profile.
    Saml11,
}

impl Protocol {
    /// Default name of the request parameter carrying the ticket artifact.
    #[must_use]
    pub fn artifact_parameter(&self) -> &'static str {
        match self {
            Self::Cas10 | Self::Cas20 | Self::Cas30 => "ticket",
            Self::Saml11 => "SAMLart",
        }
    }

    /// Default name of the request parameter carrying the service URL.
    #[must_use]
    pub fn service_parameter(&self) -> &'static str {
        match self {
            Self::Cas10 | Self::Cas20 | Self::Cas30 => "service",
            Self::Saml11 => "TARGET",
        }
    }
}
