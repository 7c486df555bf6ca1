//! Validated identity results.
//!
//! An [`Assertion`] is the typed outcome of a successful ticket
//! validation, produced by the external validator collaborator. The core
//! never parses the server's response body itself.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The authenticated principal named by an assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    /// Principal name (typically a username).
    pub name: String,

    /// Attributes released for the principal. CAS attributes are
    /// multi-valued.
    #[serde(default)]
    pub attributes: HashMap<String, Vec<String>>,
}

impl Principal {
    /// Creates a principal with no attributes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: HashMap::new(),
        }
    }
}

/// The validated identity result for a successfully validated ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assertion {
    /// The authenticated principal.
    pub principal: Principal,

    /// Attributes scoped to the assertion itself (as opposed to the
    /// principal), e.g. authentication method.
    #[serde(default)]
    pub attributes: HashMap<String, Vec<String>>,

    /// Chain of proxying services the credential traversed, outermost
    /// first. Empty for a directly-presented service ticket.
    #[serde(default)]
    pub proxy_chain: Vec<String>,

    /// When the assertion became valid.
    #[serde(with = "time::serde::rfc3339")]
    pub valid_from: OffsetDateTime,

    /// When the assertion ceases to be valid, if the server bounded it.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub valid_until: Option<OffsetDateTime>,
}

impl Assertion {
    /// Creates an assertion for `principal`, valid from now with no
    /// expiry bound.
    #[must_use]
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            attributes: HashMap::new(),
            proxy_chain: Vec::new(),
            valid_from: OffsetDateTime::now_utc(),
            valid_until: None,
        }
    }

    /// Returns `true` if the assertion is valid at `at`.
    #[must_use]
    pub fn is_valid_at(&self, at: OffsetDateTime) -> bool {
        if at < self.valid_from {
            return false;
        }
        match self.valid_until {
            Some(until) => at <= until,
            None => true,
        }
    }

    /// Returns `true` if the assertion is valid now.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(OffsetDateTime::now_utc())
    }

    /// Returns `true` if the credential was presented through at least
    /// one proxying service.
    #[must_use]
    pub fn is_proxied(&self) -> bool {
        !self.proxy_chain.is_empty()
    }
}
