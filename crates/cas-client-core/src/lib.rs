//! # cas-client-core
//!
//! Client-side enforcement point for CAS-style single sign-on.
//!
//! This crate provides:
//! - Ticket validation orchestration with session correlation
//! - Single logout (front-channel and back-channel) message handling
//! - Proxy-granting-ticket storage with TTL-based background reclamation
//! - Login/logout redirect URL construction
//!
//! ## Overview
//!
//! The surrounding web layer implements the small capability traits in
//! [`request`] and [`session`] over its own request/response/session
//! types, constructs a [`CasClient`] with an external
//! [`TicketValidator`], and routes every inbound request through the
//! [`SingleLogoutHandler`]. The HTTP stack, the validation wire
//! exchange, and configuration loading all stay outside this crate.
//!
//! ## Modules
//!
//! - [`config`] - Resolved configuration and startup validation
//! - [`ticket`] - Ticket value types and protocol variants
//! - [`assertion`] - Validated identity results
//! - [`request`] - Inbound request/response capability traits
//! - [`session`] - Session handles and ticket correlation storage
//! - [`proxy`] - Proxy-granting-ticket storage, callback, reaper
//! - [`logout`] - Logout message codec and request handling
//! - [`validation`] - Validator trait and coordination
//! - [`client`] - Composition root
//! - [`urls`] - Redirect URL construction

pub mod assertion;
pub mod client;
pub mod config;
pub mod error;
pub mod logout;
pub mod proxy;
pub mod request;
pub mod session;
pub mod ticket;
pub mod urls;
pub mod validation;

pub use assertion::{Assertion, Principal};
pub use client::CasClient;
pub use config::{CasConfig, ProxyConfig, ServerConfig, SingleLogoutConfig};
pub use error::CasError;
pub use logout::{
    Disposition, LogoutMessage, RequestKind, SingleLogoutHandler, decode, encode_back_channel,
    encode_front_channel,
};
pub use proxy::{
    CallbackDisposition, InMemoryProxyGrantingTicketStore, PROXY_RECEPTOR_RESPONSE,
    ProxyGrantingTicketStorage, ProxyTicketReaper, receive_callback,
};
pub use request::{CasRequest, CasResponse};
pub use session::{InMemorySessionCorrelationStore, SessionCorrelationStorage, SessionHandle};
pub use ticket::{Protocol, Ticket, TicketKind};
pub use validation::{TicketValidationCoordinator, TicketValidator};

/// Type alias for CAS client results.
pub type CasResult<T> = Result<T, CasError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use cas_client_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::CasResult;
    pub use crate::assertion::{Assertion, Principal};
    pub use crate::client::CasClient;
    pub use crate::config::{CasConfig, ProxyConfig, ServerConfig, SingleLogoutConfig};
    pub use crate::error::CasError;
    pub use crate::logout::{Disposition, LogoutMessage, RequestKind, SingleLogoutHandler};
    pub use crate::proxy::{
        CallbackDisposition, InMemoryProxyGrantingTicketStore, ProxyGrantingTicketStorage,
        ProxyTicketReaper,
    };
    pub use crate::request::{CasRequest, CasResponse};
    pub use crate::session::{
        InMemorySessionCorrelationStore, SessionCorrelationStorage, SessionHandle,
    };
    pub use crate::ticket::{Protocol, Ticket, TicketKind};
    pub use crate::validation::{TicketValidationCoordinator, TicketValidator};
}
