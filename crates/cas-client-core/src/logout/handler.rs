//! Request classification and single-logout processing.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::CasResult;
use crate::assertion::Assertion;
use crate::config::{CasConfig, SingleLogoutConfig};
use crate::logout::codec;
use crate::request::{CasRequest, CasResponse};
use crate::session::SessionCorrelationStorage;
use crate::ticket::{Protocol, Ticket};
use crate::urls;
use crate::validation::TicketValidationCoordinator;

/// Terminal classification of an inbound request.
///
/// Each request is classified exactly once; no request is
/// double-classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// Carries a ticket artifact and is not a logout message.
    TokenGrant(Ticket),
    /// POST carrying the logout payload in the body.
    BackChannelLogout {
        /// The encoded logout payload.
        payload: String,
    },
    /// Front-channel delivery carrying the logout payload in the query
    /// string, with an optional relay state.
    FrontChannelLogout {
        /// The encoded logout payload.
        payload: String,
        /// Relay state to continue the server's logout round-trip.
        relay_state: Option<String>,
    },
    /// None of the above; pass through unchanged.
    PassThrough,
}

/// Outcome of handling a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// A ticket was validated and the session correlation registered.
    Authenticated(Assertion),
    /// A logout notice was processed. Always benign, whether or not a
    /// matching session existed, so the transport cannot probe for
    /// session existence.
    LogoutProcessed,
    /// Nothing for this client to do.
    PassThrough,
}

/// Classifies inbound requests and drives the session-correlation store
/// from ticket issuance and logout notices.
pub struct SingleLogoutHandler {
    protocol: Protocol,
    slo: SingleLogoutConfig,
    server_logout_url: String,
    sessions: Arc<dyn SessionCorrelationStorage>,
    coordinator: Arc<TicketValidationCoordinator>,
}

impl SingleLogoutHandler {
    /// Creates a handler wired to the given stores.
    #[must_use]
    pub fn new(
        config: &CasConfig,
        sessions: Arc<dyn SessionCorrelationStorage>,
        coordinator: Arc<TicketValidationCoordinator>,
    ) -> Self {
        Self {
            protocol: config.protocol,
            slo: config.slo.clone(),
            server_logout_url: config.server.logout_url(),
            sessions,
            coordinator,
        }
    }

    /// Classifies a request without side effects.
    ///
    /// When a request carries both a ticket and a logout parameter the
    /// configured precedence decides; by default logout wins.
    #[must_use]
    pub fn classify(&self, request: &dyn CasRequest) -> RequestKind {
        let logout = self.classify_logout(request);
        let token = || {
            request
                .parameter(self.protocol.artifact_parameter())
                .filter(|value| !value.is_empty())
                .map(|value| RequestKind::TokenGrant(Ticket::new(value)))
        };

        let classified = if self.slo.logout_takes_precedence {
            logout.or_else(token)
        } else {
            token().or(logout)
        };
        classified.unwrap_or(RequestKind::PassThrough)
    }

    fn classify_logout(&self, request: &dyn CasRequest) -> Option<RequestKind> {
        if request.method() == "POST" {
            request
                .body_parameter(&self.slo.logout_parameter)
                .map(|payload| RequestKind::BackChannelLogout { payload })
        } else if request
            .method()
            .eq_ignore_ascii_case(&self.slo.front_channel_method)
        {
            request
                .query_parameter(&self.slo.logout_parameter)
                .map(|payload| RequestKind::FrontChannelLogout {
                    payload,
                    relay_state: request.query_parameter(&self.slo.relay_state_parameter),
                })
        } else {
            None
        }
    }

    /// Handles one inbound request.
    ///
    /// # Errors
    ///
    /// Ticket validation failures propagate (the request is not
    /// swallowed). Logout processing never fails the caller: malformed
    /// payloads degrade to [`Disposition::PassThrough`] and unknown
    /// tickets are benign no-ops.
    pub async fn handle(
        &self,
        request: &dyn CasRequest,
        response: &dyn CasResponse,
    ) -> CasResult<Disposition> {
        match self.classify(request) {
            RequestKind::TokenGrant(ticket) => {
                let assertion = self
                    .coordinator
                    .validate_and_register(&ticket, request.session())
                    .await?;
                Ok(Disposition::Authenticated(assertion))
            }
            RequestKind::BackChannelLogout { payload } => {
                self.process_logout(&payload, None, None).await
            }
            RequestKind::FrontChannelLogout {
                payload,
                relay_state,
            } => {
                self.process_logout(&payload, relay_state, Some(response))
                    .await
            }
            RequestKind::PassThrough => Ok(Disposition::PassThrough),
        }
    }

    async fn process_logout(
        &self,
        payload: &str,
        relay_state: Option<String>,
        response: Option<&dyn CasResponse>,
    ) -> CasResult<Disposition> {
        let message = match codec::decode(payload) {
            Ok(message) => message.with_relay_state(relay_state),
            Err(error) => {
                warn!(error = %error, "ignoring malformed logout payload");
                return Ok(Disposition::PassThrough);
            }
        };

        match self.sessions.resolve_and_remove(&message.session_index).await? {
            Some(session) => {
                info!(
                    ticket_id = %message.session_index,
                    session_id = %session.id(),
                    "invalidating session for single logout"
                );
                session.invalidate();
            }
            None => {
                debug!(
                    ticket_id = %message.session_index,
                    "logout notice for unknown ticket, ignoring"
                );
            }
        }

        if let (Some(response), Some(relay_state)) = (response, message.relay_state.as_deref()) {
            let url = urls::logout_continuation_url(&self.server_logout_url, relay_state);
            debug!(url = %url, "continuing front-channel logout");
            response.redirect(&url);
        }

        Ok(Disposition::LogoutProcessed)
    }
}
