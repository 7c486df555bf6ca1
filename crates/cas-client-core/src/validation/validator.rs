//! Ticket validator capability trait.

use async_trait::async_trait;

use crate::CasResult;
use crate::assertion::Assertion;

/// External collaborator that validates a ticket against the
/// authentication server.
///
/// Implementations perform the network exchange and parse the server's
/// response body into a typed [`Assertion`]; neither concern lives in
/// this crate. The call is potentially slow; timeout and cancellation
/// policy belong to the implementation.
#[async_trait]
pub trait TicketValidator: Send + Sync {
    /// Validates `ticket` for `service`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CasError::ValidationFailure`] when the server
    /// rejects the ticket, or another error for transport-level
    /// failures.
    async fn validate(&self, ticket: &str, service: &str) -> CasResult<Assertion>;
}
