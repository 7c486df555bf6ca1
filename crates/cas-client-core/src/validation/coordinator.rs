//! Ticket validation orchestration.

use std::sync::Arc;

use tracing::{debug, info};

use crate::CasResult;
use crate::assertion::Assertion;
use crate::session::{SessionCorrelationStorage, SessionHandle};
use crate::ticket::Ticket;
use crate::validation::TicketValidator;

/// Validates incoming service/proxy tickets and registers the resulting
/// session correlation for single logout.
pub struct TicketValidationCoordinator {
    validator: Arc<dyn TicketValidator>,
    sessions: Arc<dyn SessionCorrelationStorage>,
    service_url: String,
}

impl TicketValidationCoordinator {
    /// Creates a coordinator validating tickets for `service_url`.
    #[must_use]
    pub fn new(
        validator: Arc<dyn TicketValidator>,
        sessions: Arc<dyn SessionCorrelationStorage>,
        service_url: impl Into<String>,
    ) -> Self {
        Self {
            validator,
            sessions,
            service_url: service_url.into(),
        }
    }

    /// Validates `ticket` and, on success, correlates it with the
    /// current session.
    ///
    /// The validator's result or error is surfaced unchanged. Validation
    /// is never retried: tickets are single-use, so a retry would be
    /// invalid by protocol.
    ///
    /// # Errors
    ///
    /// Propagates the validator's error, or a storage error from the
    /// correlation registration.
    pub async fn validate_and_register(
        &self,
        ticket: &Ticket,
        session: Option<Arc<dyn SessionHandle>>,
    ) -> CasResult<Assertion> {
        let assertion = self
            .validator
            .validate(ticket.value(), &self.service_url)
            .await?;

        match session {
            Some(session) => {
                self.sessions.register(ticket.value(), session).await?;
            }
            None => {
                debug!(ticket = %ticket, "no session to correlate with validated ticket");
            }
        }

        info!(
            ticket = %ticket,
            principal = %assertion.principal.name,
            "ticket validated"
        );
        Ok(assertion)
    }

    /// The service URL tickets are validated against.
    #[must_use]
    pub fn service_url(&self) -> &str {
        &self.service_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::Principal;
    use crate::error::CasError;
    use crate::session::InMemorySessionCorrelationStore;
    use async_trait::async_trait;

    struct StaticValidator {
        outcome: Result<String, String>,
    }

    #[async_trait]
    impl TicketValidator for StaticValidator {
        async fn validate(&self, _ticket: &str, _service: &str) -> CasResult<Assertion> {
            match &self.outcome {
                Ok(principal) => Ok(Assertion::new(Principal::new(principal.clone()))),
                Err(code) => Err(CasError::validation_failure(code.clone(), "rejected")),
            }
        }
    }

    struct TestSession;

    impl SessionHandle for TestSession {
        fn id(&self) -> String {
            "S1".to_string()
        }

        fn invalidate(&self) {}
    }

    #[tokio::test]
    async fn test_success_registers_correlation() {
        let sessions = Arc::new(InMemorySessionCorrelationStore::new());
        let coordinator = TicketValidationCoordinator::new(
            Arc::new(StaticValidator {
                outcome: Ok("jsmith".to_string()),
            }),
            sessions.clone(),
            "https://app.example.com/",
        );

        let assertion = coordinator
            .validate_and_register(&Ticket::new("ST-1"), Some(Arc::new(TestSession)))
            .await
            .unwrap();

        assert_eq!(assertion.principal.name, "jsmith");
        assert!(sessions.resolve_and_remove("ST-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failure_propagates_without_registration() {
        let sessions = Arc::new(InMemorySessionCorrelationStore::new());
        let coordinator = TicketValidationCoordinator::new(
            Arc::new(StaticValidator {
                outcome: Err("INVALID_TICKET".to_string()),
            }),
            sessions.clone(),
            "https://app.example.com/",
        );

        let err = coordinator
            .validate_and_register(&Ticket::new("ST-1"), Some(Arc::new(TestSession)))
            .await
            .unwrap_err();

        assert!(err.is_user_visible());
        assert!(sessions.resolve_and_remove("ST-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_success_without_session() {
        let sessions = Arc::new(InMemorySessionCorrelationStore::new());
        let coordinator = TicketValidationCoordinator::new(
            Arc::new(StaticValidator {
                outcome: Ok("jsmith".to_string()),
            }),
            sessions.clone(),
            "https://app.example.com/",
        );

        coordinator
            .validate_and_register(&Ticket::new("ST-1"), None)
            .await
            .unwrap();

        assert!(sessions.resolve_and_remove("ST-1").await.unwrap().is_none());
    }
}
