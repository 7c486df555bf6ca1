//! Session-to-ticket correlation storage.
//!
//! Maps the ticket id issued by the authentication server to the local
//! session established for it, so that a later logout notice naming the
//! ticket can find and invalidate the session. A reverse index (session
//! id to ticket id) supports removal when a session terminates locally
//! without the ticket id in hand.
//!
//! # Implementation Notes
//!
//! Implementations must keep the forward and reverse entries consistent:
//! both present or both absent. Absence is reported as `Ok(None)` or a
//! no-op, never an error.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::CasResult;
use crate::session::SessionHandle;

/// Storage trait correlating server-issued ticket ids with local sessions.
///
/// Operations on a given ticket id are linearizable: a `register` that
/// completes before `resolve_and_remove` is invoked is observed by it,
/// and exactly one caller observes any given entry.
#[async_trait]
pub trait SessionCorrelationStorage: Send + Sync {
    /// Registers `ticket_id -> session`, superseding any prior ticket
    /// registered for the same session id (normal re-authentication).
    async fn register(&self, ticket_id: &str, session: Arc<dyn SessionHandle>) -> CasResult<()>;

    /// Atomically removes and returns the session mapped to `ticket_id`.
    ///
    /// Returns `Ok(None)` if no entry exists; a second call for the same
    /// ticket id always returns `Ok(None)`.
    async fn resolve_and_remove(
        &self,
        ticket_id: &str,
    ) -> CasResult<Option<Arc<dyn SessionHandle>>>;

    /// Removes the entry for `session_id`, if any, clearing the ticket
    /// mapping that points at it. Unknown session ids are a no-op.
    async fn remove_by_session_id(&self, session_id: &str) -> CasResult<()>;
}

struct CorrelatedSession {
    /// Session id captured at registration time; the handle may become
    /// unusable after invalidation.
    session_id: String,
    handle: Arc<dyn SessionHandle>,
}

#[derive(Default)]
struct CorrelationMaps {
    /// Ticket id issued by the authentication server -> session.
    by_ticket: HashMap<String, CorrelatedSession>,
    /// Session id -> ticket id, for removal without the ticket in hand.
    by_session: HashMap<String, String>,
}

/// In-memory correlation store.
///
/// Both maps are guarded by a single mutex so that no operation observes
/// a partially-updated pair. Soft state only: entries do not survive the
/// process.
#[derive(Default)]
pub struct InMemorySessionCorrelationStore {
    maps: Mutex<CorrelationMaps>,
}

impl InMemorySessionCorrelationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionCorrelationStorage for InMemorySessionCorrelationStore {
    async fn register(&self, ticket_id: &str, session: Arc<dyn SessionHandle>) -> CasResult<()> {
        let session_id = session.id();
        let mut maps = self.maps.lock().await;

        // Last registration for a session wins: drop any prior ticket
        // mapped to this session.
        if let Some(prior_ticket) = maps.by_session.remove(&session_id) {
            maps.by_ticket.remove(&prior_ticket);
        }

        // A re-issued ticket id displaces whatever it pointed at.
        if let Some(prior) = maps.by_ticket.insert(
            ticket_id.to_string(),
            CorrelatedSession {
                session_id: session_id.clone(),
                handle: session,
            },
        ) && prior.session_id != session_id
        {
            maps.by_session.remove(&prior.session_id);
        }

        maps.by_session.insert(session_id.clone(), ticket_id.to_string());

        debug!(ticket_id, session_id = %session_id, "registered session correlation");
        Ok(())
    }

    async fn resolve_and_remove(
        &self,
        ticket_id: &str,
    ) -> CasResult<Option<Arc<dyn SessionHandle>>> {
        let mut maps = self.maps.lock().await;

        let Some(entry) = maps.by_ticket.remove(ticket_id) else {
            return Ok(None);
        };

        match maps.by_session.remove(&entry.session_id) {
            Some(mapped) if mapped == ticket_id => Ok(Some(entry.handle)),
            mapped => {
                if let Some(other_ticket) = mapped {
                    // The reverse index pointed at a different ticket;
                    // restore it rather than clobber that registration.
                    maps.by_session
                        .insert(entry.session_id.clone(), other_ticket);
                }
                error!(
                    ticket_id,
                    session_id = %entry.session_id,
                    "forward/reverse correlation mismatch, treating as not found"
                );
                debug_assert!(
                    false,
                    "forward/reverse correlation mismatch for ticket {ticket_id}"
                );
                Ok(None)
            }
        }
    }

    async fn remove_by_session_id(&self, session_id: &str) -> CasResult<()> {
        let mut maps = self.maps.lock().await;

        let Some(ticket_id) = maps.by_session.remove(session_id) else {
            debug!(session_id, "no correlation for session, ignoring");
            return Ok(());
        };

        if maps.by_ticket.remove(&ticket_id).is_none() {
            error!(
                session_id,
                ticket_id, "reverse index named a ticket with no forward entry"
            );
            debug_assert!(
                false,
                "reverse index named a ticket with no forward entry: {ticket_id}"
            );
        } else {
            debug!(session_id, ticket_id, "removed session correlation");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct TestSession {
        id: String,
        invalidated: AtomicBool,
    }

    impl TestSession {
        fn new(id: &str) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_string(),
                invalidated: AtomicBool::new(false),
            })
        }
    }

    impl SessionHandle for TestSession {
        fn id(&self) -> String {
            self.id.clone()
        }

        fn invalidate(&self) {
            self.invalidated.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_register_then_resolve() {
        let store = InMemorySessionCorrelationStore::new();
        let session = TestSession::new("S1");

        store.register("ST-1", session.clone()).await.unwrap();

        let resolved = store.resolve_and_remove("ST-1").await.unwrap();
        assert_eq!(resolved.unwrap().id(), "S1");

        // Exactly one caller observes an entry.
        assert!(store.resolve_and_remove("ST-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_unknown_ticket() {
        let store = InMemorySessionCorrelationStore::new();
        assert!(store.resolve_and_remove("ST-missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_by_session_id_clears_ticket_entry() {
        let store = InMemorySessionCorrelationStore::new();
        let session = TestSession::new("S1");

        store.register("ST-1", session).await.unwrap();
        store.remove_by_session_id("S1").await.unwrap();

        assert!(store.resolve_and_remove("ST-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_unknown_session_is_noop() {
        let store = InMemorySessionCorrelationStore::new();
        store.remove_by_session_id("never-seen").await.unwrap();
    }

    #[tokio::test]
    async fn test_last_registration_for_session_wins() {
        let store = InMemorySessionCorrelationStore::new();
        let session = TestSession::new("S1");

        store.register("ST-1", session.clone()).await.unwrap();
        store.register("ST-2", session).await.unwrap();

        assert!(store.resolve_and_remove("ST-1").await.unwrap().is_none());
        let resolved = store.resolve_and_remove("ST-2").await.unwrap();
        assert_eq!(resolved.unwrap().id(), "S1");
    }

    #[tokio::test]
    async fn test_reissued_ticket_displaces_other_session() {
        let store = InMemorySessionCorrelationStore::new();
        let first = TestSession::new("S1");
        let second = TestSession::new("S2");

        store.register("ST-1", first).await.unwrap();
        store.register("ST-1", second).await.unwrap();

        let resolved = store.resolve_and_remove("ST-1").await.unwrap();
        assert_eq!(resolved.unwrap().id(), "S2");

        // S1's reverse entry went with its displaced forward entry.
        store.remove_by_session_id("S1").await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_register_and_resolve() {
        let store = Arc::new(InMemorySessionCorrelationStore::new());

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let ticket = format!("ST-{i}");
                let session = TestSession::new(&format!("S{i}"));
                store.register(&ticket, session).await.unwrap();
                store.resolve_and_remove(&ticket).await.unwrap().is_some()
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap());
        }
    }
}
