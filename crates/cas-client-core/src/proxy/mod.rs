//! Delegated ("proxy") authority support.
//!
//! The authentication server delivers `(pgtIou, pgtId)` pairs
//! out-of-band to the application's proxy callback endpoint; the store
//! correlates them until consumed for proxy-ticket issuance or reclaimed
//! by the reaper.

pub mod reaper;
pub mod storage;

pub use reaper::ProxyTicketReaper;
pub use storage::{InMemoryProxyGrantingTicketStore, ProxyGrantingTicketStorage};

use tracing::debug;

use crate::CasResult;

/// Default name of the callback parameter carrying the PGT IOU.
pub const PGT_IOU_PARAMETER: &str = "pgtIou";
/// Default name of the callback parameter carrying the PGT.
pub const PGT_ID_PARAMETER: &str = "pgtId";

/// Conventional success body the callback endpoint returns to the
/// authentication server.
pub const PROXY_RECEPTOR_RESPONSE: &str =
    "<?xml version=\"1.0\"?>\n<casClient:proxySuccess xmlns:casClient=\"http://www.yale.edu/tp/casClient\"/>";

/// Outcome of a proxy callback delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackDisposition {
    /// Both parameters were present; the pair was stored.
    Stored,
    /// One or both parameters were missing. Not an error: the server
    /// probes the callback URL without parameters before issuing a PGT.
    Incomplete,
}

/// Accepts a `(pgtIou, pgt)` pair delivered on the callback channel.
///
/// The caller responds with [`PROXY_RECEPTOR_RESPONSE`] and status 200
/// in either disposition.
///
/// # Errors
///
/// Returns an error only if the underlying store fails to persist the
/// pair.
pub async fn receive_callback(
    storage: &dyn ProxyGrantingTicketStorage,
    pgt_iou: Option<&str>,
    pgt: Option<&str>,
) -> CasResult<CallbackDisposition> {
    match (pgt_iou, pgt) {
        (Some(iou), Some(pgt)) if !iou.is_empty() && !pgt.is_empty() => {
            storage.save(iou, pgt).await?;
            Ok(CallbackDisposition::Stored)
        }
        _ => {
            debug!("proxy callback without a complete pgtIou/pgtId pair, ignoring");
            Ok(CallbackDisposition::Incomplete)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_callback_stores_complete_pair() {
        let store = InMemoryProxyGrantingTicketStore::new(Duration::from_secs(60));

        let disposition = receive_callback(&store, Some("PGTIOU-1"), Some("PGT-1"))
            .await
            .unwrap();

        assert_eq!(disposition, CallbackDisposition::Stored);
        assert_eq!(
            store.retrieve("PGTIOU-1").await.unwrap(),
            Some("PGT-1".to_string())
        );
    }

    #[tokio::test]
    async fn test_callback_probe_is_ignored() {
        let store = InMemoryProxyGrantingTicketStore::new(Duration::from_secs(60));

        for (iou, pgt) in [(None, None), (Some("PGTIOU-1"), None), (None, Some("PGT-1"))] {
            let disposition = receive_callback(&store, iou, pgt).await.unwrap();
            assert_eq!(disposition, CallbackDisposition::Incomplete);
        }
        assert!(store.is_empty());
    }
}
