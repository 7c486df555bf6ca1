//! Proxy-granting-ticket storage.
//!
//! The authentication server returns a PGT IOU synchronously with the
//! validation response and delivers the real PGT out-of-band on the
//! proxy callback channel. This store correlates the two until the PGT
//! is consumed for proxy-ticket issuance or reclaimed by TTL.
//!
//! # Implementation Notes
//!
//! - `consume` must be atomic: exactly one caller obtains a given PGT.
//! - Consuming an unknown or already-consumed IOU yields `Ok(None)`,
//!   never an error.
//! - Expiry is best-effort eventual: a read between expiry and the next
//!   sweep may still observe the entry.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use crate::CasResult;

/// Storage trait for PGT IOU to PGT correlation.
#[async_trait]
pub trait ProxyGrantingTicketStorage: Send + Sync {
    /// Records `pgt_iou -> pgt` with the current timestamp, silently
    /// overwriting an existing entry for the same IOU.
    async fn save(&self, pgt_iou: &str, pgt: &str) -> CasResult<()>;

    /// Non-consuming lookup.
    async fn retrieve(&self, pgt_iou: &str) -> CasResult<Option<String>>;

    /// Atomically removes and returns the PGT for `pgt_iou`.
    ///
    /// Idempotent: unknown or already-consumed IOUs yield `Ok(None)`.
    async fn consume(&self, pgt_iou: &str) -> CasResult<Option<String>>;

    /// Idempotent deletion.
    async fn remove(&self, pgt_iou: &str) -> CasResult<()>;

    /// Removes every entry older than the store's TTL at the time of
    /// the call. Returns the number of entries removed.
    ///
    /// Safe to invoke concurrently with the other operations; entries
    /// created after the scan began are never removed.
    async fn clean_up(&self) -> CasResult<u64>;
}

struct PgtEntry {
    pgt: String,
    created_at: Instant,
}

/// In-memory PGT store with TTL-based expiry.
///
/// Backed by a sharded map so that request threads and the reaper
/// contend only on the touched shard, never on a store-wide lock.
pub struct InMemoryProxyGrantingTicketStore {
    entries: DashMap<String, PgtEntry>,
    ttl: Duration,
}

impl InMemoryProxyGrantingTicketStore {
    /// Creates a store whose entries expire after `ttl`.
    ///
    /// The TTL is an operational parameter with no sensible universal
    /// default; see [`crate::config::ProxyConfig`].
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Number of live entries, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ProxyGrantingTicketStorage for InMemoryProxyGrantingTicketStore {
    async fn save(&self, pgt_iou: &str, pgt: &str) -> CasResult<()> {
        self.entries.insert(
            pgt_iou.to_string(),
            PgtEntry {
                pgt: pgt.to_string(),
                created_at: Instant::now(),
            },
        );
        debug!(pgt_iou, "stored proxy-granting ticket");
        Ok(())
    }

    async fn retrieve(&self, pgt_iou: &str) -> CasResult<Option<String>> {
        Ok(self.entries.get(pgt_iou).map(|entry| entry.pgt.clone()))
    }

    async fn consume(&self, pgt_iou: &str) -> CasResult<Option<String>> {
        let consumed = self.entries.remove(pgt_iou).map(|(_, entry)| entry.pgt);
        if consumed.is_some() {
            debug!(pgt_iou, "consumed proxy-granting ticket");
        }
        Ok(consumed)
    }

    async fn remove(&self, pgt_iou: &str) -> CasResult<()> {
        self.entries.remove(pgt_iou);
        Ok(())
    }

    async fn clean_up(&self) -> CasResult<u64> {
        let ttl = self.ttl;
        let mut removed = 0u64;
        self.entries.retain(|_, entry| {
            let keep = entry.created_at.elapsed() <= ttl;
            if !keep {
                removed += 1;
            }
            keep
        });
        if removed > 0 {
            debug!(removed, "reclaimed expired proxy-granting tickets");
        }
        Ok(removed)
    }
}
