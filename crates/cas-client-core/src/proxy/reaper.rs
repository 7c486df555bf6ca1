//! Background reclamation of expired proxy-granting tickets.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, info, warn};

use crate::CasResult;
use crate::error::CasError;
use crate::proxy::storage::ProxyGrantingTicketStorage;

/// Periodic sweeper that evicts expired entries from a
/// [`ProxyGrantingTicketStorage`].
///
/// Runs on its own background task, independent of request handling.
/// The first sweep fires only after one full interval has elapsed from
/// [`start`](Self::start); a store that is empty at startup is not
/// scanned gratuitously.
///
/// `start` after `stop` is not supported; construct a fresh reaper.
pub struct ProxyTicketReaper {
    storage: Arc<dyn ProxyGrantingTicketStorage>,
    interval: Duration,
    shutdown: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl ProxyTicketReaper {
    /// Creates a reaper sweeping `storage` every `interval`.
    #[must_use]
    pub fn new(storage: Arc<dyn ProxyGrantingTicketStorage>, interval: Duration) -> Self {
        Self {
            storage,
            interval,
            shutdown: Arc::new(Notify::new()),
            task: None,
        }
    }

    /// Begins scheduling sweeps.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the interval is zero or the
    /// reaper is already running. Both are fail-fast startup errors.
    pub fn start(&mut self) -> CasResult<()> {
        if self.interval.is_zero() {
            return Err(CasError::configuration(
                "reaper interval must be greater than zero",
            ));
        }
        if self.task.as_ref().is_some_and(|task| !task.is_finished()) {
            return Err(CasError::configuration("reaper is already running"));
        }

        let storage = Arc::clone(&self.storage);
        let shutdown = Arc::clone(&self.shutdown);
        let interval = self.interval;
        let first_tick = Instant::now() + interval;

        self.task = Some(tokio::spawn(async move {
            // First tick one full interval after start.
            let mut ticker = interval_at(first_tick, interval);
            loop {
                tokio::select! {
                    biased;
                    () = shutdown.notified() => break,
                    _ = ticker.tick() => {
                        match storage.clean_up().await {
                            Ok(removed) => {
                                if removed > 0 {
                                    debug!(removed, "reaper sweep removed expired entries");
                                }
                            }
                            // One bad sweep must not disable future cleanup.
                            Err(error) => warn!(error = %error, "reaper sweep failed"),
                        }
                    }
                }
            }
            debug!("reaper stopped");
        }));

        info!(interval = ?self.interval, "proxy-granting-ticket reaper started");
        Ok(())
    }

    /// Cancels all future sweeps and waits for any in-flight sweep to
    /// complete.
    ///
    /// Safe to call without a prior [`start`](Self::start) and safe to
    /// call more than once.
    pub async fn stop(&mut self) {
        self.shutdown.notify_one();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Returns `true` if the background task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for ProxyTicketReaper {
    fn drop(&mut self) {
        // Let a still-running task wind down on its own.
        self.shutdown.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::storage::InMemoryProxyGrantingTicketStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};

    const INTERVAL: Duration = Duration::from_secs(60);
    const TTL: Duration = Duration::from_secs(10);

    async fn settle() {
        // Give the spawned sweep task a chance to observe the new time.
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_sweep_before_first_interval() {
        let storage = Arc::new(InMemoryProxyGrantingTicketStore::new(TTL));
        let mut reaper = ProxyTicketReaper::new(storage.clone(), INTERVAL);

        storage.save("PGTIOU-1", "PGT-1").await.unwrap();
        reaper.start().unwrap();

        // Entry is long expired, but no sweep may fire before one full
        // interval has elapsed.
        tokio::time::advance(INTERVAL - Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(
            storage.retrieve("PGTIOU-1").await.unwrap(),
            Some("PGT-1".to_string())
        );

        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(storage.retrieve("PGTIOU-1").await.unwrap(), None);

        reaper.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeps_repeat() {
        let storage = Arc::new(InMemoryProxyGrantingTicketStore::new(TTL));
        let mut reaper = ProxyTicketReaper::new(storage.clone(), INTERVAL);
        reaper.start().unwrap();

        tokio::time::advance(INTERVAL + Duration::from_secs(1)).await;
        settle().await;

        // Created after the first sweep, expired by the second.
        storage.save("PGTIOU-2", "PGT-2").await.unwrap();
        tokio::time::advance(INTERVAL).await;
        settle().await;
        assert_eq!(storage.retrieve("PGTIOU-2").await.unwrap(), None);

        reaper.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_prevents_future_sweeps() {
        let storage = Arc::new(InMemoryProxyGrantingTicketStore::new(TTL));
        let mut reaper = ProxyTicketReaper::new(storage.clone(), INTERVAL);
        reaper.start().unwrap();
        assert!(reaper.is_running());

        reaper.stop().await;
        assert!(!reaper.is_running());

        storage.save("PGTIOU-1", "PGT-1").await.unwrap();
        tokio::time::advance(INTERVAL * 3).await;
        settle().await;

        // Expired but never swept.
        assert_eq!(
            storage.retrieve("PGTIOU-1").await.unwrap(),
            Some("PGT-1".to_string())
        );
    }

    #[tokio::test]
    async fn test_stop_without_start() {
        let storage = Arc::new(InMemoryProxyGrantingTicketStore::new(TTL));
        let mut reaper = ProxyTicketReaper::new(storage, INTERVAL);
        reaper.stop().await;
        reaper.stop().await;
    }

    #[tokio::test]
    async fn test_zero_interval_is_fatal() {
        let storage = Arc::new(InMemoryProxyGrantingTicketStore::new(TTL));
        let mut reaper = ProxyTicketReaper::new(storage, Duration::ZERO);

        let err = reaper.start().unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_rejected() {
        let storage = Arc::new(InMemoryProxyGrantingTicketStore::new(TTL));
        let mut reaper = ProxyTicketReaper::new(storage, INTERVAL);

        reaper.start().unwrap();
        assert!(reaper.start().is_err());
        reaper.stop().await;
    }

    struct FailingStore {
        sweeps: AtomicU64,
    }

    #[async_trait]
    impl ProxyGrantingTicketStorage for FailingStore {
        async fn save(&self, _pgt_iou: &str, _pgt: &str) -> CasResult<()> {
            Ok(())
        }

        async fn retrieve(&self, _pgt_iou: &str) -> CasResult<Option<String>> {
            Ok(None)
        }

        async fn consume(&self, _pgt_iou: &str) -> CasResult<Option<String>> {
            Ok(None)
        }

        async fn remove(&self, _pgt_iou: &str) -> CasResult<()> {
            Ok(())
        }

        async fn clean_up(&self) -> CasResult<u64> {
            self.sweeps.fetch_add(1, Ordering::SeqCst);
            Err(CasError::storage("backend unavailable"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_sweep_does_not_stop_schedule() {
        let storage = Arc::new(FailingStore {
            sweeps: AtomicU64::new(0),
        });
        let mut reaper = ProxyTicketReaper::new(storage.clone(), INTERVAL);
        reaper.start().unwrap();

        for _ in 0..3 {
            tokio::time::advance(INTERVAL).await;
            settle().await;
        }
        reaper.stop().await;

        assert!(storage.sweeps.load(Ordering::SeqCst) >= 3);
    }
}
