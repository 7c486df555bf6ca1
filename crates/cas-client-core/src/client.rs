//! Composition root.
//!
//! Wires the stores, coordinator, handler and reaper as explicit
//! constructed dependencies. Whatever composes the request-handling
//! pipeline owns a [`CasClient`] and its lifecycle; there is no
//! process-wide registry.

use std::sync::Arc;

use tracing::info;

use crate::CasResult;
use crate::config::CasConfig;
use crate::error::CasError;
use crate::logout::SingleLogoutHandler;
use crate::proxy::{
    CallbackDisposition, InMemoryProxyGrantingTicketStore, ProxyGrantingTicketStorage,
    ProxyTicketReaper, receive_callback,
};
use crate::session::{InMemorySessionCorrelationStore, SessionCorrelationStorage};
use crate::urls;
use crate::validation::{TicketValidationCoordinator, TicketValidator};

/// A fully wired CAS client.
pub struct CasClient {
    config: CasConfig,
    sessions: Arc<dyn SessionCorrelationStorage>,
    handler: Arc<SingleLogoutHandler>,
    proxy_storage: Option<Arc<dyn ProxyGrantingTicketStorage>>,
    reaper: Option<ProxyTicketReaper>,
}

impl CasClient {
    /// Validates `config` and constructs the client around the given
    /// external validator.
    ///
    /// # Errors
    ///
    /// Returns [`CasError::Configuration`] for an invalid configuration.
    pub fn new(config: CasConfig, validator: Arc<dyn TicketValidator>) -> CasResult<Self> {
        config.validate()?;

        let sessions: Arc<dyn SessionCorrelationStorage> =
            Arc::new(InMemorySessionCorrelationStore::new());
        let coordinator = Arc::new(TicketValidationCoordinator::new(
            validator,
            Arc::clone(&sessions),
            config.server.service_url.clone(),
        ));
        let handler = Arc::new(SingleLogoutHandler::new(
            &config,
            Arc::clone(&sessions),
            coordinator,
        ));

        let (proxy_storage, reaper) = match &config.proxy {
            Some(proxy) => {
                let storage: Arc<dyn ProxyGrantingTicketStorage> =
                    Arc::new(InMemoryProxyGrantingTicketStore::new(proxy.storage_ttl));
                let reaper =
                    ProxyTicketReaper::new(Arc::clone(&storage), proxy.reaper_interval);
                (Some(storage), Some(reaper))
            }
            None => (None, None),
        };

        Ok(Self {
            config,
            sessions,
            handler,
            proxy_storage,
            reaper,
        })
    }

    /// Starts background work (the reaper, when proxy support is
    /// configured).
    ///
    /// # Errors
    ///
    /// Propagates reaper startup errors.
    pub fn start(&mut self) -> CasResult<()> {
        if let Some(reaper) = &mut self.reaper {
            reaper.start()?;
        }
        info!("CAS client started");
        Ok(())
    }

    /// Stops background work, waiting for any in-flight sweep.
    pub async fn shutdown(&mut self) {
        if let Some(reaper) = &mut self.reaper {
            reaper.stop().await;
        }
        info!("CAS client stopped");
    }

    /// The request handler.
    #[must_use]
    pub fn handler(&self) -> Arc<SingleLogoutHandler> {
        Arc::clone(&self.handler)
    }

    /// The session correlation store.
    #[must_use]
    pub fn sessions(&self) -> Arc<dyn SessionCorrelationStorage> {
        Arc::clone(&self.sessions)
    }

    /// The PGT store, when proxy support is configured.
    #[must_use]
    pub fn proxy_storage(&self) -> Option<Arc<dyn ProxyGrantingTicketStorage>> {
        self.proxy_storage.as_ref().map(Arc::clone)
    }

    /// Accepts a `(pgtIou, pgtId)` delivery on the proxy callback
    /// channel.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if proxy support is not configured,
    /// or a storage error from the save.
    pub async fn receive_proxy_callback(
        &self,
        pgt_iou: Option<&str>,
        pgt: Option<&str>,
    ) -> CasResult<CallbackDisposition> {
        let storage = self
            .proxy_storage
            .as_deref()
            .ok_or_else(|| CasError::configuration("proxy support is not configured"))?;
        receive_callback(storage, pgt_iou, pgt).await
    }

    /// The login redirect URL for an unauthenticated request.
    #[must_use]
    pub fn login_redirect_url(&self) -> String {
        urls::login_redirect_url(
            &self.config.server.login_url(),
            self.config.protocol.service_parameter(),
            &self.config.server.service_url,
            self.config.renew,
            self.config.gateway,
        )
    }

    /// The resolved configuration.
    #[must_use]
    pub fn config(&self) -> &CasConfig {
        &self.config
    }
}
