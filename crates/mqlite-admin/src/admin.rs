//! Administrative query boundary.
//!
//! `Admin` is what a transport layer (HTTP, gRPC, ...) calls into. It owns the
//! client and subscription stores, hands out the hooks that feed them, and
//! validates and normalizes requests before they reach the stores.

use std::sync::Arc;

use mqlite_admin_core::{ClientRecord, Page, PageRequest, SubscriptionRecord};

use crate::config::AdminConfig;
use crate::error::{AdminError, Result};
use crate::hooks::AdminHooks;
use crate::stats::StatsReader;
use crate::store::{ClientStore, SubscriptionStore};

/// Broker-side session control used by `delete_client`.
pub trait SessionControl: Send + Sync {
    /// Destroy the session and all state it owns, including subscriptions.
    fn terminate_session(&self, client_id: &str);

    /// Close the client's transport, keeping a persistent session.
    /// Returns `false` if the client has no open connection.
    fn close_connection(&self, client_id: &str) -> bool;
}

/// The admin API over the client and subscription stores.
pub struct Admin {
    config: AdminConfig,
    clients: Arc<ClientStore>,
    subscriptions: Arc<SubscriptionStore>,
    sessions: Arc<dyn SessionControl>,
}

impl Admin {
    pub fn new(
        config: AdminConfig,
        stats: Arc<dyn StatsReader>,
        sessions: Arc<dyn SessionControl>,
    ) -> Self {
        Self {
            config,
            clients: Arc::new(ClientStore::new(stats)),
            subscriptions: Arc::new(SubscriptionStore::new()),
            sessions,
        }
    }

    /// Hooks to register with the broker so the stores track its state.
    pub fn hooks(&self) -> AdminHooks {
        AdminHooks::new(Arc::clone(&self.clients), Arc::clone(&self.subscriptions))
    }

    pub fn clients(&self) -> &Arc<ClientStore> {
        &self.clients
    }

    pub fn subscriptions(&self) -> &Arc<SubscriptionStore> {
        &self.subscriptions
    }

    fn page_request(&self, page: u32, page_size: u32) -> PageRequest {
        PageRequest::normalize(
            page,
            page_size,
            self.config.default_page_size,
            self.config.max_page_size,
        )
    }

    /// List client sessions, connected or not.
    pub fn list_clients(&self, page: u32, page_size: u32) -> Page<ClientRecord> {
        let req = self.page_request(page, page_size);
        self.clients.list(req.page, req.page_size)
    }

    pub fn get_client(&self, client_id: &str) -> Result<ClientRecord> {
        if client_id.is_empty() {
            return Err(AdminError::invalid_argument("client_id", client_id));
        }
        self.clients
            .get(client_id)
            .ok_or_else(|| AdminError::NotFound(client_id.to_string()))
    }

    /// Force a client off the broker.
    ///
    /// With `clean_session` the whole session is terminated; otherwise only
    /// the connection is closed and a persistent session stays listed with
    /// `disconnected_at` set.
    pub fn delete_client(&self, client_id: &str, clean_session: bool) -> Result<()> {
        if client_id.is_empty() {
            return Err(AdminError::invalid_argument("client_id", client_id));
        }
        if clean_session {
            log::info!("Admin: terminating session of {}", client_id);
            self.sessions.terminate_session(client_id);
        } else if self.sessions.close_connection(client_id) {
            log::info!("Admin: closed connection of {}", client_id);
        } else {
            log::debug!("Admin: {} has no open connection to close", client_id);
        }
        Ok(())
    }

    pub fn list_subscriptions(&self, page: u32, page_size: u32) -> Page<SubscriptionRecord> {
        let req = self.page_request(page, page_size);
        self.subscriptions.list(req.page, req.page_size)
    }
}
