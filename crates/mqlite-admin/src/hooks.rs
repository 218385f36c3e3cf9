//! Broker lifecycle hooks that keep the admin stores in sync.

use std::sync::Arc;

use mqlite_admin_core::Subscription;

use crate::connection::ClientConnection;
use crate::store::{ClientStore, SubscriptionStore};

/// Why a session was destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// Clean session end, or terminated by the admin API.
    Normal,
    /// Another connection took over the client ID.
    TakenOver,
    /// Session expiry interval elapsed while disconnected.
    Expired,
}

/// Session and subscription events emitted by the broker.
///
/// All methods default to no-ops so implementors only handle what they need.
/// Hooks are invoked from worker threads and must not block.
pub trait BrokerHooks: Send + Sync {
    fn on_session_created(&self, _client: &dyn ClientConnection) {}

    fn on_session_resumed(&self, _client: &dyn ClientConnection) {}

    /// The transport closed. The session may live on.
    fn on_closed(&self, _client_id: &str) {}

    fn on_session_terminated(&self, _client_id: &str, _reason: TerminationReason) {}

    fn on_subscribed(&self, _client_id: &str, _subscription: &Subscription) {}

    /// `topic_filter` is the full filter, including any share prefix.
    fn on_unsubscribed(&self, _client_id: &str, _topic_filter: &str) {}
}

/// Hooks feeding the admin client and subscription stores.
#[derive(Clone)]
pub struct AdminHooks {
    clients: Arc<ClientStore>,
    subscriptions: Arc<SubscriptionStore>,
}

impl AdminHooks {
    pub fn new(clients: Arc<ClientStore>, subscriptions: Arc<SubscriptionStore>) -> Self {
        Self {
            clients,
            subscriptions,
        }
    }
}

impl BrokerHooks for AdminHooks {
    fn on_session_created(&self, client: &dyn ClientConnection) {
        self.clients.add_client(client);
    }

    fn on_session_resumed(&self, client: &dyn ClientConnection) {
        self.clients.add_client(client);
    }

    fn on_closed(&self, client_id: &str) {
        self.clients.set_disconnected(client_id);
    }

    fn on_session_terminated(&self, client_id: &str, reason: TerminationReason) {
        // On takeover the new connection already owns the record.
        if reason != TerminationReason::TakenOver {
            self.clients.remove_client(client_id);
        }
    }

    fn on_subscribed(&self, client_id: &str, subscription: &Subscription) {
        self.subscriptions.add_subscription(client_id, subscription);
    }

    fn on_unsubscribed(&self, client_id: &str, topic_filter: &str) {
        self.subscriptions.remove_subscription(client_id, topic_filter);
    }
}
