//! Subscription registry.

use parking_lot::RwLock;

use mqlite_admin_core::page::window;
use mqlite_admin_core::{OrderedRegistry, Page, Subscription, SubscriptionRecord};

/// Identifies one subscription: the owning client plus the full topic filter.
///
/// Kept as a pair so that no client ID / filter combination can collide
/// with another, whatever characters either contains.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionKey {
    pub client_id: String,
    pub topic_filter: String,
}

impl SubscriptionKey {
    pub fn new(client_id: &str, topic_filter: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            topic_filter: topic_filter.to_string(),
        }
    }
}

/// Active subscriptions of all clients, in subscribe order.
#[derive(Default)]
pub struct SubscriptionStore {
    subscriptions: RwLock<OrderedRegistry<SubscriptionKey, SubscriptionRecord>>,
}

impl SubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a subscription. Re-subscribing to the same filter updates the
    /// existing record in place.
    pub fn add_subscription(&self, client_id: &str, subscription: &Subscription) {
        let record = SubscriptionRecord::new(client_id, subscription);
        let key = SubscriptionKey {
            client_id: client_id.to_string(),
            topic_filter: record.topic_filter.clone(),
        };
        let replaced = self.subscriptions.write().set(key, record).is_some();
        log::debug!(
            "Admin: {} subscription {} for {}",
            if replaced { "updated" } else { "added" },
            subscription.full_topic_filter(),
            client_id
        );
    }

    /// Remove the subscription of `client_id` to the full `topic_filter`.
    /// Returns whether it existed.
    pub fn remove_subscription(&self, client_id: &str, topic_filter: &str) -> bool {
        let key = SubscriptionKey::new(client_id, topic_filter);
        let removed = self.subscriptions.write().remove(&key).is_some();
        if removed {
            log::debug!("Admin: removed subscription {} for {}", topic_filter, client_id);
        }
        removed
    }

    /// Remove every subscription owned by `client_id`, e.g. when its session
    /// is destroyed. Returns the number removed.
    pub fn remove_client_subscriptions(&self, client_id: &str) -> usize {
        let removed = self
            .subscriptions
            .write()
            .retain(|key, _| key.client_id != client_id);
        if removed > 0 {
            log::debug!("Admin: removed {} subscriptions for {}", removed, client_id);
        }
        removed
    }

    /// One page of subscriptions in insertion order.
    pub fn list(&self, page: usize, page_size: usize) -> Page<SubscriptionRecord> {
        let (start, size) = window(page, page_size);
        let subscriptions = self.subscriptions.read();
        Page {
            items: subscriptions
                .window(start, size)
                .map(|(_, record)| record.clone())
                .collect(),
            total_count: subscriptions.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.subscriptions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.read().is_empty()
    }
}
