//! Live per-client statistics and read-time enrichment.
//!
//! Workers update a client's counters on the hot path through the
//! `ClientMetrics` handle returned by `StatsManager::register`. The admin
//! stores never cache these values: every read copies the current snapshot
//! into the returned record via [`enrich`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;

use mqlite_admin_core::{ClientRecord, ClientStats};

/// Source of live per-client counters.
///
/// Implementations must not block and must not call back into the admin
/// stores; lookups run while a store lock is held.
pub trait StatsReader: Send + Sync {
    /// Current counters for `client_id`, or `None` if the broker has none.
    fn client_stats(&self, client_id: &str) -> Option<ClientStats>;
}

/// Overwrite the record's stats block with the source's current values.
///
/// When the source has no data for the client the block is left untouched.
#[inline]
pub fn enrich(record: &mut ClientRecord, source: &dyn StatsReader) {
    if let Some(stats) = source.client_stats(&record.client_id) {
        record.stats = stats;
    }
}

/// Per-client atomic counters.
/// Updated by workers on the hot path, read by admin queries.
#[derive(Debug, Default)]
pub struct ClientMetrics {
    subscriptions_current: AtomicU64,
    subscriptions_total: AtomicU64,
    bytes_received: AtomicU64,
    packets_received: AtomicU64,
    bytes_sent: AtomicU64,
    packets_sent: AtomicU64,
    messages_dropped: AtomicU64,
    inflight_current: AtomicU64,
    queued_current: AtomicU64,
}

impl ClientMetrics {
    pub const fn new() -> Self {
        Self {
            subscriptions_current: AtomicU64::new(0),
            subscriptions_total: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            packets_received: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            packets_sent: AtomicU64::new(0),
            messages_dropped: AtomicU64::new(0),
            inflight_current: AtomicU64::new(0),
            queued_current: AtomicU64::new(0),
        }
    }

    /// Count one received packet of `bytes` length.
    #[inline]
    pub fn packet_received(&self, bytes: u64) {
        self.packets_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Count one sent packet of `bytes` length.
    #[inline]
    pub fn packet_sent(&self, bytes: u64) {
        self.packets_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_messages_dropped(&self, n: u64) {
        self.messages_dropped.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn subscribed(&self) {
        self.subscriptions_current.fetch_add(1, Ordering::Relaxed);
        self.subscriptions_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Saturates at zero; a duplicate unsubscribe must not wrap the gauge.
    #[inline]
    pub fn unsubscribed(&self) {
        let _ = self
            .subscriptions_current
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                n.checked_sub(1)
            });
    }

    #[inline]
    pub fn set_inflight(&self, n: u64) {
        self.inflight_current.store(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn set_queued(&self, n: u64) {
        self.queued_current.store(n, Ordering::Relaxed);
    }

    /// Read all counters. Individual fields are loaded independently, so the
    /// snapshot is not atomic across fields.
    pub fn snapshot(&self) -> ClientStats {
        ClientStats {
            subscriptions_current: self.subscriptions_current.load(Ordering::Relaxed),
            subscriptions_total: self.subscriptions_total.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            packets_received: self.packets_received.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            packets_sent: self.packets_sent.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            inflight_current: self.inflight_current.load(Ordering::Relaxed),
            queued_current: self.queued_current.load(Ordering::Relaxed),
        }
    }
}

/// Broker-wide table of per-client metrics, keyed by client ID.
#[derive(Debug, Default)]
pub struct StatsManager {
    clients: RwLock<AHashMap<String, Arc<ClientMetrics>>>,
}

impl StatsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the metrics handle for `client_id`, creating it on first use.
    ///
    /// A resumed session keeps its existing counters.
    pub fn register(&self, client_id: &str) -> Arc<ClientMetrics> {
        if let Some(metrics) = self.clients.read().get(client_id) {
            return Arc::clone(metrics);
        }
        let mut clients = self.clients.write();
        Arc::clone(
            clients
                .entry(client_id.to_string())
                .or_insert_with(|| Arc::new(ClientMetrics::new())),
        )
    }

    /// Drop the counters of a destroyed session.
    pub fn deregister(&self, client_id: &str) -> bool {
        self.clients.write().remove(client_id).is_some()
    }

    pub fn metrics(&self, client_id: &str) -> Option<Arc<ClientMetrics>> {
        self.clients.read().get(client_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }
}

impl StatsReader for StatsManager {
    fn client_stats(&self, client_id: &str) -> Option<ClientStats> {
        self.clients.read().get(client_id).map(|m| m.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::connection::{new_client_record, ClientOptions, ConnectionInfo};
    use mqlite_admin_core::ProtocolVersion;

    fn record(client_id: &str) -> ClientRecord {
        new_client_record(&ConnectionInfo {
            options: ClientOptions {
                client_id: client_id.to_string(),
                ..Default::default()
            },
            version: ProtocolVersion::V311,
            local_addr: "127.0.0.1:1883".parse().unwrap(),
            remote_addr: "127.0.0.1:40000".parse().unwrap(),
            connected_at: SystemTime::now(),
        })
    }

    #[test]
    fn test_metrics_snapshot() {
        let metrics = ClientMetrics::new();
        metrics.packet_received(100);
        metrics.packet_received(50);
        metrics.packet_sent(10);
        metrics.add_messages_dropped(2);
        metrics.set_inflight(3);
        metrics.set_queued(7);

        let stats = metrics.snapshot();
        assert_eq!(stats.bytes_received, 150);
        assert_eq!(stats.packets_received, 2);
        assert_eq!(stats.bytes_sent, 10);
        assert_eq!(stats.packets_sent, 1);
        assert_eq!(stats.messages_dropped, 2);
        assert_eq!(stats.inflight_current, 3);
        assert_eq!(stats.queued_current, 7);
    }

    #[test]
    fn test_subscription_counts() {
        let metrics = ClientMetrics::new();
        metrics.subscribed();
        metrics.subscribed();
        metrics.unsubscribed();
        metrics.unsubscribed();
        metrics.unsubscribed();

        let stats = metrics.snapshot();
        assert_eq!(stats.subscriptions_current, 0);
        assert_eq!(stats.subscriptions_total, 2);
    }

    #[test]
    fn test_register_returns_same_handle() {
        let manager = StatsManager::new();
        let a = manager.register("c1");
        a.packet_received(5);
        let b = manager.register("c1");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(manager.len(), 1);

        assert!(manager.deregister("c1"));
        assert!(!manager.deregister("c1"));
        assert!(manager.is_empty());
        assert!(manager.client_stats("c1").is_none());
    }

    #[test]
    fn test_enrich_overwrites_stats() {
        let manager = StatsManager::new();
        manager.register("c1").packet_sent(64);

        let mut rec = record("c1");
        enrich(&mut rec, &manager);
        assert_eq!(rec.stats.bytes_sent, 64);
        assert_eq!(rec.stats.packets_sent, 1);

        // Counters move between reads; enrichment follows them
        manager.metrics("c1").unwrap().packet_sent(36);
        enrich(&mut rec, &manager);
        assert_eq!(rec.stats.bytes_sent, 100);
    }

    #[test]
    fn test_enrich_without_data_keeps_prior_stats() {
        let manager = StatsManager::new();
        let mut rec = record("unknown");
        rec.stats.messages_dropped = 9;

        enrich(&mut rec, &manager);
        assert_eq!(rec.stats.messages_dropped, 9);
    }
}
