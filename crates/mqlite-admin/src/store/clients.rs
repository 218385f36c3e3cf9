//! Client session registry.

use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;

use mqlite_admin_core::page::window;
use mqlite_admin_core::{ClientRecord, OrderedRegistry, Page};

use crate::connection::{new_client_record, ClientConnection};
use crate::stats::{enrich, StatsReader};

/// Clients with a live session, connected or not, in first-seen order.
pub struct ClientStore {
    clients: RwLock<OrderedRegistry<String, ClientRecord>>,
    stats: Arc<dyn StatsReader>,
}

impl ClientStore {
    pub fn new(stats: Arc<dyn StatsReader>) -> Self {
        Self {
            clients: RwLock::new(OrderedRegistry::new()),
            stats,
        }
    }

    /// Record a newly accepted connection.
    ///
    /// On session takeover or resumption the existing record is replaced and
    /// keeps its list position.
    pub fn add_client(&self, client: &dyn ClientConnection) {
        let record = new_client_record(client);
        let client_id = record.client_id.clone();
        let replaced = self.clients.write().set(client_id, record).is_some();
        if replaced {
            log::debug!("Admin: replaced client record {}", client.options().client_id);
        } else {
            log::debug!("Admin: added client record {}", client.options().client_id);
        }
    }

    /// Stamp `disconnected_at` for a client whose session outlives its
    /// transport. Unknown clients are ignored.
    pub fn set_disconnected(&self, client_id: &str) {
        let mut clients = self.clients.write();
        if let Some(record) = clients.get_mut(client_id) {
            record.disconnected_at = Some(SystemTime::now());
            log::debug!("Admin: client {} disconnected", client_id);
        }
    }

    /// Drop the record of a destroyed session. Returns whether one existed.
    pub fn remove_client(&self, client_id: &str) -> bool {
        let removed = self.clients.write().remove(client_id).is_some();
        if removed {
            log::debug!("Admin: removed client record {}", client_id);
        }
        removed
    }

    /// Copy of the client's record with live stats, if known.
    pub fn get(&self, client_id: &str) -> Option<ClientRecord> {
        let clients = self.clients.read();
        let mut record = clients.get(client_id)?.clone();
        enrich(&mut record, self.stats.as_ref());
        Some(record)
    }

    /// One page of clients in insertion order, each with live stats.
    ///
    /// `page` is 1-based. A page past the end yields no items; the total
    /// count is always returned.
    pub fn list(&self, page: usize, page_size: usize) -> Page<ClientRecord> {
        let (start, size) = window(page, page_size);
        let clients = self.clients.read();
        let items = clients
            .window(start, size)
            .map(|(_, record)| {
                let mut record = record.clone();
                enrich(&mut record, self.stats.as_ref());
                record
            })
            .collect();
        Page {
            items,
            total_count: clients.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }
}
