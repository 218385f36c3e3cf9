//! Persistence contract for broker backends.
//!
//! The admin stores are volatile and rebuilt from live broker state; they do
//! not use this module. It declares what a durable backend must provide so
//! the broker can obtain per-client message queues and a subscription store,
//! and a factory table to build the backend named in configuration.
//!
//! ```text
//! Config.persistence.backend ──► PersistenceFactories ──► dyn PersistenceFactory
//!                                                              │ create(config, hooks)
//!                                                              ▼
//!                                                       dyn Persistence
//!                                         new_queue_store │   │ new_subscription_store
//!                                                         ▼   ▼
//!                                         dyn QueueStore    dyn SubscriptionBackend
//! ```

use std::sync::Arc;

use ahash::AHashMap;

use mqlite_admin_core::{QoS, Subscription};

use crate::config::Config;
use crate::connection::ClientConnection;
use crate::hooks::BrokerHooks;

/// A message queued for delivery to one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    /// Assigned once the message is in flight.
    pub packet_id: Option<u16>,
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: QoS,
    pub retain: bool,
}

/// Per-client outbound message queue.
pub trait QueueStore: Send {
    /// Prepare the queue for a (re)connected client. A clean start drops
    /// everything queued for the previous session.
    fn init(&mut self, clean_start: bool) -> Result<(), PersistenceError>;

    fn add(&mut self, message: QueuedMessage) -> Result<(), PersistenceError>;

    /// Remove the in-flight message with `packet_id` once acknowledged.
    fn remove(&mut self, packet_id: u16) -> Result<Option<QueuedMessage>, PersistenceError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn close(&mut self) -> Result<(), PersistenceError>;
}

/// Durable subscription state shared by all clients.
pub trait SubscriptionBackend: Send + Sync {
    fn subscribe(
        &self,
        client_id: &str,
        subscription: &Subscription,
    ) -> Result<(), PersistenceError>;

    /// `topic_filter` is the full filter, including any share prefix.
    fn unsubscribe(&self, client_id: &str, topic_filter: &str) -> Result<(), PersistenceError>;

    fn unsubscribe_all(&self, client_id: &str) -> Result<(), PersistenceError>;

    fn close(&self) -> Result<(), PersistenceError>;
}

/// A persistence backend.
pub trait Persistence: Send + Sync {
    fn open(&mut self) -> Result<(), PersistenceError>;

    fn new_queue_store(
        &self,
        config: &Config,
        client: &dyn ClientConnection,
    ) -> Result<Box<dyn QueueStore>, PersistenceError>;

    fn new_subscription_store(&self, config: &Config) -> Box<dyn SubscriptionBackend>;

    fn close(&mut self) -> Result<(), PersistenceError>;
}

/// Builds a [`Persistence`] backend from configuration and broker hooks.
pub trait PersistenceFactory: Send + Sync {
    fn create(
        &self,
        config: &Config,
        hooks: Arc<dyn BrokerHooks>,
    ) -> Result<Box<dyn Persistence>, PersistenceError>;
}

/// Registered persistence factories, by backend name.
#[derive(Default)]
pub struct PersistenceFactories {
    factories: AHashMap<String, Box<dyn PersistenceFactory>>,
}

impl PersistenceFactories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`, replacing any previous one.
    pub fn register(&mut self, name: &str, factory: Box<dyn PersistenceFactory>) {
        if self.factories.insert(name.to_string(), factory).is_some() {
            log::warn!("Persistence factory {} registered twice, keeping the latest", name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Build and open the backend named by `config.persistence.backend`.
    pub fn build(
        &self,
        config: &Config,
        hooks: Arc<dyn BrokerHooks>,
    ) -> Result<Box<dyn Persistence>, PersistenceError> {
        let name = config.persistence.backend.as_str();
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| PersistenceError::UnknownBackend(name.to_string()))?;

        let mut persistence = factory.create(config, hooks)?;
        persistence.open()?;
        log::info!("Persistence backend {} opened", name);
        Ok(persistence)
    }
}

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// No factory registered under the configured backend name
    UnknownBackend(String),
    /// Failed to open the backend
    Open(String),
    /// Failed to read from the backend
    Read(String),
    /// Failed to write to the backend
    Write(String),
    /// Operation on a closed backend or store
    Closed,
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBackend(name) => write!(f, "unknown persistence backend: {}", name),
            Self::Open(e) => write!(f, "failed to open persistence backend: {}", e),
            Self::Read(e) => write!(f, "read error: {}", e),
            Self::Write(e) => write!(f, "write error: {}", e),
            Self::Closed => write!(f, "persistence backend is closed"),
        }
    }
}

impl std::error::Error for PersistenceError {}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::SystemTime;

    use parking_lot::Mutex;

    use super::*;
    use crate::connection::{ClientOptions, ConnectionInfo};
    use mqlite_admin_core::ProtocolVersion;

    /// Queue kept in memory, for exercising the contract.
    #[derive(Default)]
    struct VecQueue {
        messages: VecDeque<QueuedMessage>,
        closed: bool,
    }

    impl QueueStore for VecQueue {
        fn init(&mut self, clean_start: bool) -> Result<(), PersistenceError> {
            if clean_start {
                self.messages.clear();
            }
            self.closed = false;
            Ok(())
        }

        fn add(&mut self, message: QueuedMessage) -> Result<(), PersistenceError> {
            if self.closed {
                return Err(PersistenceError::Closed);
            }
            self.messages.push_back(message);
            Ok(())
        }

        fn remove(&mut self, packet_id: u16) -> Result<Option<QueuedMessage>, PersistenceError> {
            let pos = self
                .messages
                .iter()
                .position(|m| m.packet_id == Some(packet_id));
            Ok(pos.and_then(|p| self.messages.remove(p)))
        }

        fn len(&self) -> usize {
            self.messages.len()
        }

        fn close(&mut self) -> Result<(), PersistenceError> {
            self.closed = true;
            Ok(())
        }
    }

    #[derive(Default)]
    struct MapSubscriptions {
        subs: Mutex<Vec<(String, String)>>,
    }

    impl SubscriptionBackend for MapSubscriptions {
        fn subscribe(
            &self,
            client_id: &str,
            subscription: &Subscription,
        ) -> Result<(), PersistenceError> {
            let filter = subscription.full_topic_filter();
            let mut subs = self.subs.lock();
            if !subs.iter().any(|(c, f)| c == client_id && *f == filter) {
                subs.push((client_id.to_string(), filter));
            }
            Ok(())
        }

        fn unsubscribe(&self, client_id: &str, topic_filter: &str) -> Result<(), PersistenceError> {
            self.subs
                .lock()
                .retain(|(c, f)| !(c == client_id && f == topic_filter));
            Ok(())
        }

        fn unsubscribe_all(&self, client_id: &str) -> Result<(), PersistenceError> {
            self.subs.lock().retain(|(c, _)| c != client_id);
            Ok(())
        }

        fn close(&self) -> Result<(), PersistenceError> {
            Ok(())
        }
    }

    struct MemoryPersistence {
        opened: Arc<AtomicBool>,
    }

    impl Persistence for MemoryPersistence {
        fn open(&mut self) -> Result<(), PersistenceError> {
            self.opened.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn new_queue_store(
            &self,
            _config: &Config,
            _client: &dyn ClientConnection,
        ) -> Result<Box<dyn QueueStore>, PersistenceError> {
            if !self.opened.load(Ordering::SeqCst) {
                return Err(PersistenceError::Closed);
            }
            Ok(Box::new(VecQueue::default()))
        }

        fn new_subscription_store(&self, _config: &Config) -> Box<dyn SubscriptionBackend> {
            Box::new(MapSubscriptions::default())
        }

        fn close(&mut self) -> Result<(), PersistenceError> {
            self.opened.store(false, Ordering::SeqCst);
            Ok(())
        }
    }

    struct MemoryFactory {
        opened: Arc<AtomicBool>,
    }

    impl PersistenceFactory for MemoryFactory {
        fn create(
            &self,
            _config: &Config,
            _hooks: Arc<dyn BrokerHooks>,
        ) -> Result<Box<dyn Persistence>, PersistenceError> {
            Ok(Box::new(MemoryPersistence {
                opened: Arc::clone(&self.opened),
            }))
        }
    }

    struct NoHooks;
    impl BrokerHooks for NoHooks {}

    fn conn() -> ConnectionInfo {
        ConnectionInfo {
            options: ClientOptions {
                client_id: "c1".to_string(),
                ..Default::default()
            },
            version: ProtocolVersion::V311,
            local_addr: "127.0.0.1:1883".parse().unwrap(),
            remote_addr: "127.0.0.1:50002".parse().unwrap(),
            connected_at: SystemTime::now(),
        }
    }

    fn message(packet_id: u16) -> QueuedMessage {
        QueuedMessage {
            packet_id: Some(packet_id),
            topic: "a/b".to_string(),
            payload: b"hello".to_vec(),
            qos: QoS::AtLeastOnce,
            retain: false,
        }
    }

    fn factories(opened: &Arc<AtomicBool>) -> PersistenceFactories {
        let mut factories = PersistenceFactories::new();
        factories.register(
            "memory",
            Box::new(MemoryFactory {
                opened: Arc::clone(opened),
            }),
        );
        factories
    }

    #[test]
    fn test_build_configured_backend() {
        let opened = Arc::new(AtomicBool::new(false));
        let factories = factories(&opened);
        assert!(factories.contains("memory"));

        let config = Config::default();
        let mut persistence = factories.build(&config, Arc::new(NoHooks)).unwrap();
        assert!(opened.load(Ordering::SeqCst));

        let mut queue = persistence.new_queue_store(&config, &conn()).unwrap();
        queue.init(true).unwrap();
        queue.add(message(1)).unwrap();
        queue.add(message(2)).unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.remove(1).unwrap(), Some(message(1)));
        assert_eq!(queue.remove(1).unwrap(), None);
        queue.close().unwrap();
        assert_eq!(queue.add(message(3)), Err(PersistenceError::Closed));

        persistence.close().unwrap();
        assert!(!opened.load(Ordering::SeqCst));
        assert!(persistence.new_queue_store(&config, &conn()).is_err());
    }

    #[test]
    fn test_unknown_backend() {
        let opened = Arc::new(AtomicBool::new(false));
        let factories = factories(&opened);

        let mut config = Config::default();
        config.persistence.backend = "redis".to_string();
        match factories.build(&config, Arc::new(NoHooks)) {
            Err(e) => assert_eq!(e, PersistenceError::UnknownBackend("redis".to_string())),
            Ok(_) => panic!("expected unknown backend"),
        }
        assert!(!opened.load(Ordering::SeqCst));
    }

    #[test]
    fn test_subscription_backend_contract() {
        let opened = Arc::new(AtomicBool::new(false));
        let config = Config::default();
        let persistence = factories(&opened).build(&config, Arc::new(NoHooks)).unwrap();
        let subs = persistence.new_subscription_store(&config);

        let shared = Subscription::parse("$share/g/a", 0, Default::default());
        subs.subscribe("c1", &shared).unwrap();
        subs.subscribe("c1", &shared).unwrap();
        subs.unsubscribe("c1", "$share/g/a").unwrap();
        subs.unsubscribe_all("c1").unwrap();
        subs.close().unwrap();
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            PersistenceError::UnknownBackend("x".to_string()).to_string(),
            "unknown persistence backend: x"
        );
        assert_eq!(
            PersistenceError::Closed.to_string(),
            "persistence backend is closed"
        );
    }
}
