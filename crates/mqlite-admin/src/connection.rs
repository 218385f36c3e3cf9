//! Connection-side view of a client, as handed over by the broker.

use std::net::SocketAddr;
use std::time::SystemTime;

use mqlite_admin_core::{ClientRecord, ClientStats, ProtocolVersion};

/// Options negotiated in CONNECT (after broker-side clamping).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    pub client_id: String,
    pub username: Option<String>,
    /// Keep alive in seconds.
    pub keep_alive: u16,
    /// Session expiry interval in seconds (MQTT v5, 0 for v3.1.1 clean sessions).
    pub session_expiry: u32,
    pub max_inflight: u16,
    pub max_queue: u32,
    pub receive_maximum: u16,
}

/// A live client connection owned by the broker.
pub trait ClientConnection {
    fn options(&self) -> &ClientOptions;
    fn version(&self) -> ProtocolVersion;
    fn local_addr(&self) -> SocketAddr;
    fn remote_addr(&self) -> SocketAddr;
    fn connected_at(&self) -> SystemTime;
}

/// Plain snapshot of a connection, for brokers that do not want to expose
/// their connection type.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub options: ClientOptions,
    pub version: ProtocolVersion,
    pub local_addr: SocketAddr,
    pub remote_addr: SocketAddr,
    pub connected_at: SystemTime,
}

impl ClientConnection for ConnectionInfo {
    fn options(&self) -> &ClientOptions {
        &self.options
    }

    fn version(&self) -> ProtocolVersion {
        self.version
    }

    fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    fn connected_at(&self) -> SystemTime {
        self.connected_at
    }
}

/// Project a live connection into a fresh listing record.
pub fn new_client_record(client: &dyn ClientConnection) -> ClientRecord {
    let options = client.options();
    ClientRecord {
        client_id: options.client_id.clone(),
        username: options.username.clone(),
        version: client.version(),
        local_addr: client.local_addr(),
        remote_addr: client.remote_addr(),
        keep_alive: options.keep_alive,
        session_expiry: options.session_expiry,
        max_inflight: options.max_inflight,
        max_queue: options.max_queue,
        receive_maximum: options.receive_maximum,
        connected_at: client.connected_at(),
        disconnected_at: None,
        stats: ClientStats::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client_record_copies_options() {
        let info = ConnectionInfo {
            options: ClientOptions {
                client_id: "sensor-1".to_string(),
                username: Some("alice".to_string()),
                keep_alive: 30,
                session_expiry: 3600,
                max_inflight: 32,
                max_queue: 1000,
                receive_maximum: 64,
            },
            version: ProtocolVersion::V5,
            local_addr: "127.0.0.1:1883".parse().unwrap(),
            remote_addr: "10.0.0.7:51234".parse().unwrap(),
            connected_at: SystemTime::UNIX_EPOCH,
        };

        let record = new_client_record(&info);
        assert_eq!(record.client_id, "sensor-1");
        assert_eq!(record.username.as_deref(), Some("alice"));
        assert_eq!(record.version, ProtocolVersion::V5);
        assert_eq!(record.local_addr.port(), 1883);
        assert_eq!(record.remote_addr.port(), 51234);
        assert_eq!(record.keep_alive, 30);
        assert_eq!(record.session_expiry, 3600);
        assert_eq!(record.max_inflight, 32);
        assert_eq!(record.max_queue, 1000);
        assert_eq!(record.receive_maximum, 64);
        assert_eq!(record.connected_at, SystemTime::UNIX_EPOCH);
        assert!(record.is_connected());
        assert_eq!(record.stats, ClientStats::default());
    }
}
