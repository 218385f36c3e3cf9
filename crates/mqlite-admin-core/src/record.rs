//! Record types served by the admin API.

use std::net::SocketAddr;
use std::time::SystemTime;

use serde::Serialize;

use crate::error::{Error, Result};

/// MQTT protocol level as carried in CONNECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum ProtocolVersion {
    V31 = 3,
    V311 = 4,
    V5 = 5,
}

impl TryFrom<u8> for ProtocolVersion {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            3 => Ok(ProtocolVersion::V31),
            4 => Ok(ProtocolVersion::V311),
            5 => Ok(ProtocolVersion::V5),
            _ => Err(Error::UnsupportedProtocolVersion(value)),
        }
    }
}

/// Quality of Service levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[repr(u8)]
#[allow(clippy::enum_variant_names)] // MQTT protocol level names
pub enum QoS {
    #[default]
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

impl TryFrom<u8> for QoS {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            _ => Err(Error::InvalidQos(value)),
        }
    }
}

/// MQTT v5 subscription options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubscriptionOptions {
    pub qos: QoS,
    pub no_local: bool,
    pub retain_as_published: bool,
    /// 0 = send retained on subscribe, 1 = only if new, 2 = never.
    pub retain_handling: u8,
}

impl SubscriptionOptions {
    /// Parse from the SUBSCRIBE options byte.
    pub fn from_byte(byte: u8) -> Result<Self> {
        let qos = QoS::try_from(byte & 0x03)?;
        let retain_handling = (byte >> 4) & 0x03;
        if retain_handling == 3 {
            return Err(Error::InvalidRetainHandling(retain_handling));
        }
        Ok(Self {
            qos,
            no_local: (byte & 0x04) != 0,
            retain_as_published: (byte & 0x08) != 0,
            retain_handling,
        })
    }
}

/// A subscription as reported by the broker on SUBSCRIBE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// Share group name for `$share/<group>/<filter>` subscriptions.
    pub share_group: Option<String>,
    /// Topic filter without the share prefix.
    pub topic_filter: String,
    /// Subscription identifier (MQTT v5), 0 when absent.
    pub id: u32,
    pub options: SubscriptionOptions,
}

impl Subscription {
    pub fn new(topic_filter: impl Into<String>, options: SubscriptionOptions) -> Self {
        Self {
            share_group: None,
            topic_filter: topic_filter.into(),
            id: 0,
            options,
        }
    }

    /// Parse a filter as sent by the client, splitting off a
    /// `$share/<group>/` prefix if present.
    pub fn parse(topic_filter: &str, id: u32, options: SubscriptionOptions) -> Self {
        if let Some(rest) = topic_filter.strip_prefix("$share/") {
            if let Some((group, filter)) = rest.split_once('/') {
                if !group.is_empty() {
                    return Self {
                        share_group: Some(group.to_string()),
                        topic_filter: filter.to_string(),
                        id,
                        options,
                    };
                }
            }
        }
        Self {
            share_group: None,
            topic_filter: topic_filter.to_string(),
            id,
            options,
        }
    }

    /// The filter including any share prefix. This is what identifies the
    /// subscription within a client's session.
    pub fn full_topic_filter(&self) -> String {
        match &self.share_group {
            Some(group) => format!("$share/{}/{}", group, self.topic_filter),
            None => self.topic_filter.clone(),
        }
    }
}

/// Live per-client counters, refreshed on every read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClientStats {
    pub subscriptions_current: u64,
    pub subscriptions_total: u64,
    pub bytes_received: u64,
    pub packets_received: u64,
    pub bytes_sent: u64,
    pub packets_sent: u64,
    pub messages_dropped: u64,
    pub inflight_current: u64,
    pub queued_current: u64,
}

/// Listing record for a client session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientRecord {
    pub client_id: String,
    pub username: Option<String>,
    pub version: ProtocolVersion,
    pub local_addr: SocketAddr,
    pub remote_addr: SocketAddr,
    /// Keep alive in seconds.
    pub keep_alive: u16,
    /// Session expiry interval in seconds.
    pub session_expiry: u32,
    pub max_inflight: u16,
    pub max_queue: u32,
    pub receive_maximum: u16,
    pub connected_at: SystemTime,
    /// `None` while the transport is connected.
    pub disconnected_at: Option<SystemTime>,
    pub stats: ClientStats,
}

impl ClientRecord {
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.disconnected_at.is_none()
    }
}

/// Listing record for one subscription of one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionRecord {
    /// Full topic filter, including any `$share/<group>/` prefix.
    pub topic_filter: String,
    pub id: u32,
    pub qos: QoS,
    pub no_local: bool,
    pub retain_as_published: bool,
    pub retain_handling: u8,
    pub client_id: String,
}

impl SubscriptionRecord {
    pub fn new(client_id: &str, subscription: &Subscription) -> Self {
        let options = subscription.options;
        Self {
            topic_filter: subscription.full_topic_filter(),
            id: subscription.id,
            qos: options.qos,
            no_local: options.no_local,
            retain_as_published: options.retain_as_published,
            retain_handling: options.retain_handling,
            client_id: client_id.to_string(),
        }
    }
}
