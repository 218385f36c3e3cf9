//! mqlite-admin - Client and subscription registries for the broker admin API.
//!
//! The broker feeds session and subscription events into [`AdminHooks`]; the
//! admin transport serves paginated listings through [`Admin`]. Client
//! records are enriched with live counters from a [`StatsReader`] on every
//! read.
//!
//! ```text
//!  broker ──► AdminHooks ──┬──► ClientStore ◄───────┬── Admin ◄── transport
//!                          └──► SubscriptionStore ◄─┘
//!  StatsReader ──► ClientStore (enrich on read)
//! ```

pub mod admin;
pub mod config;
pub mod connection;
pub mod error;
pub mod hooks;
pub mod logging;
pub mod persistence;
pub mod stats;
pub mod store;

pub use admin::{Admin, SessionControl};
pub use connection::{ClientConnection, ClientOptions, ConnectionInfo};
pub use error::{AdminError, Result};
pub use hooks::{AdminHooks, BrokerHooks, TerminationReason};
pub use stats::{ClientMetrics, StatsManager, StatsReader};
pub use store::{ClientStore, SubscriptionKey, SubscriptionStore};
