//! Error types for mqlite-admin-core.

use thiserror::Error;

/// Errors raised while decoding raw broker values into record types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unsupported protocol version: {0}")]
    UnsupportedProtocolVersion(u8),

    #[error("Invalid QoS: {0}")]
    InvalidQos(u8),

    #[error("Invalid retain handling: {0}")]
    InvalidRetainHandling(u8),
}

pub type Result<T> = std::result::Result<T, Error>;
