//! Error types returned by the admin API.

use thiserror::Error;

/// Caller-facing admin API errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdminError {
    #[error("Invalid argument: {field} = {value:?}")]
    InvalidArgument { field: &'static str, value: String },

    #[error("Client not found: {0}")]
    NotFound(String),
}

impl AdminError {
    pub(crate) fn invalid_argument(field: &'static str, value: &str) -> Self {
        AdminError::InvalidArgument {
            field,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;
