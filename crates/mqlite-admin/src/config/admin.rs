//! Admin API configuration.

use serde::Deserialize;

pub use mqlite_admin_core::page::{DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE};

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Page size used when a listing request leaves it at 0.
    pub default_page_size: usize,

    /// Largest page size served; bigger requests are capped.
    pub max_page_size: usize,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl AdminConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.default_page_size == 0 {
            return Err("admin.default_page_size must be greater than 0".to_string());
        }
        if self.max_page_size < self.default_page_size {
            return Err(format!(
                "admin.max_page_size ({}) must be at least admin.default_page_size ({})",
                self.max_page_size, self.default_page_size
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_admin_config() {
        let config = AdminConfig::default();
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_page_sizes() {
        let config = AdminConfig {
            default_page_size: 0,
            max_page_size: 10,
        };
        assert!(config.validate().is_err());

        let config = AdminConfig {
            default_page_size: 50,
            max_page_size: 10,
        };
        assert!(config.validate().is_err());
    }
}
