//! Logger setup.

use log::SetLoggerError;

use crate::config::LogConfig;

/// Install `env_logger` with the configured level as the default filter.
///
/// `RUST_LOG` still takes precedence. Fails if a logger is already installed,
/// which callers embedding the registry in a larger broker can ignore.
pub fn init(config: &LogConfig) -> Result<(), SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.level))
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let config = LogConfig {
            level: "debug".to_string(),
        };
        let _ = init(&config);
        assert!(init(&config).is_err());
        log::debug!("logger installed");
    }
}
