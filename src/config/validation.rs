//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use std::collections::HashSet;

use crate::config::error::ConfigError;
use crate::config::settings::{FileSettings, LoggerSettings, ServerConfig, Settings};
use crate::services::MessengerRegistry;

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl ServerConfig {
    /// Validate server configuration
    ///
    /// # Validation Rules
    /// - Host must not be empty
    /// - Port must be between 1 and 65535
    /// - Read and write timeouts must be greater than 0
    /// - Body size limit must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::validation(
                "server.host",
                "Host is required. Please specify an address to bind to.",
            ));
        }

        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.read_timeout == 0 {
            return Err(ConfigError::validation(
                "server.read_timeout",
                "Read timeout must be greater than 0 seconds.",
            ));
        }

        if self.write_timeout == 0 {
            return Err(ConfigError::validation(
                "server.write_timeout",
                "Write timeout must be greater than 0 seconds.",
            ));
        }

        if self.max_body_size == 0 {
            return Err(ConfigError::validation(
                "server.max_body_size",
                "Max body size must be greater than 0 bytes.",
            ));
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - If file logging is enabled, path must not be empty
    /// - Log format must be one of: full, compact, json
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        self.file.validate()?;

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// Returns the first validation error encountered. Provider blocks are
    /// not inspected here; each provider validates its own block when built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.logger.validate()?;
        self.validate_messengers()?;
        Ok(())
    }

    fn validate_messengers(&self) -> Result<(), ConfigError> {
        if self.messengers.is_empty() {
            return Err(ConfigError::validation(
                "messengers",
                "At least one messenger must be enabled.",
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.messengers {
            if name.trim().is_empty() {
                return Err(ConfigError::validation(
                    "messengers",
                    "Messenger names must not be empty.",
                ));
            }
            if !MessengerRegistry::is_known(name) {
                return Err(ConfigError::ValidationError {
                    field: "messengers".to_string(),
                    message: format!("Unknown messenger '{}'.", name),
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::ValidationError {
                    field: "messengers".to_string(),
                    message: format!("Messenger '{}' is listed more than once.", name),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ========================================================================
    // ServerConfig validation tests
    // ========================================================================

    #[test]
    fn test_server_config_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_config_empty_host() {
        let config = ServerConfig {
            host: " ".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "server.host")
        );
    }

    #[test]
    fn test_server_config_invalid_port_zero() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "server.port")
        );
    }

    #[test]
    fn test_server_config_zero_timeouts() {
        let config = ServerConfig {
            read_timeout: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "server.read_timeout")
        );

        let config = ServerConfig {
            write_timeout: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "server.write_timeout")
        );
    }

    #[test]
    fn test_server_config_zero_body_size() {
        let config = ServerConfig {
            max_body_size: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "server.max_body_size")
        );
    }

    proptest! {
        /// Any non-zero port with positive limits validates.
        #[test]
        fn prop_server_config_nonzero_values_valid(
            port in 1u16..=65535u16,
            read_timeout in 1u64..=600,
            write_timeout in 1u64..=600,
            max_body_size in 1usize..=usize::MAX / 2,
        ) {
            let config = ServerConfig {
                port,
                read_timeout,
                write_timeout,
                max_body_size,
                ..Default::default()
            };
            prop_assert!(config.validate().is_ok());
        }
    }

    // ========================================================================
    // LoggerSettings validation tests
    // ========================================================================

    #[test]
    fn test_logger_settings_valid_levels() {
        for level in ["trace", "debug", "info", "warn", "error", "INFO", "Debug"] {
            let settings = LoggerSettings {
                level: level.to_string(),
                ..Default::default()
            };
            assert!(
                settings.validate().is_ok(),
                "Level should be valid: {}",
                level
            );
        }
    }

    #[test]
    fn test_logger_settings_rejections_name_the_field() {
        let cases = [
            (
                LoggerSettings {
                    level: "verbose".to_string(),
                    ..Default::default()
                },
                "logger.level",
            ),
            (
                LoggerSettings {
                    file: FileSettings {
                        enabled: true,
                        path: String::new(),
                        ..Default::default()
                    },
                    ..Default::default()
                },
                "logger.file.path",
            ),
            (
                LoggerSettings {
                    file: FileSettings {
                        format: "xml".to_string(),
                        ..Default::default()
                    },
                    ..Default::default()
                },
                "logger.file.format",
            ),
        ];

        for (settings, expected) in cases {
            match settings.validate() {
                Err(ConfigError::ValidationError { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected {expected} to be rejected, got {other:?}"),
            }
        }
    }

    // ========================================================================
    // Settings validation tests
    // ========================================================================

    #[test]
    fn test_settings_defaults_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_settings_require_a_messenger() {
        let settings = Settings {
            messengers: vec![],
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "messengers")
        );
    }

    #[test]
    fn test_settings_reject_duplicate_messengers() {
        let settings = Settings {
            messengers: vec!["ses".to_string(), "twilio".to_string(), "ses".to_string()],
            ..Default::default()
        };
        match settings.validate() {
            Err(ConfigError::ValidationError { field, message }) => {
                assert_eq!(field, "messengers");
                assert!(message.contains("'ses'"));
            }
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn test_settings_reject_unknown_messenger() {
        let settings = Settings {
            messengers: vec!["twilio".to_string(), "carrier-pigeon".to_string()],
            ..Default::default()
        };
        match settings.validate() {
            Err(ConfigError::ValidationError { field, message }) => {
                assert_eq!(field, "messengers");
                assert!(message.contains("'carrier-pigeon'"));
            }
            other => panic!("expected unknown messenger error, got {other:?}"),
        }
    }

    #[test]
    fn test_settings_invalid_server_reported_first() {
        let settings = Settings {
            server: ServerConfig {
                port: 0,
                ..Default::default()
            },
            messengers: vec![],
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "server.port")
        );
    }
}
