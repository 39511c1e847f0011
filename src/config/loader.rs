//! Configuration loader for postback-relay
//!
//! This module provides the `ConfigLoader` struct that handles loading
//! configuration from multiple sources with proper precedence.

use std::path::{Path, PathBuf};

use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};

use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Configuration file used when none is named on the command line
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "RELAY";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Configuration loader that handles layered configuration loading
///
/// Sources, lowest priority first:
/// 1. Built-in defaults
/// 2. Each TOML file, in the order given
/// 3. `RELAY_*` environment variables
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Files to load, each with whether it must exist
    files: Vec<(PathBuf, bool)>,
}

impl ConfigLoader {
    /// Loader for explicitly named files. Every named file must exist.
    ///
    /// With no files, `config.toml` is used if present.
    pub fn new(files: &[PathBuf]) -> Self {
        let files = if files.is_empty() {
            vec![(PathBuf::from(DEFAULT_CONFIG_FILE), false)]
        } else {
            files.iter().map(|path| (path.clone(), true)).collect()
        };
        Self { files }
    }

    /// Load and validate configuration from all sources
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a required file is missing
    /// - configuration parsing fails
    /// - configuration validation fails
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let settings = self.load_unvalidated()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load without validating, so CLI overrides can be applied first
    pub fn load_unvalidated(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let mut builder = Config::builder();
        for (path, required) in &self.files {
            builder = Self::add_file_source(builder, path, *required)?;
        }

        // RELAY_SERVER__PORT -> server.port
        let builder = Self::add_env_source(builder);

        builder.build().map_err(ConfigError::from)
    }

    /// Add a file source to the config builder
    fn add_file_source(
        builder: ConfigBuilder<DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        Ok(builder.add_source(
            File::from(path)
                .format(FileFormat::Toml)
                .required(required),
        ))
    }

    /// Add environment variable source to the config builder
    ///
    /// Values stay strings; typed settings are converted on deserialize, so
    /// phone numbers and numeric-looking ids in provider blocks keep their
    /// exact text.
    ///
    /// Examples:
    /// - `RELAY_SERVER__PORT` -> `server.port`
    /// - `RELAY_MESSENGERS=twilio,ses` -> `messengers`
    /// - `RELAY_MESSENGER__TWILIO__AUTH_TOKEN` -> `messenger.twilio.auth_token`
    fn add_env_source(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true),
        )
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(&[])
    }
}
