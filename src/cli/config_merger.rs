//! Configuration merger for CLI arguments and config files
//!
//! CLI flags sit on top of files and environment variables.

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Settings};

/// Applies CLI argument overrides to file-based configuration
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Load the base configuration from the `--config` files (or the
    /// default file) plus environment overrides.
    ///
    /// Validation is deferred to [`merge_cli_args`](Self::merge_cli_args)
    /// so CLI flags can repair values that files leave invalid.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let config = ConfigLoader::new(&cli.config).load_unvalidated()?;
        Ok(Self::new(config))
    }

    /// Merge CLI arguments into the base configuration and validate
    /// the result.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        self.apply_global_overrides(&mut config, cli);

        if let Some(ref command) = cli.command {
            self.apply_command_overrides(&mut config, command);
        }

        config.validate()?;

        Ok(config)
    }

    fn apply_global_overrides(&self, config: &mut Settings, cli: &Cli) {
        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if !cli.msgr.is_empty() {
            config.messengers = cli.msgr.clone();
        }
    }

    fn apply_command_overrides(&self, config: &mut Settings, command: &Commands) {
        match command {
            Commands::Serve {
                host,
                port,
                log_level,
                dry_run: _,
            } => {
                if let Some(host_addr) = host {
                    config.server.host = host_addr.clone();
                }
                if let Some(port_num) = port {
                    config.server.port = *port_num;
                }
                // Command-level log level wins over --verbose/--quiet
                if let Some(level) = log_level {
                    config.logger.level = level.as_str().to_string();
                }
            }
        }
    }

    /// The configuration before CLI overrides
    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}
