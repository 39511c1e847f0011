//! Configuration management module for postback-relay
//!
//! This module provides layered configuration loading with support for:
//! - TOML configuration files, several of them in order
//! - Environment variable overrides
//!
//! # Configuration Priority (lowest to highest)
//! 1. Built-in defaults
//! 2. `--config` files in the order given (`config.toml` when none is given)
//! 3. `RELAY_*` environment variables
//! 4. Command-line flags (applied by the CLI)

pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_CONFIG_FILE};
pub use settings::{LoggerSettings, ServerConfig, Settings};
