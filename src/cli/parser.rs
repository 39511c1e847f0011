//! CLI argument parser using clap
//!
//! This module defines the command-line interface structure and argument parsing logic.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use super::validation;

/// Relay list-manager postbacks to SMS and email providers
#[derive(Parser, Debug)]
#[command(name = "postback-relay")]
#[command(about = "Relay list-manager postbacks to SMS and email providers")]
#[command(long_about = "
postback-relay accepts webhook postbacks on POST /webhook/{provider} and
delivers each one through the named messenger: AWS Pinpoint SMS (pinpoint),
Twilio SMS (twilio) or AWS SES email (ses).

EXAMPLES:
    # Start the server with ./config.toml
    postback-relay

    # Layer two configuration files, later ones win
    postback-relay --config base.toml --config prod.toml serve

    # Enable only the email and Twilio messengers
    postback-relay --msgr ses --msgr twilio serve --port 9000

    # Build every messenger (verifying credentials) and exit
    postback-relay serve --dry-run
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path (repeatable)
    ///
    /// Files are merged in the order given. Without this flag `config.toml`
    /// in the working directory is used if present.
    #[arg(short, long = "config", value_name = "FILE", global = true,
          value_parser = validation::validate_config_file_path)]
    pub config: Vec<PathBuf>,

    /// Messenger to enable (repeatable)
    ///
    /// Replaces the `messengers` list from configuration.
    #[arg(long = "msgr", value_name = "NAME", global = true,
          value_parser = validation::validate_messenger_name)]
    pub msgr: Vec<String>,

    /// Enable verbose logging
    ///
    /// Sets the log level to debug. Cannot be used with --quiet.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    ///
    /// Sets the log level to error. Cannot be used with --verbose.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the webhook server (default)
    ///
    /// Examples:
    ///   postback-relay serve                           # Start with defaults
    ///   postback-relay serve --host 0.0.0.0 --port 80  # Bind to all interfaces on port 80
    ///   postback-relay serve --dry-run                 # Check config and credentials, then exit
    Serve {
        /// Host address to bind to
        #[arg(long, value_name = "ADDRESS", value_parser = validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on (default: 9000)
        #[arg(short, long, value_name = "PORT", value_parser = validation::validate_port)]
        port: Option<u16>,

        /// Log level override
        ///
        /// Takes precedence over configuration and --verbose/--quiet.
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration, build every messenger and exit
        ///
        /// Messenger construction may contact the provider to verify
        /// credentials.
        #[arg(long)]
        dry_run: bool,
    },
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl Cli {
    /// Whether the invocation only checks configuration.
    pub fn is_dry_run(&self) -> bool {
        matches!(self.command, Some(Commands::Serve { dry_run: true, .. }))
    }
}
