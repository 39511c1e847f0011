//! Serve command handler
//!
//! Runs the server, or in dry-run mode builds everything the server
//! would need and reports it.

use crate::config::Settings;
use crate::server::{Server, build_registry};

/// Handler for the serve command
pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Execute the serve command
    ///
    /// # Errors
    /// - Configuration validation errors
    /// - Messenger construction or credential verification errors
    /// - Bind and server runtime errors (if not dry-run)
    pub async fn execute(self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            self.validate_only().await
        } else {
            Server::new(self.config).run().await
        }
    }

    /// Validate configuration and build the messenger registry, then stop.
    pub async fn validate_only(&self) -> anyhow::Result<()> {
        self.config.validate()?;
        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.config.server.address());
        println!(
            "✓ Timeouts: read {}s, write {}s; body limit {} bytes",
            self.config.server.read_timeout,
            self.config.server.write_timeout,
            self.config.server.max_body_size
        );

        let registry = build_registry(&self.config).await?;
        for name in registry.names() {
            println!("✓ Messenger ready: {name}");
        }
        registry.shutdown().await;

        println!("Dry run completed successfully");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
