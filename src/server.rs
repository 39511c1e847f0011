//! Server module for managing HTTP server lifecycle
//!
//! This module handles messenger initialization, server startup, and
//! graceful shutdown.

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;

use crate::api::create_router;
use crate::config::Settings;
use crate::external::build_client;
use crate::services::MessengerRegistry;
use crate::state::AppState;

/// HTTP server manager
pub struct Server {
    settings: Settings,
}

impl Server {
    /// Create a new server with the given settings
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Start the server and run until shutdown signal
    ///
    /// This method:
    /// 1. Logs startup information
    /// 2. Builds every enabled messenger (fatal on any failure)
    /// 3. Binds to configured address
    /// 4. Serves until Ctrl+C or SIGTERM
    /// 5. Flushes and closes the messengers
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(
            app_name = %self.settings.application.name,
            app_version = %self.settings.application.version,
            "Application starting"
        );

        tracing::info!(
            host = %self.settings.server.host,
            port = %self.settings.server.port,
            read_timeout = %self.settings.server.read_timeout,
            write_timeout = %self.settings.server.write_timeout,
            max_body_size = %self.settings.server.max_body_size,
            "Server configuration loaded"
        );

        tracing::info!(
            level = %self.settings.logger.level,
            console_enabled = %self.settings.logger.console.enabled,
            file_enabled = %self.settings.logger.file.enabled,
            "Logger configuration loaded"
        );

        let registry = build_registry(&self.settings).await?;
        let state = AppState::new(registry);
        let messengers = state.messengers.clone();

        let router = create_router(state, &self.settings.server);
        tracing::info!("Router configured");

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        messengers.shutdown().await;
        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Build the messenger registry named by `settings.messengers`.
///
/// Shared by the server and `serve --dry-run`; constructors may verify
/// credentials against the provider.
pub async fn build_registry(settings: &Settings) -> anyhow::Result<MessengerRegistry> {
    tracing::info!(messengers = ?settings.messengers, "Initializing messengers");

    let configs = settings
        .messenger_configs()
        .context("Failed to read messenger configuration")?;
    let client = build_client().context("Failed to build HTTP client")?;

    let registry = MessengerRegistry::load(&settings.messengers, &configs, client)
        .await
        .context("Failed to initialize messengers")?;

    tracing::info!(count = registry.len(), "Messengers ready");
    Ok(registry)
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
///
/// If a signal handler cannot be installed, that branch never completes
/// and the other one still applies.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MessengerError;

    #[tokio::test]
    async fn test_build_registry_rejects_unknown_messenger() {
        let mut settings = Settings::default();
        settings.messengers = vec!["carrier-pigeon".to_string()];
        settings
            .messenger
            .insert("carrier-pigeon".to_string(), serde_json::json!({}));

        let err = build_registry(&settings).await.unwrap_err();
        let cause = err.downcast_ref::<MessengerError>().unwrap();
        assert!(matches!(cause, MessengerError::UnknownMessenger(name) if name == "carrier-pigeon"));
    }

    #[tokio::test]
    async fn test_build_registry_rejects_missing_section() {
        let mut settings = Settings::default();
        settings.messengers = vec!["twilio".to_string()];

        let err = build_registry(&settings).await.unwrap_err();
        let cause = err.downcast_ref::<MessengerError>().unwrap();
        assert!(matches!(cause, MessengerError::MissingConfig(name) if name == "twilio"));
    }

    #[tokio::test]
    async fn test_build_registry_builds_twilio() {
        let mut settings = Settings::default();
        settings.messengers = vec!["twilio".to_string()];
        settings.messenger.insert(
            "twilio".to_string(),
            serde_json::json!({
                "account_id": "AC123",
                "auth_token": "token",
                "sender_id": "+15550000000",
                "upload_path": "https://lists.example.com/uploads"
            }),
        );

        let registry = build_registry(&settings).await.unwrap();
        assert_eq!(registry.names(), vec!["twilio"]);
    }
}
