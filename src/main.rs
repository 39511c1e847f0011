use anyhow::Context;
use clap::Parser;

use postback_relay::cli::{Cli, execute_command, init_logger_from_settings, load_and_merge_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_and_merge_config(&cli)?;
    init_logger_from_settings(&settings)?;

    tracing::debug!(
        config_files = ?cli.config,
        messengers = ?settings.messengers,
        "Configuration resolved"
    );

    execute_command(&cli, settings)
        .await
        .context("postback-relay exited with an error")
}
