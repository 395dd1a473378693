//! tgadmin - Entry Point

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tgadmin_cli::{AppConfig, Application, Cli};
use tracing::info;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Config first: it carries the log level.
    let config = AppConfig::load(cli.config.as_deref())?;
    tgadmin_telemetry::init_logging(&config.telemetry)?;
    info!("Starting tgadmin v{}", env!("CARGO_PKG_VERSION"));

    let app = Application::new(config)?;
    let outcome = app.run(cli.command).await;
    app.flush_notifications();

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        // Already shown as an error notification.
        Err(e) if e.is_reported() => Ok(ExitCode::FAILURE),
        Err(e) => Err(e.into()),
    }
}
