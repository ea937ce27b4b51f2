//! planpay CLI entry point.

mod cli;

use clap::Parser;
use cli::Cli;
use planpay::payment::{HttpProvider, ProviderConfig};
use planpay::{Secrets, ServiceBuilder};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!("planpay v{}", env!("CARGO_PKG_VERSION"));

    // Build configuration; secrets come from the environment only.
    let config = cli.into_config()?;
    let secrets = Secrets::from_env()?;

    let provider = HttpProvider::new(
        ProviderConfig {
            endpoint: config.provider.endpoint.clone(),
            key_id: config.provider.key_id.clone(),
            timeout: config.provider.timeout(),
        },
        secrets.provider_key_secret.clone(),
    )?;

    // Wire the service
    let mut service = ServiceBuilder::new(config, secrets, provider).build();

    // Drain ledger events into the log
    if let Some(mut events) = service.events() {
        tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                debug!("ledger event: {event:?}");
            }
        });
    }

    // Serve until shutdown
    service.run().await?;

    info!("Goodbye!");
    Ok(())
}
