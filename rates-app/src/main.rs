//! # Rates Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the store adapter
//! - Create the provider client and rates service
//! - Start the HTTP server

mod config;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rates_fixer::FixerClient;
use rates_hex::{RatesService, inbound::HttpServer};
use rates_repo::build_store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rates_app=debug,rates_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting rates server on port {}", config.port);
    tracing::info!("Using database: {}", config.database_url);
    tracing::info!("Using provider endpoint: {}", config.fixer_base_url);

    // Build store (handles connection and migration)
    let store = build_store(&config.database_url).await?;

    // Build the provider client, pre-marking the known free-plan key
    let mut client = FixerClient::new(config.fixer_base_url)?;
    if let Some(key) = config.fixer_free_key {
        client = client.with_restricted_key(key);
    }

    // Create the rates service
    let service = RatesService::new(store, client);

    // Create and run the HTTP server
    let server = HttpServer::new(service);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    Ok(())
}
