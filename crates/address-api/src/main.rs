//! Address API - CRUD for address records with nearby search
//!
//! Opens the address store, applies migrations, serves HTTP until a
//! shutdown signal arrives, then closes the store.

use address_api::{cors_layer, create_router, start_server, AppState, Config, Result};
use address_db::AddressStore;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env()
        .add_directive("address_api=info".parse()?)
        .add_directive("address_db=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    let config = Config::from_env();
    info!(port = config.port, "Starting address-api");
    info!("Database: {}", config.database_url);

    let store = AddressStore::connect(&config.database_url, config.database_max_connections).await?;
    store.migrate().await?;
    info!("Application startup: database tables ready");

    let router = create_router(AppState::new(store.clone()), cors_layer(&config));
    let served = start_server(router, config.port).await;

    store.close().await;
    info!("Application shutdown");

    served?;
    Ok(())
}
