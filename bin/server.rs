// Expense Tracker - Web Server
// Serves the named ledger operations over HTTP

use anyhow::{Context, Result};
use expense_tracker::server::create_router;
use expense_tracker::{Config, Ledger, VERSION};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    info!(version = VERSION, "Expense Tracker server starting");

    // Create the table before accepting traffic
    let ledger = Ledger::from_config(&config);
    ledger
        .initialize()
        .with_context(|| format!("Failed to initialize database at {:?}", config.db_path))?;
    info!("Database ready: {:?}", config.db_path);
    info!("Categories file: {:?}", config.categories_path);

    let app = create_router(Arc::new(ledger));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("   Tools: POST http://{}/api/tools/<name>", addr);

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
