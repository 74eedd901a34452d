//! # Courtside API Server
//!
//! HTTP backend for the Courtside futsal booking service:
//!
//! - Customer signup, login, court browsing, and slot booking
//! - Pricing-rule resolution for reservation totals
//! - Tripay payment-gateway checkout and status callbacks
//! - Admin surface for courts, pricing rules, users, and payment methods
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p courtside-api
//! ```

use courtside_api::{
    app::{build_router, AppState},
    config::Config,
};
use courtside_shared::db;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courtside_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Courtside API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = Config::from_env()?;
    let bind_address = config.bind_address();

    // Connect to MongoDB and fail fast if it is unreachable
    let database = db::connect(&config.database.url, &config.database.name).await?;
    db::ping(&database).await?;
    db::ensure_indexes(&database).await?;
    tracing::info!(database = %config.database.name, "connected to MongoDB");

    // Build and serve the application
    let state = AppState::new(database, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    } else {
        tracing::info!("Shutdown signal received, draining connections...");
    }
}
