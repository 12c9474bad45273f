//! Geofinder server entry point

use geofinder::{AppState, config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application entry point
///
/// # Setup
/// 1. Load configuration from file and environment
/// 2. Initialize tracing/logging at the configured level
/// 3. Initialize AppState (fails fast if the store is unreachable)
/// 4. Build Axum router
/// 5. Start HTTP server
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration
    let config = config::AppConfig::load()?;

    // 2. Initialize tracing/logging; RUST_LOG overrides logging.level
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.default_directives().into());

    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    tracing::info!("Starting Geofinder...");

    geofinder::metrics::init_metrics();

    tracing::info!(
        database = %config.database.path.display(),
        level = %config.logging.level,
        "Configuration loaded"
    );
    if config.photos.api_key().is_none() {
        tracing::warn!("photos.api_key is not set; photo lookups will fail");
    }

    // 3. Initialize application state
    let state = AppState::new(config.clone()).await?;

    // 4. Build Axum router
    let app = geofinder::build_router(state);

    // 5. Start HTTP server
    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
