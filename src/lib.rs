//! Geofinder - geocache search service and search client
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Search Client (client, CLI)                  │
//! │  - center + radius → bounding box                           │
//! │  - results view: markers, table rows, detail + photos       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ HTTP (JSON)
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - POST /api/geocaches/search                               │
//! │  - GET /api/photos, /api/cache-types, /health, /metrics     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - request validation + bounding-box query                  │
//! │  - photo-search API (server-held key)                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - SQLite (sqlx): geocaches ⋈ cache_types                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers
//! - `service`: search and photo lookup
//! - `data`: database layer
//! - `client`: search client (bounds, transport, view state, controller)
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// Cloned for each request; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Database connection pool
    pub db: Arc<data::Database>,

    /// Geocache search service
    pub search: Arc<service::GeocacheSearch>,

    /// Photo lookup service
    pub photos: Arc<service::PhotoService>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Connect to SQLite database
    /// 2. Build HTTP client for the photo service
    /// 3. Wire services
    ///
    /// # Errors
    /// Returns `AppError::Connection` if the store cannot be opened; the
    /// server must not start in that case.
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        // 1. Connect to SQLite database
        let db = data::Database::connect_with(&config.database.path, config.database.run_migrations)
            .await
            .inspect_err(|error| tracing::error!(%error, "DB connection failed"))?;
        let db = Arc::new(db);

        // 2. Initialize HTTP client
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("Geofinder/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| error::AppError::Internal(e.into()))?;

        // 3. Services
        let search = service::GeocacheSearch::new(db.clone());
        let photos = service::PhotoService::new(&config.photos, http_client);

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            db,
            search: Arc::new(search),
            photos: Arc::new(photos),
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    let cors_layer = build_cors_layer(&state.config.server);

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest(
            "/api",
            api::geocache_router().merge(api::photo_router()),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
        .merge(api::metrics_router())
}

fn build_cors_layer(server: &config::ServerConfig) -> tower_http::cors::CorsLayer {
    use axum::http::HeaderValue;
    use tower_http::cors::{Any, CorsLayer};

    let Some(allowed_origin) = server.allowed_origin.as_deref() else {
        return CorsLayer::permissive();
    };

    match HeaderValue::from_str(allowed_origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin([origin])
            .allow_methods(Any)
            .allow_headers(Any),
        Err(error) => {
            tracing::error!(
                %error,
                origin = %allowed_origin,
                "Failed to parse server.allowed_origin; denying cross-origin requests"
            );
            CorsLayer::new().allow_methods(Any).allow_headers(Any)
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}
