//! Common test utilities for E2E tests

#![allow(dead_code)]

pub mod schema_validator;

use std::path::PathBuf;

use geofinder::data::NewGeocache;
use geofinder::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server with no photo-service key
    pub async fn new() -> Self {
        Self::with_photos(None, "https://api.flickr.com/services/rest/").await
    }

    /// Create a new test server whose photo lookups go to `endpoint`
    pub async fn with_photos(api_key: Option<&str>, endpoint: &str) -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let mut config = test_config(db_path);
        config.photos.api_key = api_key.map(str::to_string);
        config.photos.endpoint = endpoint.to_string();

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = geofinder::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Insert a geocache into the store
    pub async fn insert_geocache(&self, lat: f64, lng: f64, type_id: i64, difficulty: f64) -> i64 {
        self.state
            .db
            .insert_geocache(&NewGeocache {
                latitude: lat,
                longitude: lng,
                cache_type_id: type_id,
                difficulty_rating: difficulty,
                name: None,
            })
            .await
            .unwrap()
    }

    /// Seed a handful of caches around Tucson and one far away
    pub async fn seed_tucson(&self) {
        self.insert_geocache(32.25, -110.91, 1, 1.5).await;
        self.insert_geocache(32.30, -110.85, 2, 3.0).await;
        self.insert_geocache(32.15, -111.00, 3, 3.0).await;
        self.insert_geocache(32.20, -110.80, 2, 2.0).await;
        // Phoenix, well outside a 10-mile box
        self.insert_geocache(33.45, -112.07, 1, 1.0).await;
    }

    /// POST a raw body to the search endpoint
    pub async fn post_search(&self, body: impl Into<reqwest::Body>) -> reqwest::Response {
        self.client
            .post(self.url("/api/geocaches/search"))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap()
    }
}

/// Test configuration storing data at `db_path`
pub fn test_config(db_path: PathBuf) -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
            allowed_origin: None,
        },
        database: config::DatabaseConfig {
            path: db_path,
            run_migrations: true,
        },
        photos: config::PhotoConfig {
            api_key: None,
            endpoint: "https://api.flickr.com/services/rest/".to_string(),
            per_page: config::MAX_PHOTOS_PER_LOOKUP,
            timeout_seconds: 5,
        },
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

/// Search body for the 10-mile box around Tucson
pub fn tucson_box() -> serde_json::Value {
    serde_json::json!({
        "minLat": 32.108,
        "maxLat": 32.398,
        "minLng": -111.081,
        "maxLng": -110.743,
        "type": "",
        "difficulty": ""
    })
}
