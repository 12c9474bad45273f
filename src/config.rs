//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration files (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::path::PathBuf;

/// Largest page the photo service hands out per lookup.
pub const MAX_PHOTOS_PER_LOOKUP: usize = 12;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub photos: PhotoConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
    /// Origin allowed to call the API from a browser.
    ///
    /// Any origin is accepted when unset.
    #[serde(default)]
    pub allowed_origin: Option<String>,
}

impl ServerConfig {
    /// Socket address string to bind, e.g. "127.0.0.1:8080"
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration (SQLite only)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
    /// Apply embedded migrations on startup.
    ///
    /// Disable when the store is provisioned out of band.
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_run_migrations() -> bool {
    true
}

/// Photo-search service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoConfig {
    /// API credential; stays on the server
    #[serde(default)]
    pub api_key: Option<String>,
    /// REST endpoint of the photo-search service
    pub endpoint: String,
    /// Photos per lookup (1..=12)
    pub per_page: usize,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl PhotoConfig {
    /// Returns the API key if one is configured and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

/// Levels accepted by `logging.level`
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl LoggingConfig {
    /// Filter directives used when `RUST_LOG` is not set
    pub fn default_directives(&self) -> String {
        format!("geofinder={},tower_http=debug", self.level.to_ascii_lowercase())
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (GEOFINDER__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.path", "data/geofinder.db")?
            .set_default("database.run_migrations", true)?
            .set_default("photos.endpoint", "https://api.flickr.com/services/rest/")?
            .set_default("photos.per_page", MAX_PHOTOS_PER_LOOKUP as i64)?
            .set_default("photos.timeout_seconds", 10)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("GEOFINDER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub(crate) fn validate(&self) -> Result<(), crate::error::AppError> {
        if self.database.path.as_os_str().is_empty() {
            return Err(crate::error::AppError::Config(
                "database.path must not be empty".to_string(),
            ));
        }

        if !(1..=MAX_PHOTOS_PER_LOOKUP).contains(&self.photos.per_page) {
            return Err(crate::error::AppError::Config(format!(
                "photos.per_page must be between 1 and {}",
                MAX_PHOTOS_PER_LOOKUP
            )));
        }

        if self.photos.timeout_seconds == 0 {
            return Err(crate::error::AppError::Config(
                "photos.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if url::Url::parse(&self.photos.endpoint).is_err() {
            return Err(crate::error::AppError::Config(format!(
                "photos.endpoint is not a valid URL: {}",
                self.photos.endpoint
            )));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(crate::error::AppError::Config(format!(
                "logging.level must be one of {}: {}",
                LOG_LEVELS.join(", "),
                self.logging.level
            )));
        }

        Ok(())
    }
}
