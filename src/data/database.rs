//! SQLite database operations
//!
//! All database access goes through this module.
//! The store is read-only from the service's point of view; the insert
//! helpers exist for seeding and tests.

use std::path::Path;
use std::time::Instant;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, QueryBuilder, Row, Sqlite, SqlitePool, TypeInfo, ValueRef};

use super::models::*;
use crate::error::AppError;

/// Alias for the joined type label. Unique so that a `cache_type` column in
/// the store cannot shadow it.
const TYPE_LABEL_COLUMN: &str = "__cache_type_label";

/// Database connection pool wrapper.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the SQLite file at `path` and apply migrations.
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        Self::connect_with(path, true).await
    }

    /// Connect to the SQLite file at `path`.
    ///
    /// With `run_migrations` unset the schema must already exist.
    ///
    /// # Errors
    /// Returns `AppError::Connection` if the store cannot be opened or
    /// migrated.
    pub async fn connect_with(path: &Path, run_migrations: bool) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AppError::Connection(sqlx::Error::Io(e)))?;
            }
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string)
            .await
            .map_err(AppError::Connection)?;

        if run_migrations {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| {
                    tracing::error!("Migration failed: {}", e);
                    AppError::Connection(e.into())
                })?;
        }

        tracing::info!(path = %path.display(), run_migrations, "Database connected");

        Ok(Self { pool })
    }

    /// Underlying pool, for ad-hoc statements in tests and tooling.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // =========================================================================
    // Geocaches
    // =========================================================================

    /// Find geocaches inside the criteria's rectangle.
    ///
    /// Latitude and longitude ranges are inclusive. Type and difficulty
    /// filters are ANDed on only when present. Every matching row carries
    /// its resolved type label. Result order is whatever the store yields.
    pub async fn search_geocaches(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<GeocacheRecord>, sqlx::Error> {
        let started = Instant::now();

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT g.*, ct.cache_type AS __cache_type_label \
             FROM geocaches g \
             JOIN cache_types ct ON g.cache_type_id = ct.type_id \
             WHERE g.latitude BETWEEN ",
        );
        query
            .push_bind(criteria.min_lat)
            .push(" AND ")
            .push_bind(criteria.max_lat)
            .push(" AND g.longitude BETWEEN ")
            .push_bind(criteria.min_lng)
            .push(" AND ")
            .push_bind(criteria.max_lng);

        if let Some(cache_type) = criteria.cache_type {
            query.push(" AND g.cache_type_id = ").push_bind(cache_type);
        }
        if let Some(difficulty) = criteria.difficulty {
            query.push(" AND g.difficulty_rating = ").push_bind(difficulty);
        }

        let rows = query.build().fetch_all(&self.pool).await?;
        let records = rows
            .iter()
            .map(decode_geocache_row)
            .collect::<Result<Vec<_>, _>>()?;

        crate::metrics::observe_db_query("search_geocaches", started.elapsed());
        tracing::debug!(
            count = records.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Geocache search executed"
        );

        Ok(records)
    }

    /// Insert a geocache, returning its row id.
    pub async fn insert_geocache(&self, geocache: &NewGeocache) -> Result<i64, AppError> {
        let result = sqlx::query(
            "INSERT INTO geocaches (latitude, longitude, cache_type_id, difficulty_rating, name) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(geocache.latitude)
        .bind(geocache.longitude)
        .bind(geocache.cache_type_id)
        .bind(geocache.difficulty_rating)
        .bind(&geocache.name)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    // =========================================================================
    // Cache types
    // =========================================================================

    /// All cache types ordered by id.
    pub async fn list_cache_types(&self) -> Result<Vec<CacheType>, AppError> {
        let started = Instant::now();
        let types = sqlx::query_as::<_, CacheType>(
            "SELECT type_id, cache_type FROM cache_types ORDER BY type_id",
        )
        .fetch_all(&self.pool)
        .await?;
        crate::metrics::observe_db_query("list_cache_types", started.elapsed());

        Ok(types)
    }

    /// Insert or relabel a cache type.
    pub async fn upsert_cache_type(&self, cache_type: &CacheType) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO cache_types (type_id, cache_type) VALUES (?, ?) \
             ON CONFLICT(type_id) DO UPDATE SET cache_type = excluded.cache_type",
        )
        .bind(cache_type.type_id)
        .bind(&cache_type.cache_type)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Row decoding
// =============================================================================

/// Decode a search row.
///
/// Stored columns keep their stored values; the joined label is written
/// last as `cache_type`, replacing any store column of that name.
fn decode_geocache_row(row: &SqliteRow) -> Result<GeocacheRecord, sqlx::Error> {
    let mut columns = Map::new();
    let mut label = Value::Null;

    for column in row.columns() {
        let value = column_value(row, column.ordinal())?;
        if column.name() == TYPE_LABEL_COLUMN {
            label = value;
        } else {
            columns.insert(column.name().to_string(), value);
        }
    }
    columns.insert("cache_type".to_string(), label);

    Ok(GeocacheRecord::from_columns(columns))
}

/// Decode a column by the storage class of the value it holds.
fn column_value(row: &SqliteRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_ascii_uppercase();

    let value = match type_name.as_str() {
        "INTEGER" => Value::from(row.try_get::<i64, _>(index)?),
        "REAL" => {
            let float = row.try_get::<f64, _>(index)?;
            serde_json::Number::from_f64(float)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        }
        "BLOB" => Value::from(STANDARD.encode(row.try_get::<Vec<u8>, _>(index)?)),
        "BOOLEAN" => Value::from(row.try_get::<bool, _>(index)?),
        _ => Value::from(row.try_get::<String, _>(index)?),
    };

    Ok(value)
}
