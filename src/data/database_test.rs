//! Database tests

use super::*;
use crate::error::AppError;
use serde_json::json;
use tempfile::{NamedTempFile, TempDir};

/// Helper to create a test database
async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::connect(&db_path).await.unwrap();
    (db, temp_dir)
}

fn geocache(latitude: f64, longitude: f64, cache_type_id: i64, difficulty: f64) -> NewGeocache {
    NewGeocache {
        latitude,
        longitude,
        cache_type_id,
        difficulty_rating: difficulty,
        name: None,
    }
}

fn tucson_box() -> SearchCriteria {
    SearchCriteria {
        min_lat: 32.108,
        max_lat: 32.398,
        min_lng: -111.081,
        max_lng: -110.743,
        cache_type: None,
        difficulty: None,
    }
}

#[tokio::test]
async fn test_database_connection() {
    let (_db, _temp_dir) = create_test_db().await;
}

#[tokio::test]
async fn test_connect_without_migrations_fails_search() {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::connect_with(&temp_dir.path().join("bare.db"), false)
        .await
        .unwrap();

    let error = db.search_geocaches(&tucson_box()).await.unwrap_err();
    assert!(error.to_string().contains("no such table"));
}

#[tokio::test]
async fn test_cache_types_are_seeded() {
    let (db, _temp_dir) = create_test_db().await;

    let types = db.list_cache_types().await.unwrap();
    assert!(types.len() >= 4);
    assert_eq!(types[1].type_id, 2);
    assert_eq!(types[1].cache_type, "Multi-Cache");
}

#[tokio::test]
async fn test_search_returns_only_rows_inside_box() {
    let (db, _temp_dir) = create_test_db().await;

    db.insert_geocache(&geocache(32.25, -110.91, 1, 1.0)).await.unwrap();
    db.insert_geocache(&geocache(32.30, -110.80, 2, 3.0)).await.unwrap();
    // Phoenix, well north of the box
    db.insert_geocache(&geocache(33.45, -112.07, 1, 1.0)).await.unwrap();
    // Same latitude, outside longitude range
    db.insert_geocache(&geocache(32.25, -111.50, 1, 1.0)).await.unwrap();

    let criteria = tucson_box();
    let records = db.search_geocaches(&criteria).await.unwrap();

    assert_eq!(records.len(), 2);
    for record in &records {
        assert!(criteria.contains(record.latitude().unwrap(), record.longitude().unwrap()));
    }
}

#[tokio::test]
async fn test_search_bounds_are_inclusive() {
    let (db, _temp_dir) = create_test_db().await;
    let criteria = tucson_box();

    db.insert_geocache(&geocache(criteria.min_lat, criteria.min_lng, 1, 1.0))
        .await
        .unwrap();
    db.insert_geocache(&geocache(criteria.max_lat, criteria.max_lng, 1, 1.0))
        .await
        .unwrap();

    let records = db.search_geocaches(&criteria).await.unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_search_resolves_type_label() {
    let (db, _temp_dir) = create_test_db().await;
    db.insert_geocache(&geocache(32.25, -110.91, 2, 3.0)).await.unwrap();

    let records = db.search_geocaches(&tucson_box()).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].cache_type_id(), Some(2));
    assert_eq!(records[0].cache_type(), "Multi-Cache");
    assert_eq!(records[0].difficulty_rating(), Some(3.0));
}

#[tokio::test]
async fn test_search_filters_combine_with_and() {
    let (db, _temp_dir) = create_test_db().await;
    db.insert_geocache(&geocache(32.20, -110.90, 1, 2.0)).await.unwrap();
    db.insert_geocache(&geocache(32.21, -110.91, 1, 3.0)).await.unwrap();
    db.insert_geocache(&geocache(32.22, -110.92, 2, 2.0)).await.unwrap();
    db.insert_geocache(&geocache(32.23, -110.93, 2, 3.0)).await.unwrap();

    let by_type = SearchCriteria {
        cache_type: Some(1),
        ..tucson_box()
    };
    let records = db.search_geocaches(&by_type).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.cache_type() == "Traditional"));

    let by_difficulty = SearchCriteria {
        difficulty: Some(3.0),
        ..tucson_box()
    };
    let records = db.search_geocaches(&by_difficulty).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.difficulty_rating() == Some(3.0)));

    let both = SearchCriteria {
        cache_type: Some(2),
        difficulty: Some(2.0),
        ..tucson_box()
    };
    let records = db.search_geocaches(&both).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].cache_type_id(), Some(2));
    assert_eq!(records[0].difficulty_rating(), Some(2.0));
}

#[tokio::test]
async fn test_search_with_unmatched_type_is_empty() {
    let (db, _temp_dir) = create_test_db().await;
    db.insert_geocache(&geocache(32.25, -110.91, 1, 1.0)).await.unwrap();

    let criteria = SearchCriteria {
        cache_type: Some(4),
        ..tucson_box()
    };
    let records = db.search_geocaches(&criteria).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_search_passes_extra_columns_through() {
    let (db, _temp_dir) = create_test_db().await;
    sqlx::query("ALTER TABLE geocaches ADD COLUMN hint TEXT")
        .execute(db.pool())
        .await
        .unwrap();
    sqlx::query("ALTER TABLE geocaches ADD COLUMN owner_id INTEGER")
        .execute(db.pool())
        .await
        .unwrap();

    let id = db
        .insert_geocache(&NewGeocache {
            name: Some("Saguaro Stash".to_string()),
            ..geocache(32.25, -110.91, 1, 1.5)
        })
        .await
        .unwrap();
    sqlx::query("UPDATE geocaches SET hint = 'under the rock', owner_id = 42 WHERE id = ?")
        .bind(id)
        .execute(db.pool())
        .await
        .unwrap();

    let records = db.search_geocaches(&tucson_box()).await.unwrap();
    let columns = records[0].columns();

    assert_eq!(columns["id"], json!(id));
    assert_eq!(columns["name"], "Saguaro Stash");
    assert_eq!(columns["hint"], "under the rock");
    assert_eq!(columns["owner_id"], 42);
    assert_eq!(columns["latitude"], 32.25);
    assert_eq!(columns["cache_type"], "Traditional");
    assert!(!columns.contains_key("__cache_type_label"));
}

#[tokio::test]
async fn test_search_skips_rows_with_unknown_type() {
    let (db, _temp_dir) = create_test_db().await;
    db.insert_geocache(&geocache(32.25, -110.91, 99, 1.0)).await.unwrap();

    let records = db.search_geocaches(&tucson_box()).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_upsert_cache_type_relabels() {
    let (db, _temp_dir) = create_test_db().await;
    db.upsert_cache_type(&CacheType {
        type_id: 2,
        cache_type: "Multi".to_string(),
    })
    .await
    .unwrap();
    db.insert_geocache(&geocache(32.25, -110.91, 2, 1.0)).await.unwrap();

    let records = db.search_geocaches(&tucson_box()).await.unwrap();
    assert_eq!(records[0].cache_type(), "Multi");
}

#[tokio::test]
async fn test_connect_fails_when_path_is_unusable() {
    // A regular file cannot be the parent directory of the store.
    let blocker = NamedTempFile::new().unwrap();
    let db_path = blocker.path().join("x/db.sqlite");

    let error = Database::connect_with(&db_path, true).await.err().unwrap();
    assert!(matches!(error, AppError::Connection(_)));
    assert!(error.to_string().starts_with("DB connection failed"));
}

/// Store provisioned out of band with looser column types than ours.
async fn create_external_store() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::connect_with(&temp_dir.path().join("external.db"), false)
        .await
        .unwrap();

    for statement in [
        "CREATE TABLE cache_types (type_id INTEGER PRIMARY KEY, cache_type TEXT)",
        "CREATE TABLE geocaches (id INTEGER PRIMARY KEY, latitude REAL, longitude REAL, \
         cache_type_id INTEGER, difficulty_rating INTEGER, cache_type TEXT)",
        "INSERT INTO cache_types (type_id, cache_type) VALUES (2, 'Multi-Cache')",
    ] {
        sqlx::query(statement).execute(db.pool()).await.unwrap();
    }

    (db, temp_dir)
}

#[tokio::test]
async fn test_external_store_values_pass_through() {
    let (db, _temp_dir) = create_external_store().await;
    sqlx::query(
        "INSERT INTO geocaches (id, latitude, longitude, cache_type_id, difficulty_rating) \
         VALUES (1, 32.25, -110.91, 2, 3), (2, 32.26, -110.92, 2, NULL)",
    )
    .execute(db.pool())
    .await
    .unwrap();

    let mut records = db.search_geocaches(&tucson_box()).await.unwrap();
    records.sort_by_key(|r| r.columns()["id"].as_i64());

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].columns()["difficulty_rating"], json!(3));
    assert_eq!(
        serde_json::to_value(&records[0]).unwrap()["difficulty_rating"].to_string(),
        "3"
    );
    assert_eq!(records[1].columns()["difficulty_rating"], json!(null));
    assert_eq!(records[1].difficulty_rating(), None);
    assert_eq!(records[1].cache_type(), "Multi-Cache");
}

#[tokio::test]
async fn test_joined_label_wins_over_store_column() {
    let (db, _temp_dir) = create_external_store().await;
    sqlx::query(
        "INSERT INTO geocaches (latitude, longitude, cache_type_id, difficulty_rating, cache_type) \
         VALUES (32.25, -110.91, 2, 1, 'stale label')",
    )
    .execute(db.pool())
    .await
    .unwrap();

    let records = db.search_geocaches(&tucson_box()).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].cache_type(), "Multi-Cache");
}
