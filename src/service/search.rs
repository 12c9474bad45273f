//! Geocache search service
//!
//! Turns a raw request body into validated `SearchCriteria` and runs the
//! bounding-box lookup. Input problems short-circuit before the store is
//! touched.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::data::{Database, GeocacheRecord, SearchCriteria};
use crate::error::SearchError;

/// Search request as sent over the wire.
///
/// Filters use an empty string for "no filter", matching what browser
/// form controls submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
    #[serde(rename = "type", default)]
    pub cache_type: String,
    #[serde(default)]
    pub difficulty: String,
}

/// Parse and validate a search request body.
///
/// # Errors
/// - `SearchError::MissingInput` for an empty body, invalid JSON, or
///   anything other than a non-empty JSON object
/// - `SearchError::Input` for missing, non-numeric, out-of-range or
///   out-of-order bounds, and for unusable filter values
pub fn parse_search_payload(body: &[u8]) -> Result<SearchCriteria, SearchError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(SearchError::MissingInput);
    }

    let object = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(object)) if !object.is_empty() => object,
        _ => return Err(SearchError::MissingInput),
    };

    let min_lat = bound(&object, "minLat", 90.0)?;
    let max_lat = bound(&object, "maxLat", 90.0)?;
    let min_lng = bound(&object, "minLng", 180.0)?;
    let max_lng = bound(&object, "maxLng", 180.0)?;

    if min_lat > max_lat {
        return Err(SearchError::Input(format!(
            "minLat ({min_lat}) must not exceed maxLat ({max_lat})"
        )));
    }
    if min_lng > max_lng {
        return Err(SearchError::Input(format!(
            "minLng ({min_lng}) must not exceed maxLng ({max_lng})"
        )));
    }

    Ok(SearchCriteria {
        min_lat,
        max_lat,
        min_lng,
        max_lng,
        cache_type: type_filter(object.get("type"))?,
        difficulty: difficulty_filter(object.get("difficulty"))?,
    })
}

/// Numeric value from a JSON number or numeric string.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// A filter value is absent when missing, null, or blank.
fn present(value: Option<&Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.trim().is_empty() => None,
        Some(value) => Some(value),
    }
}

fn bound(object: &Map<String, Value>, field: &str, limit: f64) -> Result<f64, SearchError> {
    let value = present(object.get(field))
        .ok_or_else(|| SearchError::Input(format!("{field} is required")))?;
    let number = as_number(value)
        .filter(|n| n.is_finite())
        .ok_or_else(|| SearchError::Input(format!("{field} must be a number, got {value}")))?;

    if number.abs() > limit {
        return Err(SearchError::Input(format!(
            "{field} must be between -{limit} and {limit}, got {number}"
        )));
    }

    Ok(number)
}

fn type_filter(value: Option<&Value>) -> Result<Option<i64>, SearchError> {
    let Some(value) = present(value) else {
        return Ok(None);
    };

    as_number(value)
        .filter(|n| n.fract() == 0.0)
        .map(|n| Some(n as i64))
        .ok_or_else(|| SearchError::Input(format!("type must be a cache type id, got {value}")))
}

fn difficulty_filter(value: Option<&Value>) -> Result<Option<f64>, SearchError> {
    let Some(value) = present(value) else {
        return Ok(None);
    };

    as_number(value)
        .filter(|n| n.is_finite())
        .map(Some)
        .ok_or_else(|| SearchError::Input(format!("difficulty must be a number, got {value}")))
}

/// Query Service: bounding-box search over the geocache store.
pub struct GeocacheSearch {
    db: Arc<Database>,
}

impl GeocacheSearch {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Run a validated search.
    ///
    /// # Errors
    /// Returns `SearchError::Query` with the store's message if the lookup
    /// fails; no partial results are returned.
    pub async fn search(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<GeocacheRecord>, SearchError> {
        let records = self.db.search_geocaches(criteria).await.map_err(|error| {
            tracing::error!(%error, "Geocache query failed");
            SearchError::Query(error)
        })?;

        tracing::info!(
            min_lat = criteria.min_lat,
            max_lat = criteria.max_lat,
            min_lng = criteria.min_lng,
            max_lng = criteria.max_lng,
            cache_type = ?criteria.cache_type,
            difficulty = ?criteria.difficulty,
            count = records.len(),
            "Geocache search completed"
        );

        Ok(records)
    }

    /// Parse a raw request body and search.
    pub async fn search_payload(&self, body: &[u8]) -> Result<Vec<GeocacheRecord>, SearchError> {
        let criteria = parse_search_payload(body).inspect_err(|error| {
            tracing::warn!(%error, "Rejected search request");
        })?;
        self.search(&criteria).await
    }
}
