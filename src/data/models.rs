//! Data models
//!
//! Rust structs representing store entities and the ephemeral search
//! criteria that select them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Geocache
// =============================================================================

/// One geocache row as returned by a search.
///
/// Every stored column is kept as the value the store holds and serialized
/// as-is, plus `cache_type` carrying the resolved label. The accessors read
/// the columns the search client needs; they are lenient because an
/// externally provisioned store may hold NULLs or numeric text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeocacheRecord {
    columns: Map<String, Value>,
}

impl GeocacheRecord {
    pub fn from_columns(columns: Map<String, Value>) -> Self {
        Self { columns }
    }

    /// All columns, keyed by name.
    pub fn columns(&self) -> &Map<String, Value> {
        &self.columns
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    pub fn latitude(&self) -> Option<f64> {
        self.get("latitude").and_then(as_number)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.get("longitude").and_then(as_number)
    }

    pub fn cache_type_id(&self) -> Option<i64> {
        self.get("cache_type_id")
            .and_then(as_number)
            .filter(|n| n.fract() == 0.0)
            .map(|n| n as i64)
    }

    pub fn difficulty_rating(&self) -> Option<f64> {
        self.get("difficulty_rating").and_then(as_number)
    }

    /// Resolved type label, "" when absent.
    pub fn cache_type(&self) -> &str {
        self.get("cache_type").and_then(Value::as_str).unwrap_or_default()
    }

    /// Display text for a column: numbers without a trailing ".0", NULL as "".
    pub fn display(&self, column: &str) -> String {
        match self.get(column) {
            None | Some(Value::Null) => String::new(),
            Some(Value::Number(number)) => match number.as_f64() {
                Some(float) if number.is_f64() => float.to_string(),
                _ => number.to_string(),
            },
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Numeric value from a JSON number or numeric string.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Values for inserting a geocache.
///
/// The service never writes; this exists for seeding and tests.
#[derive(Debug, Clone)]
pub struct NewGeocache {
    pub latitude: f64,
    pub longitude: f64,
    pub cache_type_id: i64,
    pub difficulty_rating: f64,
    pub name: Option<String>,
}

// =============================================================================
// Cache type
// =============================================================================

/// Lookup row mapping a numeric type id to its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CacheType {
    pub type_id: i64,
    pub cache_type: String,
}

// =============================================================================
// Search criteria
// =============================================================================

/// Validated search request: an inclusive lat/lng rectangle plus optional
/// equality filters, combined with AND.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchCriteria {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
    /// Restrict to this `cache_type_id`
    pub cache_type: Option<i64>,
    /// Restrict to this `difficulty_rating`
    pub difficulty: Option<f64>,
}

impl SearchCriteria {
    /// Whether a point lies inside the rectangle (edges included).
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&latitude)
            && (self.min_lng..=self.max_lng).contains(&longitude)
    }
}
