//! Geocache endpoints
//!
//! - POST /api/geocaches/search
//! - GET /api/cache-types

use axum::{
    Router,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};

use crate::AppState;
use crate::data::CacheType;
use crate::error::AppError;
use crate::metrics::{SEARCH_REQUESTS_TOTAL, SEARCH_RESULTS};

/// Create geocache router
///
/// Routes:
/// - POST /geocaches/search
/// - GET /cache-types
pub fn geocache_router() -> Router<AppState> {
    Router::new()
        .route("/geocaches/search", post(search_geocaches))
        .route("/cache-types", get(list_cache_types))
}

/// POST /api/geocaches/search
///
/// Body: `{minLat, maxLat, minLng, maxLng, type?, difficulty?}`.
///
/// Always answers 200 with JSON: an array of geocache rows on success,
/// or `{error, message?}` when the input is unusable or the query fails.
/// The body is read raw so that absent or malformed JSON is reported the
/// same way as any other input error.
async fn search_geocaches(State(state): State<AppState>, body: Bytes) -> Response {
    match state.search.search_payload(&body).await {
        Ok(records) => {
            SEARCH_REQUESTS_TOTAL.with_label_values(&["ok"]).inc();
            SEARCH_RESULTS.observe(records.len() as f64);
            Json(records).into_response()
        }
        Err(error) => {
            SEARCH_REQUESTS_TOTAL
                .with_label_values(&[error.kind()])
                .inc();
            error.into_response()
        }
    }
}

/// GET /api/cache-types
///
/// Cache types a client may offer as the type filter.
async fn list_cache_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<CacheType>>, AppError> {
    Ok(Json(state.db.list_cache_types().await?))
}
