//! Photo proxy endpoint
//!
//! - GET /api/photos?lat=..&lng=..

use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::get,
};
use serde::Deserialize;

use crate::AppState;
use crate::error::AppError;
use crate::service::{PhotoList, PhotoSummary};

/// Create photo router
pub fn photo_router() -> Router<AppState> {
    Router::new().route("/photos", get(photos_near))
}

/// Photo query parameters
#[derive(Debug, Deserialize)]
struct PhotoQuery {
    lat: f64,
    lng: f64,
}

/// GET /api/photos
///
/// Looks up photos near a coordinate using the server-held API key.
async fn photos_near(
    State(state): State<AppState>,
    Query(query): Query<PhotoQuery>,
) -> Result<Json<PhotoList>, AppError> {
    let photos = state.photos.search_near(query.lat, query.lng).await?;

    Ok(Json(PhotoList {
        photos: photos.iter().map(PhotoSummary::from).collect(),
    }))
}
