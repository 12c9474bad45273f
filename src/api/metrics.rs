//! Prometheus metrics endpoint

use axum::{
    Router,
    http::header::CONTENT_TYPE,
    response::IntoResponse,
    routing::get,
};
use prometheus::{Encoder, TextEncoder};

use crate::error::AppError;
use crate::metrics::REGISTRY;

/// GET /metrics
///
/// All registered metrics in Prometheus text format.
async fn metrics_handler() -> Result<impl IntoResponse, AppError> {
    let encoder = TextEncoder::new();
    let body = encoder
        .encode_to_string(&REGISTRY.gather())
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to encode metrics");
            AppError::Internal(e.into())
        })?;

    Ok(([(CONTENT_TYPE, encoder.format_type().to_string())], body))
}

/// Create metrics router
///
/// Generic over state so it can be merged after `with_state`.
pub fn metrics_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/metrics", get(metrics_handler))
}
