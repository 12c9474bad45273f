//! API layer
//!
//! HTTP handlers for:
//! - Geocache search and cache-type listing
//! - Photo lookup proxy
//! - Metrics (Prometheus)

mod geocaches;
pub mod metrics;
mod photos;

pub use geocaches::geocache_router;
pub use metrics::metrics_router;
pub use photos::photo_router;
