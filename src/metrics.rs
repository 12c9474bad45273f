//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use std::sync::Once;
use std::time::Duration;

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Search Metrics
    pub static ref SEARCH_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("geofinder_search_requests_total", "Total number of geocache search requests"),
        &["outcome"]
    ).expect("metric can be created");
    pub static ref SEARCH_RESULTS: prometheus::Histogram = prometheus::Histogram::with_opts(
        HistogramOpts::new(
            "geofinder_search_results",
            "Number of geocaches returned per search"
        ).buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0])
    ).expect("metric can be created");

    // Database Metrics
    pub static ref DB_QUERY_DURATION_SECONDS: prometheus::HistogramVec = prometheus::HistogramVec::new(
        HistogramOpts::new(
            "geofinder_db_query_duration_seconds",
            "Database query duration in seconds"
        ).buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        &["operation"]
    ).expect("metric can be created");

    // Photo Metrics
    pub static ref PHOTO_LOOKUPS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("geofinder_photo_lookups_total", "Total number of photo lookups"),
        &["status"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("geofinder_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

static INIT: Once = Once::new();

/// Initialize metrics registry.
///
/// Safe to call more than once; only the first call registers.
pub fn init_metrics() {
    INIT.call_once(|| {
        REGISTRY
            .register(Box::new(SEARCH_REQUESTS_TOTAL.clone()))
            .expect("SEARCH_REQUESTS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(SEARCH_RESULTS.clone()))
            .expect("SEARCH_RESULTS can be registered");
        REGISTRY
            .register(Box::new(DB_QUERY_DURATION_SECONDS.clone()))
            .expect("DB_QUERY_DURATION_SECONDS can be registered");
        REGISTRY
            .register(Box::new(PHOTO_LOOKUPS_TOTAL.clone()))
            .expect("PHOTO_LOOKUPS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(ERRORS_TOTAL.clone()))
            .expect("ERRORS_TOTAL can be registered");

        tracing::info!("Metrics registry initialized");
    });
}

/// Record how long a database operation took.
pub fn observe_db_query(operation: &str, elapsed: Duration) {
    DB_QUERY_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(elapsed.as_secs_f64());
}
