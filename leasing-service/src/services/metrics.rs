//! Prometheus metrics for leasing-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// HTTP request counter by route and status.
pub static HTTP_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "leasing_http_requests_total",
        "Total number of HTTP API requests",
        &["route", "status"]
    )
    .expect("Failed to register http_requests_total")
});

/// Engine operation counter by operation and document kind.
pub static RECALCULATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "leasing_recalculations_total",
        "Total number of engine operations",
        &["operation", "kind"] // recalculate, edit, append, remove, seed
    )
    .expect("Failed to register recalculations_total")
});

/// Engine operation duration histogram.
pub static RECALCULATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "leasing_recalculation_duration_seconds",
        "Engine operation duration in seconds",
        &["operation"],
        vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05]
    )
    .expect("Failed to register recalculation_duration")
});

/// Unit seeding outcomes.
pub static UNIT_SEEDS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "leasing_unit_seeds_total",
        "Total number of unit seed attempts by outcome",
        &["outcome"]
    )
    .expect("Failed to register unit_seeds_total")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "leasing_errors_total",
        "Total number of errors by type",
        &["error_type"]
    )
    .expect("Failed to register errors_total")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&HTTP_REQUESTS_TOTAL);
    Lazy::force(&RECALCULATIONS_TOTAL);
    Lazy::force(&RECALCULATION_DURATION);
    Lazy::force(&UNIT_SEEDS_TOTAL);
    Lazy::force(&ERRORS_TOTAL);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}

pub fn record_http_request(route: &str, status: u16) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[route, &status.to_string()])
        .inc();
}

pub fn record_operation(operation: &str, kind: &str, duration_secs: f64) {
    RECALCULATIONS_TOTAL
        .with_label_values(&[operation, kind])
        .inc();
    RECALCULATION_DURATION
        .with_label_values(&[operation])
        .observe(duration_secs);
}

pub fn record_unit_seed(outcome: &str) {
    UNIT_SEEDS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_error(error_type: &str) {
    ERRORS_TOTAL.with_label_values(&[error_type]).inc();
}
