//! Prometheus metrics for the ispcrm service.

use once_cell::sync::Lazy;
use prometheus::{
    histogram_opts, opts, register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec,
    IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;

/// Database query duration histogram
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!("ispcrm_db_query_duration_seconds", "Database query duration"),
        &["operation"]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Billing upserts by resulting status
pub static BILLING_UPSERTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Login attempts by outcome
pub static LOGINS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// RouterOS provisioning calls by operation and outcome
pub static ROUTER_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Call once at startup.
pub fn init_metrics() {
    BILLING_UPSERTS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "ispcrm_billing_upserts_total",
                "Billing ledger upserts by resulting status"
            ),
            &["status"]
        )
        .expect("Failed to register BILLING_UPSERTS_TOTAL")
    });

    LOGINS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!("ispcrm_logins_total", "Login attempts by outcome"),
            &["outcome"]
        )
        .expect("Failed to register LOGINS_TOTAL")
    });

    ROUTER_REQUESTS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "ispcrm_router_requests_total",
                "RouterOS provisioning calls by operation and outcome"
            ),
            &["operation", "status"]
        )
        .expect("Failed to register ROUTER_REQUESTS_TOTAL")
    });

    // Force initialization of lazy statics
    let _ = &*DB_QUERY_DURATION;
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");
    String::from_utf8(buffer).expect("Failed to convert metrics to string")
}

/// Record a billing upsert.
pub fn record_billing_upsert(status: &str) {
    if let Some(counter) = BILLING_UPSERTS_TOTAL.get() {
        counter.with_label_values(&[status]).inc();
    }
}

/// Record a login attempt.
pub fn record_login(outcome: &str) {
    if let Some(counter) = LOGINS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

/// Record a RouterOS provisioning call.
pub fn record_router_request(operation: &str, status: &str) {
    if let Some(counter) = ROUTER_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[operation, status]).inc();
    }
}
