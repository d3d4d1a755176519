//! Prometheus metrics for build notifications.
//!
//! - Publish attempts by outcome and by failing stage
//! - Publish latency (connect through disconnect)
//! - Credential lookups by hit/miss

use std::time::Duration;

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, Encoder, Histogram, IntCounterVec, TextEncoder,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "notifier";

lazy_static! {
    /// Publish attempts by outcome (delivered/failed)
    pub static ref PUBLISH_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_publish_total", METRIC_PREFIX),
        "Total publish attempts by outcome",
        &["outcome"]
    ).unwrap();

    /// Failed publishes by pipeline stage
    pub static ref PUBLISH_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_publish_failures_total", METRIC_PREFIX),
        "Total failed publish attempts by pipeline stage",
        &["stage"]
    ).unwrap();

    /// Time from connect to disconnect
    pub static ref PUBLISH_DURATION: Histogram = register_histogram!(
        format!("{}_publish_duration_seconds", METRIC_PREFIX),
        "Publish duration in seconds",
        vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0]
    ).unwrap();

    /// Credential lookups by result (hit/miss)
    pub static ref CREDENTIAL_LOOKUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_credential_lookups_total", METRIC_PREFIX),
        "Total credential lookups by result",
        &["result"]
    ).unwrap();
}

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording publish metrics
pub struct PublishMetrics;

impl PublishMetrics {
    pub fn record_delivered(duration: Duration) {
        PUBLISH_TOTAL.with_label_values(&["delivered"]).inc();
        PUBLISH_DURATION.observe(duration.as_secs_f64());
    }

    pub fn record_failed(stage: &str) {
        PUBLISH_TOTAL.with_label_values(&["failed"]).inc();
        PUBLISH_FAILURES_TOTAL.with_label_values(&[stage]).inc();
    }

    pub fn record_credential_lookup(hit: bool) {
        let result = if hit { "hit" } else { "miss" };
        CREDENTIAL_LOOKUPS_TOTAL.with_label_values(&[result]).inc();
    }
}
