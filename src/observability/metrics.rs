//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cloudevents_decoded_total` (counter): events decoded, by mode
//! - `cloudevents_encoded_total` (counter): events encoded, by mode
//! - `cloudevents_decode_failures_total` (counter): decode failures, by error kind
//! - `cloudevents_extensions_skipped_total` (counter): malformed extensions dropped, by name
//!
//! # Design Decisions
//! - Uses the `metrics` facade; recording without an installed recorder is free
//! - Prometheus exporter is opt-in through `observability.metrics_enabled`

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_decoded(mode: &'static str) {
    counter!("cloudevents_decoded_total", "mode" => mode).increment(1);
}

pub fn record_encoded(mode: &'static str) {
    counter!("cloudevents_encoded_total", "mode" => mode).increment(1);
}

pub fn record_decode_failure(kind: &'static str) {
    counter!("cloudevents_decode_failures_total", "kind" => kind).increment(1);
}

pub fn record_extension_skipped(extension: &'static str) {
    counter!("cloudevents_extensions_skipped_total", "extension" => extension).increment(1);
}
