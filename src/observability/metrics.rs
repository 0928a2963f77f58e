//! Metrics collection and exposition.
//!
//! # Metrics
//! - `txmanager_rpc_requests_total` (counter): RPC calls by method, outcome
//! - `txmanager_rpc_duration_seconds` (histogram): RPC latency by method
//! - `txmanager_transactions_signed_total` (counter): signed drafts by kind
//! - `txmanager_unlocks_total` (counter): unlock attempts by outcome
//! - `txmanager_registry_entries` (gauge): loaded / skipped registry entries
//! - `txmanager_batch_size` (histogram): entries per batched request
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics recorder"),
    }
}

pub fn record_rpc_request(method: &str, ok: bool, elapsed: Duration) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!(
        "txmanager_rpc_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("txmanager_rpc_duration_seconds", "method" => method.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_transaction_signed(kind: &'static str) {
    metrics::counter!("txmanager_transactions_signed_total", "kind" => kind).increment(1);
}

pub fn record_unlock(outcome: &'static str) {
    metrics::counter!("txmanager_unlocks_total", "outcome" => outcome).increment(1);
}

pub fn record_registry_load(loaded: usize, skipped: usize) {
    metrics::gauge!("txmanager_registry_entries", "state" => "loaded").set(loaded as f64);
    metrics::gauge!("txmanager_registry_entries", "state" => "skipped").set(skipped as f64);
}

pub fn record_batch(size: usize) {
    metrics::histogram!("txmanager_batch_size").record(size as f64);
}
