// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the ingress-hosts controller.
//!
//! All metrics carry the `ingress_hosts_` prefix and live in
//! [`METRICS_REGISTRY`]. When `--metrics-addr` is set, [`serve_metrics`]
//! exposes them over HTTP at `/metrics`.
//!
//! # Example
//!
//! ```rust,no_run
//! use ingress_hosts::metrics::record_reconciliation_success;
//!
//! record_reconciliation_success("watch", std::time::Duration::from_millis(3), 4);
//! ```

use crate::constants::METRICS_PATH;
use axum::{http::StatusCode, routing::get, Router};
use prometheus::{
    Counter, CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::net::SocketAddr;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::info;

/// Namespace prefix for all metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "ingress_hosts";

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total number of reconciliation cycles by run mode and status
///
/// Labels:
/// - `mode`: `once` or `watch`
/// - `status`: `success` or `error`
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of reconciliation cycles by run mode and status",
    );
    let counter = CounterVec::new(opts, &["mode", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconciliation cycles in seconds
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of reconciliation cycles in seconds by run mode",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["mode"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Total number of errors by kind
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of errors by kind",
    );
    let counter = CounterVec::new(opts, &["kind"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of ingress watch events by event type
pub static WATCH_EVENTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_watch_events_total"),
        "Total number of ingress watch events by event type",
    );
    let counter = CounterVec::new(opts, &["type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of times the ingress watch was reopened after the stream closed
pub static WATCH_RESUBSCRIPTIONS_TOTAL: LazyLock<Counter> = LazyLock::new(|| {
    let counter = Counter::new(
        format!("{METRICS_NAMESPACE}_watch_resubscriptions_total"),
        "Total number of times the ingress watch was reopened",
    )
    .unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Number of IP entries in the last written fragment
pub static MANAGED_ADDRESSES: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        format!("{METRICS_NAMESPACE}_managed_addresses"),
        "Number of IP entries in the last written managed fragment",
    )
    .unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Record a successful reconciliation cycle
///
/// # Arguments
/// * `mode` - Run mode label
/// * `duration` - Time the cycle took
/// * `addresses` - Number of IP entries written
pub fn record_reconciliation_success(mode: &str, duration: Duration, addresses: usize) {
    RECONCILIATION_TOTAL
        .with_label_values(&[mode, "success"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[mode])
        .observe(duration.as_secs_f64());
    #[allow(clippy::cast_precision_loss)]
    MANAGED_ADDRESSES.set(addresses as f64);
}

/// Record a failed reconciliation cycle
///
/// # Arguments
/// * `mode` - Run mode label
/// * `duration` - Time until the failure
/// * `kind` - Error kind label
pub fn record_reconciliation_error(mode: &str, duration: Duration, kind: &str) {
    RECONCILIATION_TOTAL
        .with_label_values(&[mode, "error"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[mode])
        .observe(duration.as_secs_f64());
    record_error(kind);
}

/// Record an error outside a reconciliation cycle
pub fn record_error(kind: &str) {
    ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

/// Record a received watch event
pub fn record_watch_event(event_type: &str) {
    WATCH_EVENTS_TOTAL.with_label_values(&[event_type]).inc();
}

/// Record a watch resubscription
pub fn record_resubscription() {
    WATCH_RESUBSCRIPTIONS_TOTAL.inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

async fn metrics_handler() -> Result<String, (StatusCode, String)> {
    gather_metrics().map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// Build the HTTP router exposing `/metrics`.
pub fn metrics_router() -> Router {
    Router::new().route(METRICS_PATH, get(metrics_handler))
}

/// Serve metrics on `addr` until the process exits.
///
/// # Errors
/// Returns error if the address cannot be bound or the server fails
pub async fn serve_metrics(addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, path = METRICS_PATH, "Serving Prometheus metrics");
    axum::serve(listener, metrics_router()).await
}
