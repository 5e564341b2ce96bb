//! Prometheus metrics for monitoring the translation service.
//!
//! This module provides a centralized metrics registry for tracking HTTP
//! requests, chain runs, upstream latency and token usage.

use prometheus::{
    register_gauge_vec, register_histogram_vec, register_int_counter_vec, GaugeVec, HistogramVec,
    IntCounterVec,
};
use std::sync::OnceLock;

/// Container for all application metrics.
pub struct Metrics {
    /// Total number of HTTP requests by method, endpoint and status
    pub request_count: IntCounterVec,

    /// HTTP request duration histogram in seconds
    pub request_duration: HistogramVec,

    /// Number of currently active requests by endpoint
    pub active_requests: GaugeVec,

    /// Chain runs by route (invoke, batch, stream) and outcome
    pub chain_runs: IntCounterVec,

    /// Provider response latency histogram in seconds
    pub upstream_latency: HistogramVec,

    /// Total token usage reported by the provider
    pub token_usage: IntCounterVec,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Initialize the metrics registry.
///
/// Safe to call more than once; later calls return the same instance.
pub fn init_metrics() -> &'static Metrics {
    METRICS.get_or_init(|| {
        let request_count = register_int_counter_vec!(
            "translator_requests_total",
            "Total number of HTTP requests",
            &["method", "endpoint", "status_code"]
        )
        .expect("Failed to register request_count metric");

        let request_duration = register_histogram_vec!(
            "translator_request_duration_seconds",
            "HTTP request duration in seconds",
            &["method", "endpoint"],
            vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]
        )
        .expect("Failed to register request_duration metric");

        let active_requests = register_gauge_vec!(
            "translator_active_requests",
            "Number of active requests",
            &["endpoint"]
        )
        .expect("Failed to register active_requests metric");

        let chain_runs = register_int_counter_vec!(
            "translator_chain_runs_total",
            "Total number of chain runs",
            &["route", "outcome"]
        )
        .expect("Failed to register chain_runs metric");

        let upstream_latency = register_histogram_vec!(
            "translator_upstream_latency_seconds",
            "Chat-completion provider latency in seconds",
            &["model", "outcome"],
            vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]
        )
        .expect("Failed to register upstream_latency metric");

        let token_usage = register_int_counter_vec!(
            "translator_tokens_total",
            "Total number of tokens used",
            &["model", "token_type"]
        )
        .expect("Failed to register token_usage metric");

        Metrics {
            request_count,
            request_duration,
            active_requests,
            chain_runs,
            upstream_latency,
            token_usage,
        }
    })
}

/// Get the global metrics instance, initializing it on first use.
pub fn get_metrics() -> &'static Metrics {
    init_metrics()
}

/// Record the outcome of one chain run.
pub fn record_chain_run(route: &str, success: bool) {
    let outcome = if success { "success" } else { "error" };
    get_metrics()
        .chain_runs
        .with_label_values(&[route, outcome])
        .inc();
}
