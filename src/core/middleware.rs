//! HTTP middleware for request tracking and metrics.

use crate::core::logging::{generate_request_id, REQUEST_ID};
use crate::core::metrics::get_metrics;
use axum::{
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Header used to accept and echo request ids.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Assign a request id, run the rest of the stack inside its task-local
/// scope, and echo it back as `x-request-id`.
///
/// An inbound `x-request-id` is reused when it is a valid header value.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(generate_request_id);

    let mut response = REQUEST_ID
        .scope(request_id.clone(), next.run(request))
        .await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Metrics tracking middleware.
pub struct MetricsMiddleware;

impl MetricsMiddleware {
    /// Track request count, duration and in-flight requests per endpoint.
    pub async fn track_metrics(request: Request, next: Next) -> Response {
        let endpoint = request
            .extensions()
            .get::<MatchedPath>()
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| request.uri().path().to_string());
        let method = request.method().to_string();

        // Skip metrics endpoint itself to avoid recursion
        if endpoint == "/metrics" {
            return next.run(request).await;
        }

        let metrics = get_metrics();
        metrics
            .active_requests
            .with_label_values(&[&endpoint])
            .inc();

        let start = Instant::now();
        let response = next.run(request).await;
        let duration = start.elapsed().as_secs_f64();
        let status_code = response.status().as_u16().to_string();

        metrics
            .request_count
            .with_label_values(&[&method, &endpoint, &status_code])
            .inc();
        metrics
            .request_duration
            .with_label_values(&[&method, &endpoint])
            .observe(duration);
        metrics
            .active_requests
            .with_label_values(&[&endpoint])
            .dec();

        tracing::debug!(
            method = %method,
            endpoint = %endpoint,
            status = %status_code,
            duration_ms = (duration * 1000.0) as u64,
            "Request completed"
        );

        response
    }
}
