//! HTTP request handlers for the translation API.
//!
//! This module contains the health check, the chain invoke/batch/stream
//! endpoints, the schema endpoints and the metrics endpoint.

use crate::api::models::*;
use crate::api::streaming::chain_event_stream;
use crate::chain::{TranslationChain, TranslationRequest};
use crate::core::logging::get_request_id;
use crate::core::metrics::record_chain_run;
use crate::core::{AppError, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{sse::Sse, IntoResponse, Response},
    Json,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::PartialSchema;
use uuid::Uuid;

/// Shared application state.
///
/// Built once at startup and never mutated afterwards.
pub struct AppState {
    pub chain: TranslationChain,
}

impl AppState {
    pub fn new(chain: TranslationChain) -> Self {
        Self { chain }
    }
}

/// Health check
///
/// Always reports `ok`; the provider is not contacted.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Translate one input
#[utoipa::path(
    post,
    path = "/chain/invoke",
    tag = "chain",
    request_body = InvokeRequest,
    responses(
        (status = 200, description = "Translation result", body = InvokeResponse),
        (status = 422, description = "Malformed request body", body = ApiErrorResponse),
        (status = 500, description = "Provider or credential failure", body = ApiErrorResponse)
    )
)]
pub async fn invoke(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<InvokeRequest>, JsonRejection>,
) -> Result<Json<InvokeResponse>> {
    let Json(request) = payload?;
    let run_id = Uuid::new_v4();

    tracing::info!(
        request_id = %get_request_id(),
        run_id = %run_id,
        language = %request.input.language,
        text_chars = request.input.text.chars().count(),
        "Invoking translation chain"
    );

    let result = state.chain.invoke(&request.input).await;
    record_chain_run("invoke", result.is_ok());
    let output = result?;

    Ok(Json(InvokeResponse::new(output, run_id)))
}

/// Translate several inputs
#[utoipa::path(
    post,
    path = "/chain/batch",
    tag = "chain",
    request_body = BatchRequest,
    responses(
        (status = 200, description = "Translation results in input order", body = BatchResponse),
        (status = 422, description = "Malformed request body", body = ApiErrorResponse),
        (status = 500, description = "Provider or credential failure", body = ApiErrorResponse)
    )
)]
pub async fn batch(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>> {
    let Json(request) = payload?;
    let run_ids: Vec<Uuid> = request.inputs.iter().map(|_| Uuid::new_v4()).collect();
    let max_concurrency = request.max_concurrency();

    tracing::info!(
        request_id = %get_request_id(),
        inputs = request.inputs.len(),
        max_concurrency = ?max_concurrency,
        "Invoking translation chain in batch"
    );

    let result = state.chain.batch(&request.inputs, max_concurrency).await;
    record_chain_run("batch", result.is_ok());
    let output = result?;

    Ok(Json(BatchResponse {
        output,
        metadata: BatchMetadata { run_ids },
    }))
}

/// Stream a translation
///
/// Responds with server-sent events: `metadata`, one `data` event per text
/// fragment, then `end`. Failures after the stream started arrive as an
/// `error` event.
#[utoipa::path(
    post,
    path = "/chain/stream",
    tag = "chain",
    request_body = InvokeRequest,
    responses(
        (status = 200, description = "Event stream", content_type = "text/event-stream", body = String),
        (status = 422, description = "Malformed request body", body = ApiErrorResponse)
    )
)]
pub async fn stream(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<InvokeRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload?;
    let run_id = Uuid::new_v4();

    tracing::info!(
        request_id = %get_request_id(),
        run_id = %run_id,
        language = %request.input.language,
        "Streaming translation chain"
    );

    let events = chain_event_stream(state.chain.clone(), request.input, run_id);
    Ok(Sse::new(events).into_response())
}

/// JSON schema of the chain input.
pub async fn input_schema() -> Result<Json<Value>> {
    let mut schema = serde_json::to_value(TranslationRequest::schema())?;
    if let Value::Object(map) = &mut schema {
        map.insert("title".to_string(), json!("TranslationRequest"));
    }
    Ok(Json(schema))
}

/// JSON schema of the chain output.
pub async fn output_schema() -> Json<Value> {
    Json(json!({
        "title": "TranslationOutput",
        "type": "string"
    }))
}

/// JSON schema of the accepted run configuration.
///
/// No configurable fields are exposed.
pub async fn config_schema() -> Json<Value> {
    Json(json!({
        "title": "TranslationChainConfig",
        "type": "object",
        "properties": {}
    }))
}

/// OpenAPI document of the service.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(crate::api::openapi())
}

/// Prometheus metrics endpoint.
pub async fn metrics_handler() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return AppError::Internal(format!("Failed to encode metrics: {}", e)).into_response();
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}
