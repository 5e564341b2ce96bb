//! API layer for the translation service.
//!
//! This module contains the HTTP handlers, request/response models, SSE
//! framing for streamed runs, the OpenAPI document and the router.

pub mod handlers;
pub mod models;
pub mod streaming;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::core::{request_id_middleware, MetricsMiddleware};

// Re-export commonly used types
pub use handlers::{
    batch, config_schema, health, input_schema, invoke, metrics_handler, openapi_json,
    output_schema, stream, AppState,
};
pub use models::{
    BatchRequest, BatchResponse, HealthResponse, InvokeRequest, InvokeResponse,
};

/// Path prefix under which the chain routes are mounted.
pub const CHAIN_PATH: &str = "/chain";

/// OpenAPI documentation for the service
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::invoke,
        handlers::batch,
        handlers::stream,
    ),
    components(
        schemas(
            crate::chain::TranslationRequest,
            models::HealthResponse,
            models::InvokeRequest,
            models::InvokeResponse,
            models::InvokeMetadata,
            models::BatchRequest,
            models::BatchResponse,
            models::BatchMetadata,
            models::ApiErrorResponse,
            models::ApiErrorDetail,
        )
    ),
    tags(
        (name = "health", description = "Liveness endpoint"),
        (name = "chain", description = "Translation chain endpoints")
    ),
    info(
        title = "Machine Translator",
        version = "1.0.0",
        description = "Chat-model powered translation microservice."
    )
)]
pub struct ApiDoc;

/// OpenAPI document for the service.
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Build the router with all endpoints and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    let chain_routes = Router::new()
        .route("/invoke", post(invoke))
        .route("/batch", post(batch))
        .route("/stream", post(stream))
        .route("/input_schema", get(input_schema))
        .route("/output_schema", get(output_schema))
        .route("/config_schema", get(config_schema))
        .with_state(state);

    Router::new()
        .nest(CHAIN_PATH, chain_routes)
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route("/openapi.json", get(openapi_json))
        .layer(axum::middleware::from_fn(MetricsMiddleware::track_metrics))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
