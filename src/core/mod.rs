//! Core functionality for the translation service.
//!
//! This module contains fundamental components used throughout the application:
//! - Configuration management
//! - Error handling
//! - Logging setup and request context
//! - Metrics collection
//! - HTTP middleware

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod middleware;

// Re-export commonly used types
pub use config::{AppConfig, ProviderConfig, ServerConfig};
pub use error::{AppError, Result};
pub use logging::{generate_request_id, get_request_id, init_tracing, REQUEST_ID};
pub use metrics::{get_metrics, init_metrics, record_chain_run, Metrics};
pub use middleware::{request_id_middleware, MetricsMiddleware, REQUEST_ID_HEADER};
