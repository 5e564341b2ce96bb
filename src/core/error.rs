//! Error types and handling for the translation service.
//!
//! This module provides a unified error type [`AppError`] that wraps various error sources
//! and implements proper HTTP response conversion.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub const ERROR_TYPE_VALIDATION: &str = "validation_error";
pub const ERROR_TYPE_API: &str = "api_error";

/// Message returned to callers for failures whose detail stays in the logs.
const OPAQUE_SERVER_ERROR: &str = "Internal Server Error";

/// Main error type for the application.
///
/// All errors in the application should be converted to this type for consistent handling.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body did not match the expected shape
    #[error("Validation error: {0}")]
    Validation(String),

    /// Provider credential missing or rejected
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Network failure, timeout or non-success status from the provider
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal server errors with custom message
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Auth(_) => "auth",
            AppError::Upstream(_) => "upstream",
            AppError::Config(_) => "config",
            AppError::Serialization(_) => "serialization",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AppError::Upstream(format!("request to provider timed out: {}", e))
        } else if e.is_connect() {
            AppError::Upstream(format!("failed to connect to provider: {}", e))
        } else {
            AppError::Upstream(e.to_string())
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            AppError::Validation(detail) => {
                tracing::debug!(detail = %detail, "Rejected malformed request");
                json!({
                    "error": {
                        "message": detail,
                        "type": ERROR_TYPE_VALIDATION,
                        "code": status.as_u16()
                    }
                })
            }
            other => {
                tracing::error!(kind = other.kind(), error = %other, "Request failed");
                json!({
                    "error": {
                        "message": OPAQUE_SERVER_ERROR,
                        "type": ERROR_TYPE_API,
                        "code": status.as_u16()
                    }
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for Results using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = AppError::Auth("missing key".to_string());
        assert_eq!(err.to_string(), "Authentication error: missing key");

        let err = AppError::Upstream("connection refused".to_string());
        assert_eq!(err.to_string(), "Upstream error: connection refused");

        let err = AppError::Internal("test error".to_string());
        assert_eq!(err.to_string(), "Internal server error: test error");
    }

    #[tokio::test]
    async fn test_validation_response_carries_detail() {
        let err = AppError::Validation("input: missing field `language`".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], ERROR_TYPE_VALIDATION);
        assert_eq!(json["error"]["code"], 422);
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("language"));
    }

    #[tokio::test]
    async fn test_auth_response_is_opaque() {
        let err = AppError::Auth("sk-leaked-detail".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], OPAQUE_SERVER_ERROR);
        assert!(!json.to_string().contains("sk-leaked-detail"));
    }

    #[tokio::test]
    async fn test_upstream_response_is_opaque() {
        let err = AppError::Upstream("provider returned 503".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], ERROR_TYPE_API);
        assert_eq!(json["error"]["message"], OPAQUE_SERVER_ERROR);
    }

    #[test]
    fn test_error_from_anyhow() {
        let app_err: AppError = anyhow::anyhow!("test error").into();
        assert!(matches!(app_err, AppError::Config(_)));
        assert_eq!(app_err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let app_err: AppError = json_err.into();
        assert!(matches!(app_err, AppError::Serialization(_)));
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(AppError::Validation(String::new()).kind(), "validation");
        assert_eq!(AppError::Auth(String::new()).kind(), "auth");
        assert_eq!(AppError::Upstream(String::new()).kind(), "upstream");
    }
}
