//! API request and response models.
//!
//! Envelopes follow the invoke/batch/stream contract of a chain server:
//! inputs arrive under `input`/`inputs`, results leave under `output`
//! together with run metadata.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::chain::TranslationRequest;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"status": "ok"}))]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Body of `/chain/invoke` and `/chain/stream`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "input": {"language": "French", "text": "Good morning"}
}))]
pub struct InvokeRequest {
    pub input: TranslationRequest,

    /// Run configuration; accepted for compatibility, not interpreted
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub config: Option<Value>,

    /// Extra keyword arguments; accepted for compatibility, not interpreted
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub kwargs: Option<Value>,
}

/// Metadata attached to a single run.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvokeMetadata {
    pub run_id: Uuid,
    #[schema(value_type = Vec<Object>)]
    pub feedback_tokens: Vec<Value>,
}

/// Response of `/chain/invoke`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "output": "Bonjour",
    "metadata": {"run_id": "4f7c1a52-2f3c-4a55-9a4e-0d4f5b1d9e11", "feedback_tokens": []}
}))]
pub struct InvokeResponse {
    pub output: String,
    pub metadata: InvokeMetadata,
}

impl InvokeResponse {
    pub fn new(output: String, run_id: Uuid) -> Self {
        Self {
            output,
            metadata: InvokeMetadata {
                run_id,
                feedback_tokens: Vec::new(),
            },
        }
    }
}

/// Body of `/chain/batch`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "inputs": [
        {"language": "French", "text": "Good morning"},
        {"language": "German", "text": "Good night"}
    ],
    "config": {"max_concurrency": 2}
}))]
pub struct BatchRequest {
    pub inputs: Vec<TranslationRequest>,

    /// Either one config object for all inputs or a list of them
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub config: Option<Value>,

    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub kwargs: Option<Value>,
}

impl BatchRequest {
    /// `max_concurrency` from the run config, if any.
    ///
    /// With a list of configs the first one that sets it wins.
    pub fn max_concurrency(&self) -> Option<usize> {
        let read = |config: &Value| {
            config
                .get("max_concurrency")
                .and_then(Value::as_u64)
                .map(|n| n as usize)
        };

        match self.config.as_ref()? {
            Value::Array(configs) => configs.iter().find_map(read),
            config => read(config),
        }
    }
}

/// Metadata attached to a batch.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchMetadata {
    pub run_ids: Vec<Uuid>,
}

/// Response of `/chain/batch`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchResponse {
    pub output: Vec<String>,
    pub metadata: BatchMetadata,
}

/// Error body shared by all failing responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": {"message": "Internal Server Error", "type": "api_error", "code": 500}
}))]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub code: u16,
}
