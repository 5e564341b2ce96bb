//! Server-Sent Events (SSE) output for `/chain/stream`.
//!
//! Event sequence for a successful run:
//!
//! ```text
//! event: metadata   data: {"run_id": "..."}
//! event: data       data: "<fragment>"      (repeated)
//! event: end
//! ```
//!
//! A failure at any point replaces the remaining events with a single
//! `error` event carrying an opaque message; the detail is logged.

use crate::chain::{TranslationChain, TranslationRequest};
use crate::core::logging::{get_request_id, REQUEST_ID};
use crate::core::metrics::record_chain_run;
use crate::core::AppError;
use axum::response::sse::Event;
use futures::{Stream, StreamExt};
use serde_json::{json, Value};
use std::convert::Infallible;
use uuid::Uuid;

fn metadata_event(run_id: Uuid) -> Event {
    Event::default()
        .event("metadata")
        .data(json!({ "run_id": run_id }).to_string())
}

fn data_event(text: String) -> Event {
    Event::default()
        .event("data")
        .data(Value::String(text).to_string())
}

fn error_event(error: &AppError) -> Event {
    let status = error.status_code();
    let message = status.canonical_reason().unwrap_or("Internal Server Error");
    Event::default().event("error").data(
        json!({
            "status_code": status.as_u16(),
            "message": message
        })
        .to_string(),
    )
}

fn end_event() -> Event {
    Event::default().event("end")
}

/// Run the chain in streaming mode and frame its output as SSE events.
///
/// The stream outlives the handler's task-local scope, so the request id is
/// captured up front and re-entered around every call into the chain.
pub fn chain_event_stream(
    chain: TranslationChain,
    input: TranslationRequest,
    run_id: Uuid,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    let request_id = get_request_id();

    async_stream::stream! {
        yield Ok::<Event, Infallible>(metadata_event(run_id));

        let started = REQUEST_ID
            .scope(request_id.clone(), chain.stream(&input))
            .await;
        let mut chunks = match started {
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    run_id = %run_id,
                    kind = e.kind(),
                    error = %e,
                    "Failed to start translation stream"
                );
                record_chain_run("stream", false);
                yield Ok(error_event(&e));
                return;
            }
        };

        let mut fragments = 0usize;
        let mut failure: Option<AppError> = None;
        while let Some(chunk) = REQUEST_ID
            .scope(request_id.clone(), chunks.next())
            .await
        {
            match chunk {
                Ok(text) => {
                    fragments += 1;
                    yield Ok(data_event(text));
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        match failure {
            Some(e) => {
                tracing::error!(
                    request_id = %request_id,
                    run_id = %run_id,
                    fragments,
                    kind = e.kind(),
                    error = %e,
                    "Translation stream failed"
                );
                record_chain_run("stream", false);
                yield Ok(error_event(&e));
            }
            None => {
                tracing::debug!(
                    request_id = %request_id,
                    run_id = %run_id,
                    fragments,
                    "Translation stream completed"
                );
                record_chain_run("stream", true);
                yield Ok(end_event());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{AiMessage, ChatModel, ChatPrompt};
    use crate::core::Result;
    use async_trait::async_trait;
    use axum::response::{IntoResponse, Sse};
    use std::sync::{Arc, Mutex};

    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        fn model_name(&self) -> &str {
            "failing"
        }

        async fn invoke(&self, _prompt: &ChatPrompt) -> Result<AiMessage> {
            Err(AppError::Upstream("connection refused".to_string()))
        }
    }

    /// Records the request id visible when the model is called.
    #[derive(Default)]
    struct RequestIdModel {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatModel for RequestIdModel {
        fn model_name(&self) -> &str {
            "request-id"
        }

        async fn invoke(&self, _prompt: &ChatPrompt) -> Result<AiMessage> {
            self.seen.lock().unwrap().push(get_request_id());
            Ok(AiMessage {
                content: "Salut".to_string(),
                model: "request-id".to_string(),
                finish_reason: Some("stop".to_string()),
                usage: None,
            })
        }
    }

    fn french(text: &str) -> TranslationRequest {
        TranslationRequest {
            language: "French".to_string(),
            text: text.to_string(),
        }
    }

    /// Event names in the order they appear on the wire.
    async fn event_names(
        events: impl Stream<Item = std::result::Result<Event, Infallible>> + Send + 'static,
    ) -> Vec<String> {
        let response = Sse::new(events).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec())
            .unwrap()
            .lines()
            .filter_map(|line| line.strip_prefix("event:"))
            .map(|name| name.trim().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_failure_yields_metadata_then_error() {
        let chain = TranslationChain::new(Arc::new(FailingModel));

        let names = event_names(chain_event_stream(chain, french("hello"), Uuid::new_v4())).await;

        assert_eq!(names, vec!["metadata", "error"]);
    }

    #[tokio::test]
    async fn test_model_sees_request_id_after_handler_returns() {
        let model = Arc::new(RequestIdModel::default());
        let chain = TranslationChain::new(model.clone());

        // Built inside the request scope, consumed outside it like an SSE body.
        let events = REQUEST_ID
            .scope("req-42".to_string(), async {
                chain_event_stream(chain, french("hi"), Uuid::new_v4())
            })
            .await;
        let names = event_names(events).await;

        assert_eq!(names, vec!["metadata", "data", "end"]);
        assert_eq!(*model.seen.lock().unwrap(), vec!["req-42".to_string()]);
    }
}
