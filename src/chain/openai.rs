//! OpenAI-compatible chat-completion client.
//!
//! Sends the rendered prompt to `{api_base}/chat/completions` with a fixed
//! model and temperature. Supports both a single JSON response and the
//! server-sent event stream produced with `"stream": true`.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::model::{AiMessage, AiMessageChunk, ChatModel, MessageStream, Usage};
use super::prompt::{ChatMessage, ChatPrompt};
use crate::core::config::ProviderConfig;
use crate::core::logging::get_request_id;
use crate::core::metrics::get_metrics;
use crate::core::{AppError, Result};

const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Chat completion request following OpenAI API format.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: [&'a ChatMessage; 2],
    pub temperature: f32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
}

/// Chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// A single choice in the response.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Streaming response chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

/// A single choice in a streaming response.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: Delta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Delta content in streaming responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat model backed by an OpenAI-compatible HTTP API.
pub struct OpenAiChatModel {
    http_client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl OpenAiChatModel {
    pub fn new(http_client: reqwest::Client, config: &ProviderConfig) -> Self {
        tracing::info!(
            model = %config.model,
            api_base = %config.api_base,
            temperature = config.temperature,
            has_api_key = config.api_key.is_some(),
            "Initialized OpenAI chat model"
        );
        Self {
            http_client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::Auth("OPENAI_API_KEY is not set".to_string()))
    }

    /// Send the prompt and return the raw response once the status is known
    /// to be successful.
    async fn send(&self, prompt: &ChatPrompt, stream: bool) -> Result<reqwest::Response> {
        let api_key = self.api_key()?;
        let url = self.endpoint();
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: prompt.messages(),
            temperature: self.temperature,
            stream,
        };

        tracing::debug!(
            request_id = %get_request_id(),
            model = %self.model,
            url = %url,
            stream,
            "Sending chat completion request"
        );

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    request_id = %get_request_id(),
                    url = %url,
                    model = %self.model,
                    error = %e,
                    is_timeout = e.is_timeout(),
                    is_connect = e.is_connect(),
                    "HTTP request failed to provider"
                );
                AppError::from(e)
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        tracing::warn!(
            request_id = %get_request_id(),
            model = %self.model,
            status = %status,
            message = %message,
            "Provider returned error status"
        );

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            Err(AppError::Auth(format!(
                "provider rejected credential ({}): {}",
                status, message
            )))
        } else {
            Err(AppError::Upstream(format!(
                "provider returned {}: {}",
                status, message
            )))
        }
    }

    async fn complete(&self, prompt: &ChatPrompt) -> Result<AiMessage> {
        let response = self.send(prompt, false).await?;
        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("invalid provider response: {}", e)))?;

        if let Some(usage) = &body.usage {
            record_token_usage(usage, &self.model);
        }

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Upstream("provider response has no choices".to_string()))?;

        Ok(AiMessage {
            content: choice.message.content.unwrap_or_default(),
            model: if body.model.is_empty() {
                self.model.clone()
            } else {
                body.model
            },
            finish_reason: choice.finish_reason,
            usage: body.usage,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, prompt: &ChatPrompt) -> Result<AiMessage> {
        let start = Instant::now();
        let result = self.complete(prompt).await;
        observe_latency(&self.model, start, result.is_ok());
        result
    }

    async fn stream(&self, prompt: &ChatPrompt) -> Result<MessageStream> {
        let start = Instant::now();
        let result = self.send(prompt, true).await;
        // Latency here is time to response headers.
        observe_latency(&self.model, start, result.is_ok());
        let response = result?;
        Ok(Box::pin(event_stream(response.bytes_stream())))
    }
}

fn observe_latency(model: &str, start: Instant, success: bool) {
    let outcome = if success { "success" } else { "error" };
    get_metrics()
        .upstream_latency
        .with_label_values(&[model, outcome])
        .observe(start.elapsed().as_secs_f64());
}

fn record_token_usage(usage: &Usage, model: &str) {
    let metrics = get_metrics();
    metrics
        .token_usage
        .with_label_values(&[model, "prompt"])
        .inc_by(usage.prompt_tokens as u64);
    metrics
        .token_usage
        .with_label_values(&[model, "completion"])
        .inc_by(usage.completion_tokens as u64);
}

/// Pull a readable message out of a provider error body.
fn extract_error_message(body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string());

    if message.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let truncated: String = message.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        format!("{}...", truncated)
    } else {
        message
    }
}

enum SseLine {
    Chunk(AiMessageChunk),
    Done,
    Skip,
}

fn parse_sse_line(raw: &[u8]) -> Result<SseLine> {
    let line = std::str::from_utf8(raw)
        .map_err(|e| AppError::Upstream(format!("invalid UTF-8 in provider stream: {}", e)))?
        .trim();

    let Some(data) = line.strip_prefix("data:") else {
        // Blank separators, comments and other SSE fields carry no content.
        return Ok(SseLine::Skip);
    };
    let data = data.trim_start();
    if data == "[DONE]" {
        return Ok(SseLine::Done);
    }

    let chunk: StreamChunk = serde_json::from_str(data)
        .map_err(|e| AppError::Upstream(format!("invalid provider stream chunk: {}", e)))?;

    if let Some(error) = chunk.error {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error")
            .to_string();
        return Err(AppError::Upstream(format!(
            "provider stream error: {}",
            message
        )));
    }

    match chunk.choices.into_iter().next() {
        Some(choice) => Ok(SseLine::Chunk(AiMessageChunk {
            content: choice.delta.content.unwrap_or_default(),
            finish_reason: choice.finish_reason,
        })),
        None => Ok(SseLine::Skip),
    }
}

/// Turn the provider's byte stream into message chunks.
///
/// Lines are split on raw bytes so that multi-byte characters straddling
/// network chunks are decoded intact.
fn event_stream<S, E>(bytes: S) -> impl Stream<Item = Result<AiMessageChunk>> + Send + 'static
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    async_stream::try_stream! {
        let mut bytes = Box::pin(bytes);
        let mut buffer: Vec<u8> = Vec::new();
        let mut done = false;

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk
                .map_err(|e| AppError::Upstream(format!("provider stream interrupted: {}", e)))?;
            buffer.extend_from_slice(&chunk);

            while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                match parse_sse_line(&line)? {
                    SseLine::Chunk(chunk) => yield chunk,
                    SseLine::Done => {
                        done = true;
                        break;
                    }
                    SseLine::Skip => {}
                }
            }

            if done {
                break;
            }
        }

        if !done && !buffer.is_empty() {
            if let SseLine::Chunk(chunk) = parse_sse_line(&buffer)? {
                yield chunk;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use futures::stream;

    fn chunks_from(parts: &[&[u8]]) -> Vec<Result<AiMessageChunk>> {
        let items: Vec<_> = parts
            .iter()
            .map(|p| Ok::<_, std::io::Error>(Bytes::copy_from_slice(p)))
            .collect();
        futures::executor::block_on(event_stream(stream::iter(items)).collect::<Vec<_>>())
    }

    #[test]
    fn test_extract_error_message_from_json() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(extract_error_message(body), "Incorrect API key provided");
    }

    #[test]
    fn test_extract_error_message_truncates_raw_body() {
        let body = "x".repeat(MAX_ERROR_MESSAGE_LEN + 10);
        let message = extract_error_message(&body);
        assert_eq!(message.chars().count(), MAX_ERROR_MESSAGE_LEN + 3);
        assert!(message.ends_with("..."));
    }

    #[test]
    fn test_request_serialization() {
        let prompt = ChatPrompt {
            system: ChatMessage::system("Translate the following text into Italian."),
            user: ChatMessage::user("cat"),
        };
        let request = ChatCompletionRequest {
            model: "gpt-3.5-turbo",
            messages: prompt.messages(),
            temperature: 0.2,
            stream: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "cat");
        assert!(json.get("stream").is_none());
    }

    #[test]
    fn test_event_stream_parses_chunks_until_done() {
        let results = chunks_from(&[
            b"data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Bon\"}}]}\n\n",
            b"data: {\"choices\":[{\"delta\":{\"content\":\"jour\"},\"finish_reason\":null}]}\n\n",
            b"data: [DONE]\n\n",
            b"data: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n\n",
        ]);

        let contents: Vec<String> = results.into_iter().map(|r| r.unwrap().content).collect();
        assert_eq!(contents, vec!["", "Bon", "jour"]);
    }

    #[test]
    fn test_event_stream_handles_split_multibyte_characters() {
        // "é" is 0xC3 0xA9; split it across two network chunks.
        let results = chunks_from(&[
            b"data: {\"choices\":[{\"delta\":{\"content\":\"caf\xC3",
            b"\xA9\"}}]}\n\ndata: [DONE]\n\n",
        ]);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_ref().unwrap().content, "café");
    }

    #[test]
    fn test_event_stream_skips_comments_and_blank_lines() {
        let results = chunks_from(&[
            b": keep-alive\n\n",
            b"event: message\r\ndata: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\r\n\r\n",
        ]);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_ref().unwrap().content, "ok");
    }

    #[test]
    fn test_event_stream_reports_provider_error() {
        let results = chunks_from(&[
            b"data: {\"error\":{\"message\":\"overloaded\"}}\n\n",
        ]);

        assert_eq!(results.len(), 1);
        assert_matches!(&results[0], Err(AppError::Upstream(msg)) if msg.contains("overloaded"));
    }

    #[test]
    fn test_event_stream_rejects_malformed_chunk() {
        let results = chunks_from(&[b"data: {not json}\n\n"]);
        assert_matches!(&results[0], Err(AppError::Upstream(_)));
    }

    #[test]
    fn test_missing_api_key_is_auth_error() {
        let model = OpenAiChatModel::new(reqwest::Client::new(), &ProviderConfig::default());
        assert_matches!(model.api_key(), Err(AppError::Auth(_)));
    }
}
