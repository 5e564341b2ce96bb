//! Shared helpers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use machine_translator::{
    api::{create_router, AppState},
    chain::{AiMessage, ChatModel, ChatPrompt, TranslationChain},
    AppError, Result,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// What the mock model does when called.
pub enum Behavior {
    /// Always answer with the same text
    Fixed(String),
    /// Answer with the system and user turns joined by a newline
    Echo,
    /// Fail as if the provider were unreachable
    NetworkFailure,
}

/// Chat model double that records every prompt it receives.
pub struct MockChatModel {
    behavior: Behavior,
    prompts: Mutex<Vec<ChatPrompt>>,
}

impl MockChatModel {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn fixed(text: &str) -> Arc<Self> {
        Self::new(Behavior::Fixed(text.to_string()))
    }

    pub fn echo() -> Arc<Self> {
        Self::new(Behavior::Echo)
    }

    pub fn failing() -> Arc<Self> {
        Self::new(Behavior::NetworkFailure)
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<ChatPrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    fn model_name(&self) -> &str {
        "mock"
    }

    async fn invoke(&self, prompt: &ChatPrompt) -> Result<AiMessage> {
        self.prompts.lock().unwrap().push(prompt.clone());

        let content = match &self.behavior {
            Behavior::Fixed(text) => text.clone(),
            Behavior::Echo => format!("{}\n{}", prompt.system.content, prompt.user.content),
            Behavior::NetworkFailure => {
                return Err(AppError::Upstream(
                    "failed to connect to provider: connection refused".to_string(),
                ))
            }
        };

        Ok(AiMessage {
            content,
            model: "mock".to_string(),
            finish_reason: Some("stop".to_string()),
            usage: None,
        })
    }
}

/// Router wired to the given model.
pub fn app_with(model: Arc<MockChatModel>) -> Router {
    let chain = TranslationChain::new(model);
    create_router(Arc::new(AppState::new(chain)))
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

/// `(event, data)` pairs from an SSE body.
pub fn parse_sse(body: &str) -> Vec<(String, String)> {
    body.split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .map(|block| {
            let mut event = String::new();
            let mut data = String::new();
            for line in block.lines() {
                if let Some(value) = line.strip_prefix("event:") {
                    event = value.trim().to_string();
                } else if let Some(value) = line.strip_prefix("data:") {
                    data = value.trim().to_string();
                }
            }
            (event, data)
        })
        .collect()
}
