//! Chat model interface used by the translation chain.

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use serde::{Deserialize, Serialize};

use super::prompt::ChatPrompt;
use crate::core::Result;

/// Token usage statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Generated assistant message.
#[derive(Debug, Clone, PartialEq)]
pub struct AiMessage {
    /// Generated text
    pub content: String,
    /// Model that produced the message, as reported by the provider
    pub model: String,
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

/// Incremental piece of a streamed assistant message.
#[derive(Debug, Clone, PartialEq)]
pub struct AiMessageChunk {
    pub content: String,
    pub finish_reason: Option<String>,
}

/// Stream of message chunks.
pub type MessageStream = BoxStream<'static, Result<AiMessageChunk>>;

/// A stateless chat-completion model.
///
/// Each call is a single attempt; implementations do not retry.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Identifier of the underlying model, used in logs and metrics.
    fn model_name(&self) -> &str;

    /// Generate a complete response for the prompt.
    async fn invoke(&self, prompt: &ChatPrompt) -> Result<AiMessage>;

    /// Generate a response as a stream of chunks.
    ///
    /// The default implementation yields the whole [`invoke`](Self::invoke)
    /// result as a single chunk.
    async fn stream(&self, prompt: &ChatPrompt) -> Result<MessageStream> {
        let message = self.invoke(prompt).await?;
        let chunk = AiMessageChunk {
            content: message.content,
            finish_reason: message.finish_reason,
        };
        Ok(Box::pin(stream::once(async move { Ok(chunk) })))
    }
}
