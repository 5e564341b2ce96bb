//! The translation chain: prompt template, chat model and output parser
//! composed into a single linear pipeline.
//!
//! ```text
//! TranslationRequest -> PromptTemplate -> ChatModel -> StrOutputParser -> String
//! ```

pub mod model;
pub mod openai;
pub mod parser;
pub mod prompt;

pub use model::{AiMessage, AiMessageChunk, ChatModel, MessageStream, Usage};
pub use openai::OpenAiChatModel;
pub use parser::StrOutputParser;
pub use prompt::{ChatMessage, ChatPrompt, PromptTemplate, Role};

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::core::Result;

/// Input of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"language": "French", "text": "Good morning"}))]
pub struct TranslationRequest {
    /// Target language, interpolated verbatim into the directive
    pub language: String,
    /// Text to translate
    pub text: String,
}

/// Stream of translated text fragments.
pub type TextStream = BoxStream<'static, Result<String>>;

/// Prompt -> model -> parser.
#[derive(Clone)]
pub struct TranslationChain {
    prompt: PromptTemplate,
    model: Arc<dyn ChatModel>,
    parser: StrOutputParser,
}

impl TranslationChain {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            prompt: PromptTemplate::translation(),
            model,
            parser: StrOutputParser,
        }
    }

    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Run the chain once.
    pub async fn invoke(&self, input: &TranslationRequest) -> Result<String> {
        let prompt = self.prompt.format(input);
        let message = self.model.invoke(&prompt).await?;
        Ok(self.parser.parse(message))
    }

    /// Run the chain for every input, concurrently.
    ///
    /// Results keep the order of `inputs`. At most `max_concurrency` runs are
    /// in flight when given; otherwise all inputs run at once. The first
    /// failure aborts the whole batch.
    pub async fn batch(
        &self,
        inputs: &[TranslationRequest],
        max_concurrency: Option<usize>,
    ) -> Result<Vec<String>> {
        let limit = max_concurrency
            .filter(|n| *n > 0)
            .unwrap_or(inputs.len())
            .max(1);

        // Runs own their input and a chain handle; borrowed runs make the
        // handler future non-general over lifetimes.
        let runs = inputs.iter().cloned().map(|input| {
            let chain = self.clone();
            async move { chain.invoke(&input).await }
        });

        stream::iter(runs)
            .buffered(limit)
            .try_collect()
            .await
    }

    /// Run the chain and stream the generated text.
    ///
    /// Empty fragments (role-only or finish-only chunks) are dropped.
    pub async fn stream(&self, input: &TranslationRequest) -> Result<TextStream> {
        let prompt = self.prompt.format(input);
        let chunks = self.model.stream(&prompt).await?;
        let parser = self.parser;

        Ok(chunks
            .map_ok(move |chunk| parser.parse_chunk(chunk))
            .try_filter(|text| futures::future::ready(!text.is_empty()))
            .boxed())
    }
}
