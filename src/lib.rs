//! Machine Translator - a chat-model powered translation microservice
//!
//! The service accepts a target language and a piece of text, renders them
//! into a two-turn prompt, sends it to an OpenAI-compatible chat-completion
//! provider and returns the generated text.
//!
//! # Architecture
//!
//! - [`core`]: configuration, errors, logging, metrics, middleware
//! - [`chain`]: prompt template, chat model client, output parser and the
//!   [`TranslationChain`](chain::TranslationChain) that composes them
//! - [`api`]: HTTP handlers, request/response envelopes and the router
//!
//! # Configuration
//!
//! Environment variables (a `.env` file is honored):
//! - `OPENAI_API_KEY`: provider credential; requests fail without it
//! - `OPENAI_API_BASE`: provider base URL (default: https://api.openai.com/v1)
//! - `OPENAI_MODEL`: model identifier (default: gpt-3.5-turbo)
//! - `TEMPERATURE`: sampling temperature (default: 0.2)
//! - `HOST` / `PORT`: bind address (default: 127.0.0.1:8000)
//! - `REQUEST_TIMEOUT_SECS`: optional upstream timeout
//! - `VERIFY_SSL`: verify upstream certificates (default: true)

pub mod api;
pub mod chain;
pub mod core;

// Re-export commonly used types for convenience
pub use api::{create_router, AppState};
pub use chain::{ChatModel, OpenAiChatModel, TranslationChain, TranslationRequest};
pub use core::{AppConfig, AppError, Result};
