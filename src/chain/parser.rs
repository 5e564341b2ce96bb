//! Output parsing: reduce model messages to plain text.

use super::model::{AiMessage, AiMessageChunk};

/// Extracts the generated text and drops everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrOutputParser;

impl StrOutputParser {
    pub fn parse(&self, message: AiMessage) -> String {
        message.content
    }

    pub fn parse_chunk(&self, chunk: AiMessageChunk) -> String {
        chunk.content
    }
}
