//! Prompt templates for the translation chain.
//!
//! A template renders a [`TranslationRequest`] into a two-turn [`ChatPrompt`]:
//! a system directive naming the target language and a user turn holding the
//! text. Substitution is a single pass over the template, so placeholder-like
//! sequences inside the substituted values are never expanded again.

use serde::Serialize;

use super::TranslationRequest;

/// Directive sent as the system turn.
pub const SYSTEM_TEMPLATE: &str = "Translate the following text into {language}.";

/// Content sent as the user turn.
pub const USER_TEMPLATE: &str = "{text}";

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Ordered instruction pair handed to the chat model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: ChatMessage,
    pub user: ChatMessage,
}

impl ChatPrompt {
    /// Messages in the order they are sent: system first, then user.
    pub fn messages(&self) -> [&ChatMessage; 2] {
        [&self.system, &self.user]
    }
}

/// System + user template pair.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    system_template: String,
    user_template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::translation()
    }
}

impl PromptTemplate {
    pub fn new(system_template: impl Into<String>, user_template: impl Into<String>) -> Self {
        Self {
            system_template: system_template.into(),
            user_template: user_template.into(),
        }
    }

    /// The fixed translation template.
    pub fn translation() -> Self {
        Self::new(SYSTEM_TEMPLATE, USER_TEMPLATE)
    }

    /// Render the prompt for one request.
    ///
    /// Neither field is validated or escaped; both are inserted verbatim.
    pub fn format(&self, input: &TranslationRequest) -> ChatPrompt {
        let vars = [
            ("language", input.language.as_str()),
            ("text", input.text.as_str()),
        ];

        ChatPrompt {
            system: ChatMessage::system(render(&self.system_template, &vars)),
            user: ChatMessage::user(render(&self.user_template, &vars)),
        }
    }
}

/// Substitute `{name}` placeholders in one pass.
///
/// `{{` and `}}` produce literal braces. Unknown or unterminated
/// placeholders are copied through unchanged.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") {
            out.push('{');
            rest = &tail[2..];
        } else if tail.starts_with("}}") {
            out.push('}');
            rest = &tail[2..];
        } else if tail.starts_with('{') {
            match tail[1..].find('}') {
                Some(end) => {
                    let name = &tail[1..1 + end];
                    match vars.iter().find(|(key, _)| *key == name) {
                        Some((_, value)) => out.push_str(value),
                        None => out.push_str(&tail[..end + 2]),
                    }
                    rest = &tail[end + 2..];
                }
                None => {
                    out.push_str(tail);
                    rest = "";
                }
            }
        } else {
            out.push('}');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}
