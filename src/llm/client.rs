//! Completion service abstraction
//!
//! Everything that talks to a language model goes through [`CompletionService`]:
//! the summary engine, the specialist agents and the coordinator. Requests are a
//! role-tagged message sequence plus [`InvokeOptions`]; responses are plain text.
//!
//! Retry is never done here. Callers decide whether a failure is retried
//! (summarization), surfaced per item (specialist answers) or counted against a
//! budget (forced final answers).

use crate::types::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Quality/cost level of the completion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Cheap, low-latency model.
    Fast,
    /// Reasoning model. Falls back to [`Tier::Fast`] when none is configured.
    Deep,
}

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions.
    System,
    /// User message.
    User,
    /// Assistant response.
    Assistant,
}

/// One role-tagged message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who sent the message.
    pub role: MessageRole,
    /// The text content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Per-request configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeOptions {
    /// Which model tier serves the request.
    pub tier: Tier,
    /// Sampling temperature; `None` keeps the provider default.
    pub temperature: Option<f32>,
    /// Constrain the output to a single JSON object.
    pub structured: bool,
}

impl InvokeOptions {
    /// Fast tier, provider-default temperature, free-form output.
    pub fn fast() -> Self {
        Self {
            tier: Tier::Fast,
            temperature: None,
            structured: false,
        }
    }

    /// Deep tier, provider-default temperature, free-form output.
    pub fn deep() -> Self {
        Self {
            tier: Tier::Deep,
            ..Self::fast()
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Request JSON-object output.
    pub fn structured(mut self) -> Self {
        self.structured = true;
        self
    }
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self::fast()
    }
}

/// Generic completion service for provider abstraction.
///
/// Implementations must be shareable across the concurrent tasks of a
/// dispatch round, hence `Send + Sync`.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Generate a response for the given conversation.
    async fn invoke(&self, messages: &[ChatMessage], options: &InvokeOptions) -> Result<String>;

    /// Model identifier that serves the given tier.
    fn model_for(&self, tier: Tier) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builders() {
        let opts = InvokeOptions::deep().with_temperature(0.3).structured();
        assert_eq!(opts.tier, Tier::Deep);
        assert_eq!(opts.temperature, Some(0.3));
        assert!(opts.structured);

        let fast = InvokeOptions::default();
        assert_eq!(fast.tier, Tier::Fast);
        assert!(fast.temperature.is_none());
        assert!(!fast.structured);
    }

    #[test]
    fn test_message_role_serializes_lowercase() {
        let msg = ChatMessage::assistant("hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "hi");
    }
}
