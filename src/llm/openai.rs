use crate::llm::client::{ChatMessage, CompletionService, InvokeOptions, Tier};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Resolved connection settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Base URL, e.g. `https://api.deepseek.com` or `https://api.openai.com/v1`.
    pub api_base: String,
    /// Bearer token.
    pub api_key: String,
    /// Model used for [`Tier::Fast`].
    pub basic_model: String,
    /// Model used for [`Tier::Deep`], if any.
    pub reasoner_model: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for any endpoint speaking the OpenAI chat-completions protocol.
pub struct OpenAICompatibleClient {
    http: reqwest::Client,
    settings: ClientSettings,
    fallback_warned: AtomicBool,
}

impl OpenAICompatibleClient {
    pub fn new(settings: ClientSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AppError::LLM(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            settings,
            fallback_warned: AtomicBool::new(false),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.api_base.trim_end_matches('/')
        )
    }

    fn resolve_model(&self, tier: Tier) -> &str {
        match (tier, self.settings.reasoner_model.as_deref()) {
            (Tier::Deep, Some(model)) => model,
            (Tier::Deep, None) => {
                if !self.fallback_warned.swap(true, Ordering::Relaxed) {
                    tracing::warn!(
                        basic_model = %self.settings.basic_model,
                        "reasoner_model not set, falling back to basic_model for deep requests"
                    );
                }
                &self.settings.basic_model
            }
            (Tier::Fast, _) => &self.settings.basic_model,
        }
    }
}

#[async_trait]
impl CompletionService for OpenAICompatibleClient {
    async fn invoke(&self, messages: &[ChatMessage], options: &InvokeOptions) -> Result<String> {
        let model = self.resolve_model(options.tier);
        let body = ChatCompletionRequest {
            model,
            messages,
            stream: false,
            temperature: options.temperature,
            response_format: options.structured.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        tracing::debug!(
            model,
            messages = messages.len(),
            structured = options.structured,
            "Sending chat completion"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LLM(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLM(format!(
                "Chat completion failed ({}): {}",
                status, text
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::LLM(format!("No response content from model '{}'", model)))
    }

    fn model_for(&self, tier: Tier) -> &str {
        match tier {
            Tier::Deep => self
                .settings
                .reasoner_model
                .as_deref()
                .unwrap_or(&self.settings.basic_model),
            Tier::Fast => &self.settings.basic_model,
        }
    }
}
