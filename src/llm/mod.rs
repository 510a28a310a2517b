//! LLM Completion Service
//!
//! This module provides the interface every other component uses to reach a
//! language model, plus the HTTP adapter for OpenAI-compatible endpoints.
//!
//! # Architecture
//!
//! - [`CompletionService`] - The core trait; object safe, shared as `Arc<dyn CompletionService>`
//! - [`InvokeOptions`] - Tier (fast/deep), temperature and structured-output switch
//! - [`OpenAICompatibleClient`] - `/chat/completions` over `reqwest`
//!
//! # Example
//!
//! ```ignore
//! use slidesbot::llm::{ChatMessage, CompletionService, InvokeOptions, OpenAICompatibleClient};
//!
//! let client = OpenAICompatibleClient::new(settings)?;
//! let reply = client
//!     .invoke(&[ChatMessage::user("What is 2+2?")], &InvokeOptions::fast())
//!     .await?;
//! ```

/// Completion service trait and message types.
pub mod client;
/// OpenAI-compatible HTTP adapter.
pub mod openai;

pub use client::{ChatMessage, CompletionService, InvokeOptions, MessageRole, Tier};
pub use openai::{ClientSettings, OpenAICompatibleClient};
