//! # SlidesBot
//!
//! Answers questions about a lecture course by delegating sub-questions to
//! narrow, context-isolated language-model agents, one per lecture, and
//! synthesizing their answers through an iterative coordinator.
//!
//! ## Overview
//!
//! A run has two phases:
//!
//! 1. **Summaries.** [`SummaryEngine`] makes sure every lecture has a complete
//!    [`SummaryRecord`] (title, keywords, brief) in the on-disk catalog,
//!    generating the missing ones in concurrent rounds.
//! 2. **Coordination.** [`Coordinator`] shows the catalog to the deep model,
//!    which asks targeted questions to [`SpecialistAgent`]s (each seeing only
//!    its own lecture) until it can give a final answer.
//!
//! Both phases fan work out through [`dispatch::dispatch`], a bounded,
//! order-preserving, failure-isolating executor.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use slidesbot::{
//!     AgentRegistry, ClientSettings, Coordinator, CoordinatorConfig, DirectoryLoader,
//!     JsonFileStore, OpenAICompatibleClient, SpecialistConfig, SummaryConfig,
//!     SummaryEngine, TitleIndex,
//! };
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let llm = Arc::new(OpenAICompatibleClient::new(settings)?);
//! let titles = TitleIndex::load(Path::new("course/README.md"))?;
//! let layout = course.layout(titles.len() as u32);
//! let loader = Arc::new(DirectoryLoader::new("course", layout.clone()));
//! let store = Arc::new(JsonFileStore::new("course/summary.json"));
//!
//! let catalog = SummaryEngine::new(llm.clone(), loader.clone(), store, titles, SummaryConfig::default())
//!     .run()
//!     .await?;
//! let summaries = catalog.complete_records(layout.ids())?;
//! let registry = Arc::new(AgentRegistry::new(llm.clone(), loader, layout, summaries, SpecialistConfig::default()));
//! let coordinator = Coordinator::new(llm, registry, CoordinatorConfig::default());
//!
//! let result = coordinator.answer("How do I pass arrays to functions in C?", 8).await?;
//! println!("{}", result.answer);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Specialist agents and their registry.
pub mod agents;
/// Summary catalog, title index and persistence.
pub mod catalog;
/// Command-line surface.
pub mod cli;
/// The coordinator loop.
pub mod coordinator;
/// Bounded, order-preserving fan-out.
pub mod dispatch;
/// Completion service abstraction and HTTP client.
pub mod llm;
/// Progress hooks.
pub mod observer;
/// Lecture content and id layout.
pub mod resources;
/// Summary Completion Engine.
pub mod summary;
/// Core types (queries, answers, errors).
pub mod types;
/// Configuration and helpers.
pub mod utils;

// Re-export commonly used types
pub use agents::{Agent, AgentRegistry, SpecialistAgent, SpecialistConfig};
pub use catalog::{Catalog, CatalogStore, JsonFileStore, SummaryRecord, TitleIndex};
pub use coordinator::{
    Coordinator, CoordinatorConfig, CoordinatorResult, Decision, FinishReason, FAILED_ANSWER,
};
pub use llm::{
    ChatMessage, ClientSettings, CompletionService, InvokeOptions, MessageRole,
    OpenAICompatibleClient, Tier,
};
pub use observer::{NoopObserver, ProgressObserver, RoundReport};
pub use resources::{CategoryRange, DirectoryLoader, Resource, ResourceLayout, ResourceLoader};
pub use summary::{SummaryConfig, SummaryEngine};
pub use types::{AnswerEnvelope, AppError, Query, Result};
pub use utils::toml_config::{BotConfig, ConfigError, LlmCredentialsFile};
