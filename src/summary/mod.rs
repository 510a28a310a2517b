//! Summary Completion Engine
//!
//! Before the coordinator can describe the course to the model, every resource
//! needs a complete [`SummaryRecord`]. The engine loads whatever catalog exists,
//! then runs rounds until nothing is missing:
//!
//! 1. Dispatch one summarization task per incomplete id (bounded by `max_workers`).
//! 2. Each task asks the fast tier, in structured mode, for `{keywords, brief}`,
//!    retrying up to `max_attempts` times.
//! 3. After the round joins, merge the successes (with titles from the index),
//!    persist the catalog and report the round.
//!
//! There is deliberately no round limit. A resource that keeps failing is
//! retried in every round until it succeeds or the process is stopped.

use crate::catalog::{Catalog, CatalogStore, SummaryRecord, TitleIndex};
use crate::dispatch::dispatch;
use crate::llm::{ChatMessage, CompletionService, InvokeOptions};
use crate::observer::{NoopObserver, ProgressObserver, RoundReport};
use crate::resources::ResourceLoader;
use crate::types::{AppError, Result};
use crate::utils::json::strip_code_fence;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Engine settings.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Concurrent summarization tasks per round.
    pub max_workers: usize,
    /// Requests per resource per round before giving up on it for the round.
    pub max_attempts: usize,
    /// How the course is described in prompts.
    pub course_name: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_workers: 12,
            max_attempts: 3,
            course_name: "an introductory C/C++ programming course".to_string(),
        }
    }
}

/// What the model returns for one resource. The title is never generated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SummaryDraft {
    pub keywords: Vec<String>,
    pub brief: String,
}

impl SummaryDraft {
    /// Parse and validate a structured model response.
    pub fn parse(text: &str) -> Result<Self> {
        let draft: SummaryDraft = serde_json::from_str(strip_code_fence(text))
            .map_err(|e| AppError::LLM(format!("Malformed summary: {}", e)))?;

        if draft.keywords.is_empty() {
            return Err(AppError::LLM("Summary has no keywords".to_string()));
        }
        if draft.brief.trim().is_empty() {
            return Err(AppError::LLM("Summary has an empty brief".to_string()));
        }
        Ok(draft)
    }
}

const SUMMARY_SYSTEM_PROMPT: &str = r#"You are an expert assistant that writes concise summaries of programming course lecture slides. Extract the key concepts, topics and learning objectives from the lecture content and return them as JSON.

Guidelines:
- Focus on the main programming concepts and techniques covered
- Use important syntax, keywords, functions, data types and concepts as keywords
- Write a brief summary that captures the essential topics and learning objectives
- Keep the brief concise but complete enough to convey the lecture's scope
- Do NOT start the brief with introductory phrases
- Output valid JSON with exactly two fields: "keywords" (array of strings) and "brief" (string)"#;

fn summary_user_prompt(course_name: &str, id: u32, category: Option<&str>, content: &str) -> String {
    let kind = category
        .map(|c| format!("{} lecture", c))
        .unwrap_or_else(|| "lecture".to_string());

    format!(
        r#"Analyze the following {kind} content from {course_name} (Lecture {id}) and extract:

1. Keywords: important programming concepts, syntax elements, functions, data types and techniques covered
2. Brief: a concise overview of the main topics and learning objectives

Respond with JSON in this form:

{{
    "keywords": ["keyword1", "keyword2", "..."],
    "brief": "A concise summary of the lecture content."
}}

Lecture content:

{content}"#
    )
}

/// Drives summarization rounds until the catalog is complete.
pub struct SummaryEngine {
    llm: Arc<dyn CompletionService>,
    loader: Arc<dyn ResourceLoader>,
    store: Arc<dyn CatalogStore>,
    titles: TitleIndex,
    config: SummaryConfig,
    observer: Arc<dyn ProgressObserver>,
}

impl SummaryEngine {
    pub fn new(
        llm: Arc<dyn CompletionService>,
        loader: Arc<dyn ResourceLoader>,
        store: Arc<dyn CatalogStore>,
        titles: TitleIndex,
        config: SummaryConfig,
    ) -> Self {
        Self {
            llm,
            loader,
            store,
            titles,
            config,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Report every finished round to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    fn resource_ids(&self) -> std::ops::Range<u32> {
        0..self.titles.len() as u32
    }

    /// Run rounds until every resource has a complete record, and return the catalog.
    pub async fn run(&self) -> Result<Catalog> {
        let mut catalog = self.store.load().await?;
        let mut remaining = catalog.incomplete_ids(self.resource_ids());
        let mut round = 0;

        while !remaining.is_empty() {
            round += 1;
            info!(round, remaining = remaining.len(), "Starting summarization round");

            let report = self.run_round(round, &mut catalog, remaining).await?;
            self.observer.summary_round(&report);
            remaining = report.remaining;
        }

        info!(rounds = round, resources = self.titles.len(), "All lectures summarized");
        Ok(catalog)
    }

    async fn run_round(
        &self,
        round: usize,
        catalog: &mut Catalog,
        attempted: Vec<u32>,
    ) -> Result<RoundReport> {
        let max_attempts = self.config.max_attempts.max(1);
        let outcomes = dispatch(attempted.clone(), self.config.max_workers, |id| {
            let llm = self.llm.clone();
            let loader = self.loader.clone();
            let course_name = self.config.course_name.clone();
            async move { summarize_resource(llm, loader, id, max_attempts, course_name).await }
        })
        .await;

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for (&id, outcome) in attempted.iter().zip(outcomes) {
            match outcome {
                Ok(draft) => {
                    let title = self.titles.title(id).ok_or_else(|| {
                        AppError::Internal(format!("No title for lecture {}", id))
                    })?;
                    catalog.insert(
                        id,
                        SummaryRecord {
                            title: title.to_string(),
                            keywords: draft.keywords,
                            brief: draft.brief,
                        },
                    )?;
                    succeeded.push(id);
                }
                Err(e) => {
                    warn!(resource_id = id, round, error = %e, "Lecture summarization failed");
                    failed.push(id);
                }
            }
        }

        self.store.save(catalog).await?;

        Ok(RoundReport {
            round,
            attempted,
            succeeded,
            failed,
            remaining: catalog.incomplete_ids(self.resource_ids()),
        })
    }
}

async fn summarize_resource(
    llm: Arc<dyn CompletionService>,
    loader: Arc<dyn ResourceLoader>,
    id: u32,
    max_attempts: usize,
    course_name: String,
) -> Result<SummaryDraft> {
    let resource = loader.load(id)?;
    let messages = [
        ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
        ChatMessage::user(summary_user_prompt(
            &course_name,
            id,
            resource.category.as_deref(),
            &resource.content,
        )),
    ];
    let options = InvokeOptions::fast().structured();

    let mut last_error = None;
    for attempt in 1..=max_attempts {
        match llm.invoke(&messages, &options).await.and_then(|text| SummaryDraft::parse(&text)) {
            Ok(draft) => return Ok(draft),
            Err(e) => {
                debug!(resource_id = id, attempt, error = %e, "Summary attempt failed");
                last_error = Some(e);
            }
        }
    }

    Err(AppError::LLM(format!(
        "Failed to summarize lecture {} after {} attempts: {}",
        id,
        max_attempts,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_parse_accepts_fenced_object() {
        let draft =
            SummaryDraft::parse("```json\n{\"keywords\": [\"printf\"], \"brief\": \"I/O\"}\n```")
                .unwrap();
        assert_eq!(draft.keywords, vec!["printf"]);
        assert_eq!(draft.brief, "I/O");
    }

    #[test]
    fn test_draft_parse_rejects_bad_shapes() {
        assert!(SummaryDraft::parse("not json").is_err());
        assert!(SummaryDraft::parse(r#"{"keywords": [], "brief": "x"}"#).is_err());
        assert!(SummaryDraft::parse(r#"{"keywords": ["a"], "brief": ""}"#).is_err());
        assert!(SummaryDraft::parse(r#"{"keywords": [1], "brief": "x"}"#).is_err());
        assert!(SummaryDraft::parse(r#"{"brief": "x"}"#).is_err());
    }

    #[test]
    fn test_user_prompt_names_category_and_lecture() {
        let prompt = summary_user_prompt("CS100", 12, Some("C++"), "class Foo {};");
        assert!(prompt.contains("C++ lecture content from CS100 (Lecture 12)"));
        assert!(prompt.ends_with("class Foo {};"));

        let prompt = summary_user_prompt("CS100", 3, None, "x");
        assert!(prompt.contains("following lecture content"));
    }
}
