//! Mock implementations for testing.
//!
//! Completion services, loaders and stores that can be used across test
//! files without touching the network or the filesystem.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use slidesbot::{
    AgentRegistry, AnswerEnvelope, Catalog, CatalogStore, CategoryRange, ChatMessage,
    CompletionService, InvokeOptions, ProgressObserver, Query, Resource, ResourceLayout,
    ResourceLoader, RoundReport, SpecialistConfig, SummaryRecord, Tier,
};
use slidesbot::types::{AppError, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One recorded request.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<ChatMessage>,
    pub options: InvokeOptions,
}

/// Completion service that replays a fixed script of replies.
///
/// `Ok` entries are returned as model text, `Err` entries as `AppError::LLM`.
/// Once the script is exhausted every call fails.
#[derive(Default)]
pub struct ScriptedService {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedService {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn from_results(replies: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl CompletionService for ScriptedService {
    async fn invoke(&self, messages: &[ChatMessage], options: &InvokeOptions) -> Result<String> {
        self.calls.lock().push(RecordedCall {
            messages: messages.to_vec(),
            options: options.clone(),
        });
        match self.script.lock().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(e)) => Err(AppError::LLM(e)),
            None => Err(AppError::LLM("script exhausted".to_string())),
        }
    }

    fn model_for(&self, _tier: Tier) -> &str {
        "scripted"
    }
}

/// Specialist backend: answers `"<question> (answered)"` after a random delay.
///
/// Questions containing `FAIL` produce an error.
#[derive(Default)]
pub struct EchoSpecialistService {
    calls: AtomicUsize,
}

impl EchoSpecialistService {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionService for EchoSpecialistService {
    async fn invoke(&self, messages: &[ChatMessage], _options: &InvokeOptions) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let question = messages
            .last()
            .and_then(|m| m.content.lines().find_map(|l| l.strip_prefix("Question: ")))
            .unwrap_or_default()
            .to_string();

        tokio::time::sleep(Duration::from_millis(rand::random_range(0..25))).await;

        if question.contains("FAIL") {
            return Err(AppError::LLM(format!("specialist refused: {}", question)));
        }
        Ok(format!("{} (answered)", question))
    }

    fn model_for(&self, _tier: Tier) -> &str {
        "echo"
    }
}

/// Summary backend: returns a valid `{keywords, brief}` object for any lecture,
/// except that lecture ids listed in `failures` fail their first N requests.
#[derive(Default)]
pub struct SummaryService {
    failures: Mutex<HashMap<u32, usize>>,
    calls: AtomicUsize,
}

impl SummaryService {
    pub fn failing(failures: impl IntoIterator<Item = (u32, usize)>) -> Self {
        Self {
            failures: Mutex::new(failures.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn lecture_id(messages: &[ChatMessage]) -> Option<u32> {
    let content = &messages.last()?.content;
    let start = content.find("(Lecture ")? + "(Lecture ".len();
    let end = start + content[start..].find(')')?;
    content[start..end].parse().ok()
}

#[async_trait]
impl CompletionService for SummaryService {
    async fn invoke(&self, messages: &[ChatMessage], _options: &InvokeOptions) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let id = lecture_id(messages)
            .ok_or_else(|| AppError::LLM("no lecture id in prompt".to_string()))?;

        {
            let mut failures = self.failures.lock();
            if let Some(left) = failures.get_mut(&id) {
                if *left > 0 {
                    *left -= 1;
                    return Err(AppError::LLM(format!("transient failure for {}", id)));
                }
            }
        }

        Ok(format!(
            r#"{{"keywords": ["topic{id}", "syntax{id}"], "brief": "Lecture {id} in brief."}}"#
        ))
    }

    fn model_for(&self, _tier: Tier) -> &str {
        "summary"
    }
}

/// Loader over an in-memory list of lecture bodies.
pub struct InMemoryLoader {
    layout: ResourceLayout,
    loads: AtomicUsize,
}

impl InMemoryLoader {
    pub fn new(layout: ResourceLayout) -> Self {
        Self {
            layout,
            loads: AtomicUsize::new(0),
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ResourceLoader for InMemoryLoader {
    fn load(&self, id: u32) -> Result<Resource> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.layout.is_valid(i64::from(id)) {
            return Err(AppError::InvalidInput(
                self.layout.invalid_id_message(i64::from(id)),
            ));
        }
        Ok(Resource {
            id,
            category: self.layout.category(id).map(str::to_string),
            content: format!("Slides of lecture {}", id),
            media_dir: None,
        })
    }
}

/// Catalog store that keeps every saved snapshot.
#[derive(Default)]
pub struct InMemoryStore {
    initial: Mutex<Catalog>,
    saves: Mutex<Vec<Catalog>>,
}

impl InMemoryStore {
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            initial: Mutex::new(catalog),
            saves: Mutex::new(Vec::new()),
        }
    }

    pub fn saves(&self) -> Vec<Catalog> {
        self.saves.lock().clone()
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn load(&self) -> Result<Catalog> {
        Ok(self
            .saves
            .lock()
            .last()
            .cloned()
            .unwrap_or_else(|| self.initial.lock().clone()))
    }

    async fn save(&self, catalog: &Catalog) -> Result<()> {
        self.saves.lock().push(catalog.clone());
        Ok(())
    }
}

/// Observer that records every event.
#[derive(Default)]
pub struct RecordingObserver {
    pub rounds: Mutex<Vec<RoundReport>>,
    pub dispatched: Mutex<Vec<(String, Vec<Query>)>>,
    pub received: Mutex<Vec<Vec<AnswerEnvelope>>>,
}

impl ProgressObserver for RecordingObserver {
    fn summary_round(&self, report: &RoundReport) {
        self.rounds.lock().push(report.clone());
    }

    fn questions_dispatched(&self, reasoning: &str, queries: &[Query]) {
        self.dispatched
            .lock()
            .push((reasoning.to_string(), queries.to_vec()));
    }

    fn answers_received(&self, _queries: &[Query], answers: &[AnswerEnvelope]) {
        self.received.lock().push(answers.to_vec());
    }
}

/// The C/C++ course layout: 29 lectures, 0-10 in C and 11-28 in C++.
pub fn course_layout() -> ResourceLayout {
    ResourceLayout::new(
        29,
        vec![
            CategoryRange::new("C", 0, 10),
            CategoryRange::new("C++", 11, 28),
        ],
    )
}

/// A complete record for every lecture of `layout`.
pub fn course_summaries(layout: &ResourceLayout) -> Vec<(u32, SummaryRecord)> {
    layout
        .ids()
        .map(|id| {
            (
                id,
                SummaryRecord {
                    title: format!("Lecture title {}", id),
                    keywords: vec![format!("kw{}", id)],
                    brief: format!("Brief {}", id),
                },
            )
        })
        .collect()
}

/// A registry over the course layout whose specialists use `llm`.
pub fn course_registry(
    llm: Arc<dyn CompletionService>,
    loader: Arc<InMemoryLoader>,
) -> Arc<AgentRegistry> {
    let layout = course_layout();
    let summaries = course_summaries(&layout);
    Arc::new(AgentRegistry::new(
        llm,
        loader,
        layout,
        summaries,
        SpecialistConfig::default(),
    ))
}
