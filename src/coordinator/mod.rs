//! Coordinator: the iterative reasoning loop
//!
//! One [`Coordinator::answer`] call owns one conversation with the deep tier:
//!
//! 1. Seed the conversation with the catalog (system) and the question (user).
//! 2. Ask the model for a structured [`Decision`] and append its raw reply.
//! 3. `ask_questions`: fan the queries out to specialists, append the answers
//!    in query order, and go again.
//! 4. `final_answer`: done.
//! 5. Anything else: append a corrective message and go again.
//!
//! Every turn counts against `max_iterations`. When the budget is spent the
//! model is told to answer now; if that fails `forced_answer_attempts` times the
//! result is [`FAILED_ANSWER`].

pub mod decision;
pub mod prompts;

pub use decision::{Decision, DecisionError};
pub use prompts::FAILED_ANSWER;

use crate::agents::AgentRegistry;
use crate::dispatch::dispatch;
use crate::llm::{ChatMessage, CompletionService, InvokeOptions};
use crate::observer::{NoopObserver, ProgressObserver};
use crate::types::{AnswerEnvelope, Query, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Coordinator settings.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Turn budget used by [`Coordinator::ask`].
    pub max_iterations: usize,
    /// Concurrent specialist queries per round.
    pub max_workers: usize,
    /// Requests made after the budget is spent before giving up.
    pub forced_answer_attempts: usize,
    /// How the course is described in prompts.
    pub course_name: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 8,
            max_workers: 8,
            forced_answer_attempts: 3,
            course_name: "an introductory C/C++ programming course".to_string(),
        }
    }
}

/// How a conversation ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FinishReason {
    /// The model gave a final answer within the budget.
    Answered,
    /// The model answered after being forced to.
    Forced,
    /// Even the forced answer failed; the answer is [`FAILED_ANSWER`].
    Failed,
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinishReason::Answered => write!(f, "answered"),
            FinishReason::Forced => write!(f, "forced"),
            FinishReason::Failed => write!(f, "failed"),
        }
    }
}

/// Result of one conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorResult {
    /// Final answer text, or [`FAILED_ANSWER`].
    pub answer: String,
    /// Normal turns taken, not counting forced-answer attempts.
    pub iterations: usize,
    pub finish_reason: FinishReason,
    /// The whole conversation, in order.
    pub messages: Vec<ChatMessage>,
}

/// Turn-based decision maker over a set of specialists.
pub struct Coordinator {
    llm: Arc<dyn CompletionService>,
    registry: Arc<AgentRegistry>,
    config: CoordinatorConfig,
    system_prompt: String,
    observer: Arc<dyn ProgressObserver>,
}

impl Coordinator {
    /// `llm` drives the decisions; the specialists use the registry's own service.
    pub fn new(
        llm: Arc<dyn CompletionService>,
        registry: Arc<AgentRegistry>,
        config: CoordinatorConfig,
    ) -> Self {
        let system_prompt = prompts::system_prompt(
            &config.course_name,
            &registry.layout().describe_categories(),
            registry.summaries(),
        );
        Self {
            llm,
            registry,
            config,
            system_prompt,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Answer `question` within the configured turn budget.
    pub async fn ask(&self, question: &str) -> Result<CoordinatorResult> {
        self.answer(question, self.config.max_iterations).await
    }

    /// Answer `question` in a fresh conversation of at most `max_iterations` turns.
    ///
    /// Errors from the completion service on a normal turn are returned as-is;
    /// everything the model gets wrong is handled inside the conversation.
    pub async fn answer(&self, question: &str, max_iterations: usize) -> Result<CoordinatorResult> {
        let options = InvokeOptions::deep().structured();
        let mut messages = vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(prompts::question_prompt(question)),
        ];

        for iteration in 1..=max_iterations {
            let reply = self.llm.invoke(&messages, &options).await?;
            messages.push(ChatMessage::assistant(reply.clone()));

            let decision = match Decision::parse(&reply) {
                Ok(decision) => decision,
                Err(e) => {
                    warn!(iteration, error = %e, "Coordinator reply rejected");
                    messages.push(ChatMessage::user(e.corrective_message()));
                    continue;
                }
            };

            match decision {
                Decision::FinalAnswer { answer } => {
                    info!(iteration, "Coordinator produced a final answer");
                    return Ok(CoordinatorResult {
                        answer,
                        iterations: iteration,
                        finish_reason: FinishReason::Answered,
                        messages,
                    });
                }
                Decision::AskQuestions {
                    reasoning,
                    questions,
                } => {
                    info!(iteration, questions = questions.len(), "Coordinator asking specialists");
                    let answers = self.ask_specialists(&reasoning, questions).await;
                    let mut content = answer_block(&answers);
                    content.push_str(&prompts::continue_prompt(question));
                    messages.push(ChatMessage::user(content));
                }
                Decision::Unrecognized { action } => {
                    warn!(iteration, action = %action, "Coordinator used an unknown action");
                    messages.push(ChatMessage::user(Decision::unknown_action_message(&action)));
                }
            }
        }

        self.force_answer(messages, max_iterations).await
    }

    /// One specialist round. Invalid ids are answered here and never dispatched.
    async fn ask_specialists(&self, reasoning: &str, queries: Vec<Query>) -> Vec<AnswerEnvelope> {
        self.observer.questions_dispatched(reasoning, &queries);

        let layout = self.registry.layout();
        let mut envelopes: Vec<Option<AnswerEnvelope>> = vec![None; queries.len()];
        let mut pending = Vec::new();
        for (index, query) in queries.iter().enumerate() {
            if layout.is_valid(query.resource_id) {
                pending.push((index, query.clone()));
            } else {
                debug!(resource_id = query.resource_id, "Rejected query for unknown lecture");
                envelopes[index] = Some(AnswerEnvelope::error(
                    query.resource_id,
                    layout.invalid_id_message(query.resource_id),
                ));
            }
        }

        let targets: Vec<(usize, i64)> = pending.iter().map(|(i, q)| (*i, q.resource_id)).collect();
        let outcomes = dispatch(pending, self.config.max_workers, |(_, query)| {
            let registry = self.registry.clone();
            async move {
                let agent = registry.get_or_create(query.resource_id)?;
                agent.answer(&query.question).await
            }
        })
        .await;

        for ((index, resource_id), outcome) in targets.into_iter().zip(outcomes) {
            envelopes[index] = Some(match outcome {
                Ok(text) => AnswerEnvelope::answer(resource_id, text),
                Err(e) => {
                    warn!(resource_id, error = %e, "Specialist failed");
                    AnswerEnvelope::error(resource_id, e.to_string())
                }
            });
        }

        let envelopes: Vec<AnswerEnvelope> = envelopes.into_iter().flatten().collect();
        self.observer.answers_received(&queries, &envelopes);
        envelopes
    }

    async fn force_answer(
        &self,
        mut messages: Vec<ChatMessage>,
        iterations: usize,
    ) -> Result<CoordinatorResult> {
        info!(iterations, "Iteration budget spent, forcing a final answer");
        messages.push(ChatMessage::user(prompts::FORCE_ANSWER_PROMPT));
        let options = InvokeOptions::deep().structured();

        for attempt in 1..=self.config.forced_answer_attempts {
            match self.llm.invoke(&messages, &options).await {
                Ok(reply) => match decision::forced_answer(&reply) {
                    Some(answer) => {
                        return Ok(CoordinatorResult {
                            answer,
                            iterations,
                            finish_reason: FinishReason::Forced,
                            messages,
                        })
                    }
                    None => warn!(attempt, "Forced answer could not be parsed"),
                },
                Err(e) => warn!(attempt, error = %e, "Forced answer request failed"),
            }
        }

        Ok(CoordinatorResult {
            answer: FAILED_ANSWER.to_string(),
            iterations,
            finish_reason: FinishReason::Failed,
            messages,
        })
    }
}

/// The user message carrying one round of answers, in query order.
pub fn answer_block(answers: &[AnswerEnvelope]) -> String {
    let mut block = String::from("Answers:\n\n");
    for envelope in answers {
        block.push_str(&format!(
            "From lecture {}:\n{}\n\n",
            envelope.resource_id,
            envelope.render()
        ));
    }
    block
}
