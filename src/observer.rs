//! Progress hooks
//!
//! The engine never prints. Anything that wants to watch a run (the CLI, a
//! test, a metrics exporter) implements [`ProgressObserver`] and overrides
//! the events it cares about.

use crate::types::{AnswerEnvelope, Query};

/// Outcome of one summarization round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    /// 1-based round number.
    pub round: usize,
    /// Ids that were dispatched this round.
    pub attempted: Vec<u32>,
    /// Ids whose summary was merged into the catalog.
    pub succeeded: Vec<u32>,
    /// Ids that exhausted their attempts this round.
    pub failed: Vec<u32>,
    /// Ids still missing a complete summary after the merge.
    pub remaining: Vec<u32>,
}

/// Receives progress events. Every method defaults to a no-op.
pub trait ProgressObserver: Send + Sync {
    /// A summarization round joined and the catalog was persisted.
    fn summary_round(&self, _report: &RoundReport) {}

    /// The coordinator ordered a batch of specialist queries.
    fn questions_dispatched(&self, _reasoning: &str, _queries: &[Query]) {}

    /// A batch of specialist answers came back, in query order.
    fn answers_received(&self, _queries: &[Query], _answers: &[AnswerEnvelope]) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}
