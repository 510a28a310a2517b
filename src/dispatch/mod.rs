//! Bounded fan-out/fan-in
//!
//! [`dispatch`] runs one task per input item with at most `workers` tasks in
//! flight and returns one outcome per item, aligned with the input order no
//! matter which task finished first. Items are admitted in submission order as
//! capacity frees up.
//!
//! Every task is spawned onto the runtime, so an error or even a panic in one
//! task becomes that item's [`TaskError`] and never touches its siblings. There
//! is no cancellation: the returned future resolves once every task has joined.

use crate::types::Result;
use futures::stream::{self, StreamExt};
use std::future::Future;
use tokio::task::JoinError;

/// Why a dispatched task produced no value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// The task returned an error.
    #[error("{0}")]
    Failed(String),

    /// The task panicked or was aborted by the runtime.
    #[error("task panicked: {0}")]
    Panicked(String),
}

impl From<JoinError> for TaskError {
    fn from(err: JoinError) -> Self {
        if !err.is_panic() {
            return TaskError::Panicked(err.to_string());
        }
        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        TaskError::Panicked(message)
    }
}

/// Outcome of one dispatched task.
pub type TaskOutcome<R> = std::result::Result<R, TaskError>;

/// Run `task` once per item, at most `workers` at a time.
///
/// The output has exactly one entry per input item and `output[i]` belongs to
/// `items[i]`. A `workers` value of zero is treated as one.
pub async fn dispatch<T, R, F, Fut>(items: Vec<T>, workers: usize, mut task: F) -> Vec<TaskOutcome<R>>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<R>> + Send + 'static,
    R: Send + 'static,
{
    let total = items.len();
    let workers = workers.max(1);

    let mut indexed: Vec<(usize, TaskOutcome<R>)> = stream::iter(items.into_iter().enumerate())
        .map(|(index, item)| {
            let fut = task(item);
            async move {
                let outcome = match tokio::spawn(fut).await {
                    Ok(Ok(value)) => Ok(value),
                    Ok(Err(e)) => Err(TaskError::Failed(e.to_string())),
                    Err(join_err) => Err(TaskError::from(join_err)),
                };
                (index, outcome)
            }
        })
        .buffer_unordered(workers)
        .collect()
        .await;

    indexed.sort_unstable_by_key(|(index, _)| *index);
    debug_assert_eq!(indexed.len(), total);
    indexed.into_iter().map(|(_, outcome)| outcome).collect()
}
