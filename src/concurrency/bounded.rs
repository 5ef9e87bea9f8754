//! Bounded-concurrency task runner

use crate::concurrency::timeout::with_timeout;
use crate::error::{CompkitError, CompkitResult};
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::collections::VecDeque;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

/// Options for [`run_bounded`]
#[derive(Debug, Clone)]
pub struct BoundedOptions {
    /// Maximum tasks in flight at once
    pub concurrency: usize,

    /// Stop starting new tasks after the first failure
    pub stop_on_error: bool,

    /// Per-task deadline
    pub task_timeout: Option<Duration>,
}

impl Default for BoundedOptions {
    fn default() -> Self {
        Self {
            concurrency: 5,
            stop_on_error: false,
            task_timeout: None,
        }
    }
}

/// A failed task and the input index it belonged to
#[derive(Debug)]
pub struct TaskFailure {
    pub index: usize,
    pub error: CompkitError,
}

/// Aggregated result of a bounded run
#[derive(Debug)]
pub struct BoundedOutcome<R> {
    /// Indexed like the input; `None` where the task failed or never ran
    pub results: Vec<Option<R>>,

    /// Failures, ordered by input index
    pub errors: Vec<TaskFailure>,

    /// Indices never started because `stop_on_error` drained the queue
    pub skipped: Vec<usize>,

    /// Wall-clock time for the whole run
    pub duration: Duration,
}

/// Run `worker` over `items` with at most `concurrency` tasks in flight.
///
/// Completion order is unspecified. Every item is attempted exactly once
/// unless `stop_on_error` truncates the queue; tasks already in flight when
/// that happens are allowed to finish.
pub async fn run_bounded<T, R, F, Fut>(
    items: Vec<T>,
    worker: F,
    options: &BoundedOptions,
) -> CompkitResult<BoundedOutcome<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T, usize) -> Fut,
    Fut: Future<Output = CompkitResult<R>> + Send + 'static,
{
    if options.concurrency == 0 {
        return Err(CompkitError::InvalidOption(
            "concurrency must be at least 1".to_string(),
        ));
    }

    let started = Instant::now();
    let total = items.len();
    let mut results: Vec<Option<R>> = (0..total).map(|_| None).collect();
    let mut errors = Vec::new();
    let mut skipped = Vec::new();
    let mut queue: VecDeque<(usize, T)> = items.into_iter().enumerate().collect();
    let mut in_flight = FuturesUnordered::new();
    let mut draining = false;

    loop {
        while !draining && in_flight.len() < options.concurrency {
            let Some((index, item)) = queue.pop_front() else {
                break;
            };
            let task = worker(item, index);
            let deadline = options.task_timeout;
            in_flight.push(async move {
                let outcome = match deadline {
                    Some(after) => with_timeout(task, after, format!("task #{}", index))
                        .await
                        .and_then(|inner| inner),
                    None => join(task).await,
                };
                (index, outcome)
            });
        }

        let Some((index, outcome)) = in_flight.next().await else {
            break;
        };

        match outcome {
            Ok(value) => results[index] = Some(value),
            Err(error) => {
                debug!("Task #{} failed: {}", index, error);
                errors.push(TaskFailure { index, error });
                if options.stop_on_error && !draining {
                    draining = true;
                    skipped.extend(queue.drain(..).map(|(i, _)| i));
                    debug!("Stopping after failure, {} task(s) skipped", skipped.len());
                }
            }
        }
    }

    errors.sort_by_key(|failure| failure.index);

    Ok(BoundedOutcome {
        results,
        errors,
        skipped,
        duration: started.elapsed(),
    })
}

async fn join<Fut, R>(task: Fut) -> CompkitResult<R>
where
    Fut: Future<Output = CompkitResult<R>> + Send + 'static,
    R: Send + 'static,
{
    tokio::spawn(task)
        .await
        .map_err(|e| CompkitError::Internal(format!("task failed: {}", e)))?
}
