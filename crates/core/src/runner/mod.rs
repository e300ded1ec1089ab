//! Concurrency-bounded batch runner.
//!
//! Runs an ordered batch of independent fallible futures with at most
//! `limit` of them in flight, reporting progress as each one settles.
//! Results come back in submission order regardless of completion order.
//!
//! When a task fails, no further tasks are dispatched, but the ones already
//! running are allowed to finish. The first failure is then returned together
//! with every result that did succeed.
//!
//! # Example
//!
//! ```ignore
//! use std::num::NonZeroUsize;
//! use forced_stereo_core::runner::run_bounded;
//!
//! let jobs = paths.iter().map(|p| transcode(p)).collect();
//! let outputs = run_bounded(jobs, NonZeroUsize::new(4).unwrap(), |done, total| {
//!     println!("{}/{}", done, total);
//! })
//! .await?;
//! ```

mod progress;

pub use progress::{ProgressSnapshot, ProgressTracker};

use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;
use thiserror::Error;
use tracing::{debug, warn};

/// A batch that stopped because one of its tasks failed.
#[derive(Debug, Error)]
#[error("task {index} of {total} failed: {source}")]
pub struct BatchFailure<T, E>
where
    T: fmt::Debug,
    E: std::error::Error + 'static,
{
    /// Submission index of the first task that failed.
    pub index: usize,
    /// Number of tasks in the batch.
    pub total: usize,
    /// The failing task's own error.
    #[source]
    pub source: E,
    /// Per-task results in submission order; `None` for tasks that failed or
    /// were never dispatched.
    pub completed: Vec<Option<T>>,
}

impl<T, E> BatchFailure<T, E>
where
    T: fmt::Debug,
    E: std::error::Error + 'static,
{
    /// Successful results with their submission index.
    pub fn succeeded(&self) -> impl Iterator<Item = (usize, &T)> {
        self.completed
            .iter()
            .enumerate()
            .filter_map(|(idx, r)| r.as_ref().map(|value| (idx, value)))
    }

    /// Discards partial results and returns the underlying error.
    pub fn into_source(self) -> E {
        self.source
    }
}

async fn tagged<F: Future>(index: usize, task: F) -> (usize, F::Output) {
    (index, task.await)
}

/// Runs `tasks` with at most `limit` in flight.
///
/// `on_progress(completed, total)` is called once per settled task with a
/// strictly increasing `completed` that never exceeds `total`.
pub async fn run_bounded<T, E, F, P>(
    tasks: Vec<F>,
    limit: NonZeroUsize,
    mut on_progress: P,
) -> Result<Vec<T>, BatchFailure<T, E>>
where
    F: Future<Output = Result<T, E>>,
    T: fmt::Debug,
    E: std::error::Error + 'static,
    P: FnMut(usize, usize),
{
    let total = tasks.len();
    let mut queue = tasks.into_iter().enumerate();
    let mut in_flight = FuturesUnordered::new();
    let mut results: Vec<Option<T>> = (0..total).map(|_| None).collect();
    let mut first_failure: Option<(usize, E)> = None;
    let mut settled = 0;

    for (index, task) in queue.by_ref().take(limit.get()) {
        in_flight.push(tagged(index, task));
    }

    debug!(total, limit = limit.get(), "Batch started");

    while let Some((index, outcome)) = in_flight.next().await {
        settled += 1;

        match outcome {
            Ok(value) => results[index] = Some(value),
            Err(error) => match first_failure {
                None => {
                    warn!(index, error = %error, "Batch task failed, draining in-flight tasks");
                    first_failure = Some((index, error));
                }
                Some(_) => {
                    warn!(index, error = %error, "Additional batch task failed");
                }
            },
        }

        on_progress(settled, total);

        if first_failure.is_none() {
            if let Some((next_index, task)) = queue.next() {
                in_flight.push(tagged(next_index, task));
            }
        }
    }

    match first_failure {
        None => Ok(results.into_iter().flatten().collect()),
        Some((index, source)) => {
            debug!(
                index,
                settled,
                skipped = total - settled,
                "Batch aborted"
            );
            Err(BatchFailure {
                index,
                total,
                source,
                completed: results,
            })
        }
    }
}
