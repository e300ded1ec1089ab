//! Progress and ETA derived from a runner's completed/total counters.

use serde::Serialize;
use std::time::{Duration, Instant};

/// Point-in-time view of a batch's progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
    /// Completed fraction in `0.0..=1.0`. An empty batch counts as done.
    pub fraction: f64,
    pub elapsed: Duration,
    /// Estimated time remaining, once at least one task has settled.
    pub eta: Option<Duration>,
}

impl ProgressSnapshot {
    pub fn percent(&self) -> f64 {
        self.fraction * 100.0
    }

    pub fn is_finished(&self) -> bool {
        self.completed >= self.total
    }
}

/// Turns `(completed, total)` callbacks into [`ProgressSnapshot`]s.
///
/// The estimate assumes the remaining tasks take as long on average as the
/// ones already settled.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    started_at: Instant,
    total: usize,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self::started_at(total, Instant::now())
    }

    pub fn started_at(total: usize, started_at: Instant) -> Self {
        Self { started_at, total }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Snapshot using the current time.
    pub fn snapshot(&self, completed: usize) -> ProgressSnapshot {
        self.snapshot_with_elapsed(completed, self.started_at.elapsed())
    }

    /// Snapshot for an explicit elapsed time.
    pub fn snapshot_with_elapsed(&self, completed: usize, elapsed: Duration) -> ProgressSnapshot {
        let completed = completed.min(self.total);
        let remaining = self.total - completed;

        let fraction = if self.total == 0 {
            1.0
        } else {
            completed as f64 / self.total as f64
        };

        let eta = if completed == 0 {
            None
        } else {
            Some(elapsed.mul_f64(remaining as f64 / completed as f64))
        };

        ProgressSnapshot {
            completed,
            total: self.total,
            fraction,
            elapsed,
            eta,
        }
    }
}
