//! Run statistics, mutated concurrently by workers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use crate::model::{BatchSummary, Outcome};

/// Counters for one run: total task count plus per-outcome tallies and
/// elapsed wall-clock time.
///
/// Owned exclusively by the active job for its lifetime. Counters are only
/// ever mutated by atomic increment from worker completions; reads tolerate
/// concurrent writers and may momentarily lag.
#[derive(Debug)]
pub struct BatchStats {
    total: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
    started: Mutex<Instant>,
}

impl BatchStats {
    pub fn new() -> Self {
        BatchStats {
            total: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            started: Mutex::new(Instant::now()),
        }
    }

    /// Zero all counters, set the task total, and restart the clock.
    /// Called once at the start of each run.
    pub fn reset(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
        self.succeeded.store(0, Ordering::SeqCst);
        self.failed.store(0, Ordering::SeqCst);
        self.skipped.store(0, Ordering::SeqCst);
        if let Ok(mut started) = self.started.lock() {
            *started = Instant::now();
        }
    }

    /// Record one completed task.
    pub fn record(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Success => &self.succeeded,
            Outcome::Failed => &self.failed,
            Outcome::Skipped => &self.skipped,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Number of tasks finished so far, regardless of outcome.
    pub fn completed(&self) -> usize {
        self.succeeded() + self.failed() + self.skipped()
    }

    /// Snapshot the counters into an end-of-run summary.
    pub fn summary(&self, cancelled: bool) -> BatchSummary {
        let elapsed = self
            .started
            .lock()
            .map(|started| started.elapsed())
            .unwrap_or_default();
        BatchSummary {
            total: self.total(),
            succeeded: self.succeeded(),
            failed: self.failed(),
            skipped: self.skipped(),
            elapsed,
            cancelled,
        }
    }
}

impl Default for BatchStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_record_and_summary() {
        let stats = BatchStats::new();
        stats.reset(3);
        stats.record(Outcome::Success);
        stats.record(Outcome::Failed);
        stats.record(Outcome::Skipped);

        let summary = stats.summary(false);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert!(!summary.cancelled);
        assert_eq!(
            summary.total,
            summary.succeeded + summary.failed + summary.skipped
        );
    }

    #[test]
    fn test_reset_clears_previous_run() {
        let stats = BatchStats::new();
        stats.reset(2);
        stats.record(Outcome::Success);
        stats.record(Outcome::Success);

        stats.reset(5);
        assert_eq!(stats.total(), 5);
        assert_eq!(stats.completed(), 0);
    }

    #[test]
    fn test_concurrent_increments() {
        let stats = BatchStats::new();
        stats.reset(400);

        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for i in 0..100 {
                        let outcome = match i % 3 {
                            0 => Outcome::Success,
                            1 => Outcome::Failed,
                            _ => Outcome::Skipped,
                        };
                        stats.record(outcome);
                    }
                });
            }
        });

        assert_eq!(stats.completed(), 400);
        assert_eq!(
            stats.succeeded() + stats.failed() + stats.skipped(),
            stats.total()
        );
    }
}
