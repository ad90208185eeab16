//! Progress reporting trait.
//!
//! This module defines the ProgressReporter trait, which decouples the batch
//! engine from any specific presentation technology (CLI, GUI, etc.).
//!
//! The engine invokes the sink synchronously from its own worker threads;
//! marshaling to a presentation thread is the implementor's responsibility.

/// Sink for discrete progress events and log lines.
///
/// A pure observer: implementations must not perform business logic and must
/// be safe to call from any worker thread.
pub trait ProgressReporter: Send + Sync {
    /// One task finished. `current` is the number of tasks completed so far
    /// (not the input position — under concurrency completion order is
    /// non-deterministic), `total` the task count, `file_name` the item's
    /// base name, and `verb` the operation label.
    fn report(&self, current: usize, total: usize, file_name: &str, verb: &str);

    /// Free-text log line.
    fn log(&self, line: &str);

    /// Instantaneous write rate from the throughput sampler, in MB/s.
    /// A final `0.0` is emitted when the batch ends.
    fn throughput(&self, mbps: f64);
}

/// Reporter that discards everything; for headless use and tests.
#[derive(Debug, Default)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn report(&self, _current: usize, _total: usize, _file_name: &str, _verb: &str) {}

    fn log(&self, _line: &str) {}

    fn throughput(&self, _mbps: f64) {}
}
