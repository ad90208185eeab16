//! Verification job orchestration.
//!
//! Walks the input tree for archives, runs each through the backend's
//! integrity check, and optionally relocates files by outcome. Verification
//! is strictly sequential: the backend process/library is not assumed safe
//! for concurrent invocation.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use uuid::Uuid;

use crate::backend::{ArchiveBackend, BackendError};
use crate::cancel::CancellationSignal;
use crate::collab::ReportSink;
use crate::config::JobConfig;
use crate::error::{panic_message, EngineError};
use crate::fs_ops;
use crate::model::{display_name, BatchSummary, FileTask, JobMode, Outcome};
use crate::progress::ProgressReporter;
use crate::relocate::{self, MoveOutcome};
use crate::stats::BatchStats;

const PROGRESS_VERB: &str = "Verified";

/// Ceiling on a single integrity check, independent of user cancellation.
/// A hung backend fails one item instead of stalling the whole batch.
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(120);

/// What a single check attempt produced.
enum CheckResult {
    Valid,
    Invalid(String),
    TimedOut,
    Cancelled,
}

/// Verifies the integrity of every archive under the input root and
/// relocates files by outcome when configured to.
pub struct VerificationJob {
    id: Uuid,
    config: JobConfig,
    backend: Arc<dyn ArchiveBackend>,
    reporter: Arc<dyn ProgressReporter>,
    report_sink: Arc<dyn ReportSink>,
    cancel: CancellationSignal,
    stats: BatchStats,
    check_timeout: Duration,
}

impl VerificationJob {
    pub fn new(
        config: JobConfig,
        backend: Arc<dyn ArchiveBackend>,
        reporter: Arc<dyn ProgressReporter>,
        report_sink: Arc<dyn ReportSink>,
        cancel: CancellationSignal,
    ) -> Result<Self, EngineError> {
        if config.mode != JobMode::Verify {
            return Err(EngineError::Config {
                reason: format!("verification job given a {} configuration", config.mode),
            });
        }
        config.validate()?;
        Ok(VerificationJob {
            id: Uuid::new_v4(),
            config,
            backend,
            reporter,
            report_sink,
            cancel,
            stats: BatchStats::new(),
            check_timeout: DEFAULT_CHECK_TIMEOUT,
        })
    }

    /// Override the per-item check timeout.
    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }

    /// Execute the batch. Archives are processed in directory-enumeration
    /// order; the summary is logged and returned even when cancelled.
    pub fn run(&self) -> Result<BatchSummary, EngineError> {
        let tasks: Vec<FileTask> =
            fs_ops::find_archives(&self.config.input_root, self.config.include_subfolders)?
                .into_iter()
                .map(FileTask::verification)
                .collect();
        self.stats.reset(tasks.len());

        tracing::info!(
            job = %self.id,
            input = %self.config.input_root.display(),
            archives = tasks.len(),
            recursive = self.config.include_subfolders,
            "verification started"
        );
        self.reporter.log(&format!(
            "Verifying {} archive(s) under {}",
            tasks.len(),
            self.config.input_root.display()
        ));

        for task in &tasks {
            if self.cancel.is_cancelled() {
                break;
            }
            let file_name = task.file_name();
            // Per-item boundary: nothing that happens while verifying one
            // archive may take down the loop for the rest.
            let item = panic::catch_unwind(AssertUnwindSafe(|| self.verify_one(&task.input)));
            let outcome = match item {
                Ok(Some(outcome)) => outcome,
                Ok(None) => break,
                Err(payload) => {
                    let detail = panic_message(&payload);
                    tracing::error!(file = %file_name, %detail, "verification panicked");
                    self.reporter
                        .log(&format!("Failed: {file_name} (internal error)"));
                    self.report_sink.submit(&format!(
                        "panic while verifying {file_name}: {detail}"
                    ));
                    Outcome::Failed
                }
            };
            self.stats.record(outcome);
            self.reporter.report(
                self.stats.completed(),
                self.stats.total(),
                &file_name,
                PROGRESS_VERB,
            );
        }

        let summary = self.stats.summary(self.cancel.is_cancelled());
        self.log_summary(&summary);
        Ok(summary)
    }

    /// Check one archive and apply the configured relocation. Returns
    /// `None` when the run was cancelled mid-check.
    fn verify_one(&self, archive: &Path) -> Option<Outcome> {
        let file_name = display_name(archive);

        let valid = match self.check_with_timeout(archive) {
            CheckResult::Valid => true,
            CheckResult::Invalid(reason) => {
                tracing::warn!(file = %file_name, %reason, "archive failed verification");
                self.reporter.log(&format!("Failed: {file_name} ({reason})"));
                false
            }
            CheckResult::TimedOut => {
                tracing::warn!(
                    file = %file_name,
                    timeout = ?self.check_timeout,
                    "verification timed out"
                );
                self.reporter.log(&format!(
                    "Failed: {file_name} (check exceeded {} s)",
                    self.check_timeout.as_secs()
                ));
                false
            }
            CheckResult::Cancelled => {
                self.reporter
                    .log(&format!("Cancelled while verifying {file_name}"));
                return None;
            }
        };

        let outcome = if valid {
            if let Some(root) = self.config.move_on_success.clone() {
                self.relocate(archive, &root);
            }
            Outcome::Success
        } else {
            if let Some(root) = self.config.move_on_failure.clone() {
                self.relocate(archive, &root);
            }
            Outcome::Failed
        };
        Some(outcome)
    }

    /// Run the backend check on a helper thread and wait at most
    /// `check_timeout`. A timed-out helper is abandoned; it holds only its
    /// own file handle and the channel sender.
    fn check_with_timeout(&self, archive: &Path) -> CheckResult {
        let (result_tx, result_rx) = crossbeam_channel::bounded(1);
        let backend = Arc::clone(&self.backend);
        let cancel = self.cancel.clone();
        let path: PathBuf = archive.to_path_buf();
        thread::spawn(move || {
            let _ = result_tx.send(backend.check(&path, &cancel));
        });

        match result_rx.recv_timeout(self.check_timeout) {
            Ok(Ok(true)) => CheckResult::Valid,
            Ok(Ok(false)) => CheckResult::Invalid("integrity check failed".to_string()),
            Ok(Err(BackendError::Cancelled)) => CheckResult::Cancelled,
            Ok(Err(BackendError::Failed(reason))) => CheckResult::Invalid(reason),
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(file = %archive.display(), "abandoning stuck check worker");
                CheckResult::TimedOut
            }
            Err(RecvTimeoutError::Disconnected) => {
                // The helper died without answering — a backend panic.
                let report = format!("verification worker died on {}", archive.display());
                self.report_sink.submit(&report);
                CheckResult::Invalid("check worker terminated unexpectedly".to_string())
            }
        }
    }

    fn relocate(&self, archive: &Path, destination_root: &Path) {
        let file_name = display_name(archive);
        match relocate::move_to_root(
            archive,
            destination_root,
            &self.config.input_root,
            self.config.include_subfolders,
        ) {
            Ok(MoveOutcome::Moved(target)) => {
                self.reporter
                    .log(&format!("Moved {file_name} to {}", target.display()));
            }
            Ok(MoveOutcome::SkippedExisting(target)) => {
                self.reporter.log(&format!(
                    "Not moved: {} already exists",
                    target.display()
                ));
            }
            Err(e) => {
                tracing::warn!(file = %file_name, error = %e, "relocation failed");
                self.reporter
                    .log(&format!("Could not move {file_name}: {e}"));
            }
        }
    }

    fn log_summary(&self, summary: &BatchSummary) {
        let state = if summary.cancelled { "cancelled" } else { "finished" };
        tracing::info!(
            job = %self.id,
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "verification {state}"
        );
        self.reporter.log(&format!(
            "Verification {state}: {} total, {} valid, {} failed",
            summary.total, summary.succeeded, summary.failed
        ));
    }
}
