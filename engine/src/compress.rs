//! Compression job orchestration.
//!
//! Enumerates the files directly under the input root, derives one archive
//! path per file, and drives the per-file compression routine either
//! sequentially or through a bounded worker pool.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::thread;

use uuid::Uuid;

use crate::backend::{ArchiveBackend, BackendError};
use crate::cancel::CancellationSignal;
use crate::collab::ReportSink;
use crate::config::JobConfig;
use crate::error::{panic_message, EngineError};
use crate::fs_ops;
use crate::model::{display_name, BatchSummary, FileTask, JobMode, Outcome};
use crate::progress::ProgressReporter;
use crate::sanitize::sanitize_file_name;
use crate::stats::BatchStats;
use crate::throughput::ThroughputSampler;

const PROGRESS_VERB: &str = "Compressed";

/// How the per-item routine left the batch: with a recorded outcome, or
/// aborted by the run-wide cancellation signal.
enum ItemResult {
    Completed(Outcome),
    Cancelled,
}

/// Compresses every file directly under the input root into an individual
/// archive.
///
/// All collaborators arrive at construction; the job holds no global state.
/// One job instance performs one run.
pub struct CompressionJob {
    id: Uuid,
    config: JobConfig,
    backend: Arc<dyn ArchiveBackend>,
    reporter: Arc<dyn ProgressReporter>,
    report_sink: Arc<dyn ReportSink>,
    cancel: CancellationSignal,
    stats: BatchStats,
}

impl CompressionJob {
    pub fn new(
        config: JobConfig,
        backend: Arc<dyn ArchiveBackend>,
        reporter: Arc<dyn ProgressReporter>,
        report_sink: Arc<dyn ReportSink>,
        cancel: CancellationSignal,
    ) -> Result<Self, EngineError> {
        if config.mode != JobMode::Compress {
            return Err(EngineError::Config {
                reason: format!("compression job given a {} configuration", config.mode),
            });
        }
        config.validate()?;
        Ok(CompressionJob {
            id: Uuid::new_v4(),
            config,
            backend,
            reporter,
            report_sink,
            cancel,
            stats: BatchStats::new(),
        })
    }

    /// Execute the batch. Blocks until every task has completed or the run
    /// was cancelled; either way the summary is logged and returned.
    pub fn run(&self) -> Result<BatchSummary, EngineError> {
        let files = fs_ops::list_files(&self.config.input_root)?;
        if let Some(root) = self.config.output_root.as_deref() {
            fs::create_dir_all(root).map_err(|e| EngineError::OutputRootUnavailable {
                path: root.to_path_buf(),
                source: e,
            })?;
        }
        let tasks = self.plan_tasks(&files);
        self.stats.reset(tasks.len());

        tracing::info!(
            job = %self.id,
            input = %self.config.input_root.display(),
            files = tasks.len(),
            workers = self.config.max_concurrency,
            "compression started"
        );
        self.reporter.log(&format!(
            "Compressing {} file(s) from {}",
            tasks.len(),
            self.config.input_root.display()
        ));

        let sampler = ThroughputSampler::start(Arc::clone(&self.reporter));

        if self.config.max_concurrency > 1 {
            self.run_pool(&tasks, &sampler);
        } else {
            for task in &tasks {
                if self.cancel.is_cancelled() {
                    break;
                }
                if matches!(self.process_one(task, &sampler), ItemResult::Cancelled) {
                    break;
                }
            }
        }

        sampler.stop();

        let summary = self.stats.summary(self.cancel.is_cancelled());
        self.log_summary(&summary);
        Ok(summary)
    }

    /// Derive one task per enumerated file. The archive name is the
    /// sanitized input base name with the format extension appended, so
    /// `report.txt` becomes `report.txt.zip`.
    fn plan_tasks(&self, files: &[std::path::PathBuf]) -> Vec<FileTask> {
        let output_root = match self.config.output_root.as_deref() {
            Some(root) => root,
            // validate() already required this; an empty plan is the safe
            // answer if it was bypassed.
            None => return Vec::new(),
        };
        files
            .iter()
            .map(|input| {
                let base = display_name(input);
                let archive_name = format!(
                    "{}.{}",
                    sanitize_file_name(&base),
                    self.config.format.extension()
                );
                FileTask::compression(input.clone(), output_root.join(archive_name))
            })
            .collect()
    }

    /// Bounded worker pool: workers pull tasks from a shared queue until it
    /// drains or the run is cancelled.
    fn run_pool(&self, tasks: &[FileTask], sampler: &ThroughputSampler) {
        let (task_tx, task_rx) = crossbeam_channel::unbounded::<FileTask>();
        for task in tasks {
            // unbounded channel: send cannot block, and the receivers
            // outlive this loop
            let _ = task_tx.send(task.clone());
        }
        drop(task_tx);

        thread::scope(|scope| {
            for _ in 0..self.config.max_concurrency {
                let task_rx = task_rx.clone();
                scope.spawn(move || {
                    while let Ok(task) = task_rx.recv() {
                        if self.cancel.is_cancelled() {
                            break;
                        }
                        if matches!(self.process_one(&task, sampler), ItemResult::Cancelled) {
                            break;
                        }
                    }
                });
            }
        });
    }

    /// Per-item boundary: nothing that happens inside one task may take
    /// down the batch loop. Panics are logged, reported, and recorded as a
    /// failed item.
    fn process_one(&self, task: &FileTask, sampler: &ThroughputSampler) -> ItemResult {
        let file_name = task.file_name();
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.compress_file(task, sampler)));
        let item = match result {
            Ok(item) => item,
            Err(payload) => {
                let detail = panic_message(&payload);
                tracing::error!(file = %file_name, %detail, "compression panicked");
                self.reporter
                    .log(&format!("Failed: {file_name} (internal error)"));
                self.report_sink.submit(&format!(
                    "panic while compressing {file_name}: {detail}"
                ));
                ItemResult::Completed(Outcome::Failed)
            }
        };

        if let ItemResult::Completed(outcome) = &item {
            self.stats.record(*outcome);
            self.reporter.report(
                self.stats.completed(),
                self.stats.total(),
                &file_name,
                PROGRESS_VERB,
            );
        }
        item
    }

    fn compress_file(&self, task: &FileTask, sampler: &ThroughputSampler) -> ItemResult {
        let file_name = task.file_name();
        let Some(output) = task.output.as_deref() else {
            debug_assert!(false, "compression task without an output path");
            return ItemResult::Completed(Outcome::Failed);
        };

        // Existence check and archive creation are not transactional; a
        // second process racing on the same output can still collide. Known
        // accepted limitation.
        if output.exists() {
            self.reporter.log(&format!(
                "Skipped: {file_name} ({} already exists)",
                display_name(output)
            ));
            return ItemResult::Completed(Outcome::Skipped);
        }

        sampler.track(output);

        match self
            .backend
            .create(&task.input, output, self.config.format, &self.cancel)
        {
            Ok(()) => {
                copy_mtime(&task.input, output);
                if self.config.delete_originals {
                    self.delete_original(&task.input);
                }
                ItemResult::Completed(Outcome::Success)
            }
            Err(BackendError::Cancelled) => {
                fs_ops::remove_partial(output);
                self.reporter.log(&format!("Cancelled while compressing {file_name}"));
                ItemResult::Cancelled
            }
            Err(BackendError::Failed(reason)) => {
                fs_ops::remove_partial(output);
                tracing::warn!(file = %file_name, %reason, "archive creation failed");
                self.reporter.log(&format!("Failed: {file_name} ({reason})"));
                ItemResult::Completed(Outcome::Failed)
            }
        }
    }

    /// Best-effort: a stubborn original never flips a successful archive
    /// back to a failure.
    fn delete_original(&self, input: &Path) {
        if let Err(e) = fs::remove_file(input) {
            let file_name = display_name(input);
            tracing::warn!(file = %file_name, error = %e, "could not delete original");
            self.reporter
                .log(&format!("Could not delete original {file_name}: {e}"));
        }
    }

    fn log_summary(&self, summary: &BatchSummary) {
        let state = if summary.cancelled { "cancelled" } else { "finished" };
        tracing::info!(
            job = %self.id,
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "compression {state}"
        );
        self.reporter.log(&format!(
            "Compression {state}: {} total, {} succeeded, {} failed, {} skipped",
            summary.total, summary.succeeded, summary.failed, summary.skipped
        ));
    }
}

/// Give the archive the source file's modification time; purely cosmetic,
/// so errors are ignored.
fn copy_mtime(input: &Path, output: &Path) {
    if let Ok(metadata) = fs::metadata(input) {
        if let Ok(mtime) = metadata.modified() {
            let _ = filetime::set_file_mtime(output, filetime::FileTime::from_system_time(mtime));
        }
    }
}
