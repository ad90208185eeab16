//! # ArcBatch Engine - Batch Archive Library
//!
//! A headless engine for batch-compressing files and verifying archive
//! integrity, designed as the foundation for multiple UIs (CLI, GUI,
//! automation).
//!
//! ## Overview
//!
//! The engine runs two kinds of jobs over a folder:
//! - **Compression**: every file directly under the input root becomes an
//!   individual `.7z` or `.zip` archive in the output root
//! - **Verification**: every archive under the input tree is
//!   integrity-checked, optionally relocating files by outcome
//!
//! Byte-level archive work is delegated to a pluggable [`ArchiveBackend`];
//! an in-process implementation ([`LibraryBackend`]) and one driving an
//! external `7z` executable ([`SevenZipCommandBackend`]) are provided.
//! Progress, log lines, and throughput samples flow through a
//! [`ProgressReporter`] sink, so the engine stays decoupled from any
//! presentation technology.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use engine::{
//!     CancellationSignal, CompressionJob, JobConfig, LibraryBackend,
//!     NullReporter, NullReportSink, OutputFormat,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = JobConfig::compress(
//!     PathBuf::from("/data/documents"),
//!     PathBuf::from("/data/archives"),
//!     OutputFormat::SevenZ,
//! );
//!
//! let cancel = CancellationSignal::new();
//! let job = CompressionJob::new(
//!     config,
//!     Arc::new(LibraryBackend::new()),
//!     Arc::new(NullReporter),
//!     Arc::new(NullReportSink),
//!     cancel.clone(),
//! )?;
//!
//! let summary = job.run()?;
//! println!(
//!     "{} succeeded, {} failed, {} skipped",
//!     summary.succeeded, summary.failed, summary.skipped
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - **model**: Core data structures (FileTask, Outcome, BatchSummary, enums)
//! - **config**: Per-run parameters and validation
//! - **error**: Job-level error types
//! - **backend**: Archive backend capability and its two implementations
//! - **compress** / **verify**: Job orchestration
//! - **stats**: Atomic run counters
//! - **progress**: Progress reporter trait
//! - **throughput**: Periodic write-rate sampling
//! - **relocate**: Outcome-based file relocation
//! - **sanitize**: File name sanitization
//! - **cancel**: Cooperative cancellation signal
//! - **collab**: Folder-picker and crash-report collaborator interfaces

pub mod backend;
pub mod cancel;
pub mod collab;
pub mod compress;
pub mod config;
pub mod error;
pub mod fs_ops;
pub mod model;
pub mod progress;
pub mod relocate;
pub mod sanitize;
pub mod stats;
pub mod throughput;
pub mod verify;

// Re-export main types and functions
pub use backend::{ArchiveBackend, BackendError, LibraryBackend, SevenZipCommandBackend};
pub use cancel::CancellationSignal;
pub use collab::{FolderPicker, NullReportSink, ReportSink};
pub use compress::CompressionJob;
pub use config::JobConfig;
pub use error::EngineError;
pub use model::{BatchSummary, FileTask, JobMode, Outcome, OutputFormat};
pub use progress::{NullReporter, ProgressReporter};
pub use relocate::{move_to_root, MoveOutcome};
pub use sanitize::sanitize_file_name;
pub use stats::BatchStats;
pub use throughput::ThroughputSampler;
pub use verify::VerificationJob;
