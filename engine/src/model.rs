//! Core data model for batch archive jobs.
//!
//! This module defines the data structures shared by the two job types:
//! - FileTask: one unit of work produced by enumeration
//! - Outcome: per-task classification (Success, Failed, Skipped)
//! - BatchSummary: end-of-run aggregate handed back to the caller
//! - JobMode, OutputFormat: enums controlling behavior

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

/// Archive extensions recognized by the verification scan.
pub const ARCHIVE_EXTENSIONS: [&str; 3] = ["zip", "7z", "rar"];

/// The operation a job performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobMode {
    /// Compress every file in the input folder into an individual archive
    Compress,
    /// Check integrity of every archive under the input tree
    Verify,
}

impl std::fmt::Display for JobMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobMode::Compress => write!(f, "Compress"),
            JobMode::Verify => write!(f, "Verify"),
        }
    }
}

/// Archive container format produced by compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutputFormat {
    /// 7-Zip container (LZMA2)
    SevenZ,
    /// Zip container (Deflate)
    Zip,
}

impl OutputFormat {
    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::SevenZ => "7z",
            OutputFormat::Zip => "zip",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, ".{}", self.extension())
    }
}

/// One enumerated unit of work.
///
/// Created when a job enumerates its input tree, immutable afterwards, and
/// consumed exactly once by a worker. Compression tasks carry the derived
/// archive path; verification tasks carry only the archive to check.
#[derive(Debug, Clone)]
pub struct FileTask {
    /// Input file (compression) or archive under test (verification)
    pub input: PathBuf,

    /// Derived archive path; `None` for verification tasks
    pub output: Option<PathBuf>,
}

impl FileTask {
    pub fn compression(input: PathBuf, output: PathBuf) -> Self {
        FileTask {
            input,
            output: Some(output),
        }
    }

    pub fn verification(archive: PathBuf) -> Self {
        FileTask {
            input: archive,
            output: None,
        }
    }

    /// Base name of the input, for progress events and log lines.
    pub fn file_name(&self) -> String {
        display_name(&self.input)
    }
}

/// Base name of a path as a displayable string.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Per-task classification.
///
/// Skipped means the destination already existed; it is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed,
    Skipped,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Success => write!(f, "Success"),
            Outcome::Failed => write!(f, "Failed"),
            Outcome::Skipped => write!(f, "Skipped"),
        }
    }
}

/// Aggregate counts for a finished (or cancelled) run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub elapsed: Duration,
    pub cancelled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_extension() {
        assert_eq!(OutputFormat::SevenZ.extension(), "7z");
        assert_eq!(OutputFormat::Zip.extension(), "zip");
        assert_eq!(OutputFormat::Zip.to_string(), ".zip");
    }

    #[test]
    fn test_file_task_file_name() {
        let task = FileTask::verification(PathBuf::from("/data/archives/photos.zip"));
        assert_eq!(task.file_name(), "photos.zip");
        assert!(task.output.is_none());
    }

    #[test]
    fn test_compression_task_carries_output() {
        let task = FileTask::compression(
            PathBuf::from("/in/report.txt"),
            PathBuf::from("/out/report.txt.7z"),
        );
        assert_eq!(task.output.as_deref(), Some(Path::new("/out/report.txt.7z")));
    }
}
