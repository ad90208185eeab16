//! Collaborator interfaces consumed by the engine's host.
//!
//! Both are supplied at construction time; the engine holds no ambient
//! singletons.

use std::path::PathBuf;

/// Lets the shell ask the user for a directory. Invoked only between runs,
/// never mid-batch.
pub trait FolderPicker {
    /// Returns the selected directory, or `None` if the user declined.
    /// `purpose` is a short label for the prompt ("input", "output", ...).
    fn pick(&self, purpose: &str) -> Option<PathBuf>;
}

/// Destination for crash/bug reports. Fire-and-forget: implementations
/// swallow their own failures.
pub trait ReportSink: Send + Sync {
    fn submit(&self, report: &str);
}

/// Sink that drops every report; for headless use and tests.
#[derive(Debug, Default)]
pub struct NullReportSink;

impl ReportSink for NullReportSink {
    fn submit(&self, _report: &str) {}
}
