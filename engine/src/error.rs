//! Error types for the batch engine.
//!
//! `EngineError` covers job-level failures that prevent a run from starting
//! or enumerating. Per-item failures are never errors at this level: they are
//! recorded as an `Outcome` and the batch continues.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop a run before any task executes.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Rejected by pre-run validation; the run never begins.
    #[error("invalid job configuration: {reason}")]
    Config { reason: String },

    /// Input root does not exist.
    #[error("input folder not found: {}", path.display())]
    InputRootNotFound { path: PathBuf },

    /// Input root could not be enumerated (permissions, I/O).
    #[error("failed to enumerate {}: {source}", path.display())]
    Enumeration {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Output root could not be created.
    #[error("cannot create output folder {}: {source}", path.display())]
    OutputRootUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Human-readable text from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
