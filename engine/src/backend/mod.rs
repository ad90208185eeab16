//! Archive backend capability.
//!
//! The engine delegates all byte-level archive work to an implementation of
//! [`ArchiveBackend`]; it never produces or parses archive bytes itself. Two
//! implementations ship: an in-process one built on the `zip` and
//! `sevenz-rust` crates, and one driving an external `7z` executable.

mod library;
mod process;

pub use library::LibraryBackend;
pub use process::SevenZipCommandBackend;

use std::path::Path;

use thiserror::Error;

use crate::cancel::CancellationSignal;
use crate::model::OutputFormat;

/// Failure modes of a backend operation. Cancellation is distinguishable
/// from ordinary failure so jobs can abort the run instead of recording a
/// failed item.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Failed(String),
}

impl BackendError {
    /// Classify an error that surfaced while `cancel` may have fired:
    /// cancellation wins over whatever I/O error it provoked.
    pub(crate) fn from_failure(
        error: impl std::fmt::Display,
        cancel: &CancellationSignal,
    ) -> Self {
        if cancel.is_cancelled() {
            BackendError::Cancelled
        } else {
            BackendError::Failed(error.to_string())
        }
    }
}

/// Creates archives from single input files and checks existing archives.
///
/// `create` may leave a partial file behind on failure or cancellation;
/// deleting it is the caller's responsibility. `check` returns `Ok(false)`
/// for an archive that is readable-but-corrupt and `Err` when the check
/// itself could not run; callers degrade both to a failed item.
pub trait ArchiveBackend: Send + Sync {
    fn create(
        &self,
        input: &Path,
        output: &Path,
        format: OutputFormat,
        cancel: &CancellationSignal,
    ) -> Result<(), BackendError>;

    fn check(&self, archive: &Path, cancel: &CancellationSignal) -> Result<bool, BackendError>;
}
