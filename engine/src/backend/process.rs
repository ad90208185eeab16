//! Archive backend driving an external `7z` executable.
//!
//! Invocation is argument-based, stdout/stderr are captured line by line and
//! forwarded to the trace log, and cancellation maps to killing the child
//! process. Unlike the in-process backend this one handles `.rar` test
//! operations, since the `7z` tool does.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::{ArchiveBackend, BackendError};
use crate::cancel::CancellationSignal;
use crate::model::OutputFormat;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Full-featured backend shelling out to `7z`.
#[derive(Debug, Clone)]
pub struct SevenZipCommandBackend {
    program: PathBuf,
}

impl SevenZipCommandBackend {
    /// `program` is the executable to invoke, usually just `7z` resolved
    /// through `PATH`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        SevenZipCommandBackend {
            program: program.into(),
        }
    }

    fn run(&self, args: &[&str], cancel: &CancellationSignal) -> Result<bool, BackendError> {
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                BackendError::Failed(format!(
                    "failed to launch {}: {e}",
                    self.program.display()
                ))
            })?;

        let stdout_lines = capture_lines(child.stdout.take(), "7z.stdout");
        let stderr_lines = capture_lines(child.stderr.take(), "7z.stderr");

        let status = loop {
            if cancel.is_cancelled() {
                kill_child(&mut child);
                return Err(BackendError::Cancelled);
            }
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    kill_child(&mut child);
                    return Err(BackendError::from_failure(e, cancel));
                }
            }
        };

        if status.success() {
            Ok(true)
        } else {
            // A non-zero exit means 7z ran but rejected the operation;
            // whatever it printed is the best diagnostic we have.
            let mut diagnostics = join_tail(stderr_lines);
            if diagnostics.is_empty() {
                diagnostics = join_tail(stdout_lines);
            }
            tracing::debug!(status = ?status.code(), %diagnostics, "7z exited non-zero");
            Ok(false)
        }
    }
}

impl Default for SevenZipCommandBackend {
    fn default() -> Self {
        Self::new("7z")
    }
}

impl ArchiveBackend for SevenZipCommandBackend {
    fn create(
        &self,
        input: &Path,
        output: &Path,
        format: OutputFormat,
        cancel: &CancellationSignal,
    ) -> Result<(), BackendError> {
        if cancel.is_cancelled() {
            return Err(BackendError::Cancelled);
        }
        let type_flag = match format {
            OutputFormat::SevenZ => "-t7z",
            OutputFormat::Zip => "-tzip",
        };
        let output_arg = output.to_string_lossy().into_owned();
        let input_arg = input.to_string_lossy().into_owned();
        let created = self.run(
            &["a", type_flag, "-y", "-bd", &output_arg, &input_arg],
            cancel,
        )?;
        if created {
            Ok(())
        } else {
            Err(BackendError::Failed(format!(
                "7z could not create {}",
                output.display()
            )))
        }
    }

    fn check(&self, archive: &Path, cancel: &CancellationSignal) -> Result<bool, BackendError> {
        if cancel.is_cancelled() {
            return Err(BackendError::Cancelled);
        }
        let archive_arg = archive.to_string_lossy().into_owned();
        self.run(&["t", "-y", "-bd", &archive_arg], cancel)
    }
}

/// Drain a child stream line by line on a helper thread, forwarding each
/// line to the trace log and collecting them for diagnostics.
fn capture_lines<R: Read + Send + 'static>(
    stream: Option<R>,
    label: &'static str,
) -> Option<JoinHandle<Vec<String>>> {
    stream.map(|stream| {
        thread::spawn(move || {
            let mut lines = Vec::new();
            for line in BufReader::new(stream).lines().map_while(Result::ok) {
                tracing::debug!(target: "engine::backend", "{label}: {line}");
                lines.push(line);
            }
            lines
        })
    })
}

fn join_tail(handle: Option<JoinHandle<Vec<String>>>) -> String {
    let lines = handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default();
    lines.join(" | ")
}

fn kill_child(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_program_fails_to_launch() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let archive = temp_dir.path().join("a.zip");
        fs::write(&archive, b"stub").expect("write");

        let backend = SevenZipCommandBackend::new("definitely-not-a-real-7z-binary");
        let cancel = CancellationSignal::new();
        let result = backend.check(&archive, &cancel);
        assert!(matches!(result, Err(BackendError::Failed(_))));
    }

    #[test]
    fn test_pre_cancelled_check_short_circuits() {
        let backend = SevenZipCommandBackend::default();
        let cancel = CancellationSignal::new();
        cancel.trigger();
        let result = backend.check(Path::new("whatever.zip"), &cancel);
        assert!(matches!(result, Err(BackendError::Cancelled)));
    }
}
