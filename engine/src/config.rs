//! Immutable per-run job parameters and their validation.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::EngineError;
use crate::model::{JobMode, OutputFormat};

/// Immutable configuration for one batch run.
///
/// Validated once with [`JobConfig::validate`] before a job is constructed;
/// invalid configurations surface immediately and the run never begins.
#[derive(Debug, Clone, Serialize)]
pub struct JobConfig {
    pub mode: JobMode,

    /// Folder whose files are compressed, or whose tree is scanned for
    /// archives to verify.
    pub input_root: PathBuf,

    /// Where compression writes its archives. Unused by verification.
    pub output_root: Option<PathBuf>,

    /// Container format produced by compression.
    pub format: OutputFormat,

    /// Delete each input file after its archive was created successfully.
    pub delete_originals: bool,

    /// Verification only: recurse into subfolders when scanning, and mirror
    /// the relative subpath when relocating files by outcome.
    pub include_subfolders: bool,

    /// Verification only: relocate archives that pass the check here.
    pub move_on_success: Option<PathBuf>,

    /// Verification only: relocate archives that fail the check here.
    pub move_on_failure: Option<PathBuf>,

    /// Upper bound on concurrent compression workers. Verification is
    /// always sequential.
    pub max_concurrency: usize,
}

impl JobConfig {
    /// Configuration for a compression run with defaults matching the
    /// sequential, keep-originals behavior.
    pub fn compress(input_root: PathBuf, output_root: PathBuf, format: OutputFormat) -> Self {
        JobConfig {
            mode: JobMode::Compress,
            input_root,
            output_root: Some(output_root),
            format,
            delete_originals: false,
            include_subfolders: false,
            move_on_success: None,
            move_on_failure: None,
            max_concurrency: 1,
        }
    }

    /// Configuration for a verification run over `input_root`.
    pub fn verify(input_root: PathBuf) -> Self {
        JobConfig {
            mode: JobMode::Verify,
            input_root,
            output_root: None,
            format: OutputFormat::SevenZ,
            delete_originals: false,
            include_subfolders: false,
            move_on_success: None,
            move_on_failure: None,
            max_concurrency: 1,
        }
    }

    /// Enforce the cross-field invariants.
    ///
    /// Paths are compared textually; two spellings of the same folder are
    /// not detected here and remain the caller's responsibility.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_concurrency < 1 {
            return Err(config_error("max concurrency must be at least 1"));
        }

        match self.mode {
            JobMode::Compress => {
                let output = self.output_root.as_deref().ok_or_else(|| {
                    config_error("compression requires an output folder")
                })?;
                if same_path(&self.input_root, output) {
                    return Err(config_error(
                        "input and output folders must be different",
                    ));
                }
            }
            JobMode::Verify => {
                for (label, root) in [
                    ("success", self.move_on_success.as_deref()),
                    ("failure", self.move_on_failure.as_deref()),
                ] {
                    if let Some(root) = root {
                        if same_path(&self.input_root, root) {
                            return Err(config_error(&format!(
                                "the {label} folder must differ from the input folder"
                            )));
                        }
                    }
                }
                if let (Some(ok_root), Some(bad_root)) =
                    (self.move_on_success.as_deref(), self.move_on_failure.as_deref())
                {
                    if same_path(ok_root, bad_root) {
                        return Err(config_error(
                            "success and failure folders must be different",
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

fn config_error(reason: &str) -> EngineError {
    EngineError::Config {
        reason: reason.to_string(),
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_compress_config() {
        let config = JobConfig::compress(
            PathBuf::from("/in"),
            PathBuf::from("/out"),
            OutputFormat::Zip,
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_compress_rejects_same_input_and_output() {
        let config = JobConfig::compress(
            PathBuf::from("/data"),
            PathBuf::from("/data"),
            OutputFormat::SevenZ,
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_compress_requires_output_root() {
        let mut config = JobConfig::compress(
            PathBuf::from("/in"),
            PathBuf::from("/out"),
            OutputFormat::Zip,
        );
        config.output_root = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = JobConfig::compress(
            PathBuf::from("/in"),
            PathBuf::from("/out"),
            OutputFormat::Zip,
        );
        config.max_concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_verify_rejects_destination_equal_to_input() {
        let mut config = JobConfig::verify(PathBuf::from("/archives"));
        config.move_on_failure = Some(PathBuf::from("/archives"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_verify_rejects_identical_destinations() {
        let mut config = JobConfig::verify(PathBuf::from("/archives"));
        config.move_on_success = Some(PathBuf::from("/sorted"));
        config.move_on_failure = Some(PathBuf::from("/sorted"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_verify_accepts_distinct_destinations() {
        let mut config = JobConfig::verify(PathBuf::from("/archives"));
        config.move_on_success = Some(PathBuf::from("/good"));
        config.move_on_failure = Some(PathBuf::from("/bad"));
        assert!(config.validate().is_ok());
    }
}
