//! Outcome-based file relocation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What happened to a relocation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// File now lives at the contained path.
    Moved(PathBuf),
    /// A file of the same name already exists at the target; the source was
    /// left untouched. Never overwrites.
    SkippedExisting(PathBuf),
}

/// Move `source` under `destination_root`.
///
/// With `mirror_subfolders` set and the source sitting below
/// `base_input_root`, the source directory's path relative to
/// `base_input_root` is recreated under the destination root; otherwise the
/// file lands in `destination_root` directly. The target directory is
/// created if absent.
///
/// Falls back to copy-and-delete when a plain rename crosses filesystems.
pub fn move_to_root(
    source: &Path,
    destination_root: &Path,
    base_input_root: &Path,
    mirror_subfolders: bool,
) -> io::Result<MoveOutcome> {
    let source_dir = source.parent().unwrap_or_else(|| Path::new(""));

    let target_dir = if mirror_subfolders && source_dir != base_input_root {
        match source_dir.strip_prefix(base_input_root) {
            Ok(relative) => destination_root.join(relative),
            // Source outside the scanned tree; no subpath to mirror.
            Err(_) => destination_root.to_path_buf(),
        }
    } else {
        destination_root.to_path_buf()
    };

    fs::create_dir_all(&target_dir)?;

    let file_name = source.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "source has no file name")
    })?;
    let target = target_dir.join(file_name);

    if target.exists() {
        return Ok(MoveOutcome::SkippedExisting(target));
    }

    match fs::rename(source, &target) {
        Ok(()) => Ok(MoveOutcome::Moved(target)),
        Err(rename_err) => match fs::copy(source, &target) {
            Ok(_) => {
                fs::remove_file(source)?;
                Ok(MoveOutcome::Moved(target))
            }
            Err(_) => Err(rename_err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_without_mirroring() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let input = temp_dir.path().join("in");
        let dest = temp_dir.path().join("dest");
        fs::create_dir(&input).expect("create input");
        let file = input.join("a.zip");
        fs::write(&file, b"data").expect("write");

        let outcome = move_to_root(&file, &dest, &input, false).expect("move failed");
        assert_eq!(outcome, MoveOutcome::Moved(dest.join("a.zip")));
        assert!(!file.exists());
        assert!(dest.join("a.zip").exists());
    }

    #[test]
    fn test_move_mirrors_relative_subpath() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let input = temp_dir.path().join("in");
        let sub = input.join("2023").join("jan");
        let dest = temp_dir.path().join("dest");
        fs::create_dir_all(&sub).expect("create subdirs");
        let file = sub.join("a.zip");
        fs::write(&file, b"data").expect("write");

        let outcome = move_to_root(&file, &dest, &input, true).expect("move failed");
        let expected = dest.join("2023").join("jan").join("a.zip");
        assert_eq!(outcome, MoveOutcome::Moved(expected.clone()));
        assert!(expected.exists());
        assert!(!file.exists());
    }

    #[test]
    fn test_mirroring_at_root_goes_to_destination_directly() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let input = temp_dir.path().join("in");
        let dest = temp_dir.path().join("dest");
        fs::create_dir(&input).expect("create input");
        let file = input.join("a.zip");
        fs::write(&file, b"data").expect("write");

        let outcome = move_to_root(&file, &dest, &input, true).expect("move failed");
        assert_eq!(outcome, MoveOutcome::Moved(dest.join("a.zip")));
    }

    #[test]
    fn test_conflict_leaves_source_in_place() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let input = temp_dir.path().join("in");
        let dest = temp_dir.path().join("dest");
        fs::create_dir(&input).expect("create input");
        fs::create_dir(&dest).expect("create dest");
        let file = input.join("a.zip");
        fs::write(&file, b"new").expect("write");
        fs::write(dest.join("a.zip"), b"old").expect("write existing");

        let outcome = move_to_root(&file, &dest, &input, false).expect("move failed");
        assert_eq!(outcome, MoveOutcome::SkippedExisting(dest.join("a.zip")));
        assert!(file.exists());
        let existing = fs::read(dest.join("a.zip")).expect("read");
        assert_eq!(existing, b"old");
    }
}
