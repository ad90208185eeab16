//! Filesystem operations: input enumeration and partial-output cleanup.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::model::ARCHIVE_EXTENSIONS;

/// Enumerate regular files directly under `root` (non-recursive), in
/// directory-enumeration order. Subfolders are ignored.
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>, EngineError> {
    let mut files = Vec::new();
    for entry in read_dir_checked(root)? {
        let entry = entry.map_err(|e| enumeration_error(root, e))?;
        let file_type = entry.file_type().map_err(|e| enumeration_error(root, e))?;
        if file_type.is_file() {
            files.push(entry.path());
        }
    }
    Ok(files)
}

/// Enumerate archive files (`.zip`, `.7z`, `.rar`, case-insensitive) under
/// `root`, descending into subfolders when `recursive` is set. Order is the
/// directory-enumeration order, deterministic for a fixed filesystem state.
pub fn find_archives(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, EngineError> {
    let mut archives = Vec::new();
    collect_archives(root, recursive, &mut archives)?;
    Ok(archives)
}

fn collect_archives(
    dir: &Path,
    recursive: bool,
    out: &mut Vec<PathBuf>,
) -> Result<(), EngineError> {
    for entry in read_dir_checked(dir)? {
        let entry = entry.map_err(|e| enumeration_error(dir, e))?;
        let file_type = entry.file_type().map_err(|e| enumeration_error(dir, e))?;
        let path = entry.path();
        if file_type.is_dir() {
            if recursive {
                collect_archives(&path, recursive, out)?;
            }
        } else if file_type.is_file() && is_archive(&path) {
            out.push(path);
        }
    }
    Ok(())
}

/// True if the path carries one of the recognized archive extensions.
pub fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ARCHIVE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Best-effort removal of a partially written output file. Absence is fine;
/// anything else is logged and swallowed so cleanup never masks the original
/// failure.
pub fn remove_partial(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove partial output");
        }
    }
}

fn read_dir_checked(dir: &Path) -> Result<fs::ReadDir, EngineError> {
    fs::read_dir(dir).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            EngineError::InputRootNotFound {
                path: dir.to_path_buf(),
            }
        } else {
            enumeration_error(dir, e)
        }
    })
}

fn enumeration_error(dir: &Path, source: io::Error) -> EngineError {
    EngineError::Enumeration {
        path: dir.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_files_is_not_recursive() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("a.txt"), b"a").expect("Failed to write a.txt");
        fs::write(temp_dir.path().join("b.txt"), b"b").expect("Failed to write b.txt");
        let sub = temp_dir.path().join("sub");
        fs::create_dir(&sub).expect("Failed to create subdir");
        fs::write(sub.join("c.txt"), b"c").expect("Failed to write c.txt");

        let files = list_files(temp_dir.path()).expect("Failed to list files");
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.parent() == Some(temp_dir.path())));
    }

    #[test]
    fn test_list_files_missing_root() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let missing = temp_dir.path().join("nope");
        let result = list_files(&missing);
        assert!(matches!(
            result,
            Err(EngineError::InputRootNotFound { .. })
        ));
    }

    #[test]
    fn test_find_archives_filters_extensions() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("a.zip"), b"z").expect("write");
        fs::write(temp_dir.path().join("b.7z"), b"7").expect("write");
        fs::write(temp_dir.path().join("c.rar"), b"r").expect("write");
        fs::write(temp_dir.path().join("d.txt"), b"t").expect("write");
        fs::write(temp_dir.path().join("E.ZIP"), b"Z").expect("write");

        let archives = find_archives(temp_dir.path(), false).expect("Failed to scan");
        assert_eq!(archives.len(), 4);
    }

    #[test]
    fn test_find_archives_recursion_flag() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("top.zip"), b"z").expect("write");
        let sub = temp_dir.path().join("nested");
        fs::create_dir(&sub).expect("Failed to create subdir");
        fs::write(sub.join("deep.7z"), b"7").expect("write");

        let flat = find_archives(temp_dir.path(), false).expect("Failed to scan");
        assert_eq!(flat.len(), 1);

        let deep = find_archives(temp_dir.path(), true).expect("Failed to scan");
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn test_remove_partial_tolerates_missing_file() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("never-written.zip");
        remove_partial(&path);
        assert!(!path.exists());

        fs::write(&path, b"partial").expect("write");
        remove_partial(&path);
        assert!(!path.exists());
    }
}
