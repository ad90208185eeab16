//! In-process archive backend built on the `zip` and `sevenz-rust` crates.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use sevenz_rust::{Password, SevenZArchiveEntry, SevenZReader, SevenZWriter};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::{ArchiveBackend, BackendError};
use crate::cancel::CancellationSignal;
use crate::model::OutputFormat;

/// Split zip/7z backend: `.zip` through the `zip` crate, `.7z` through
/// `sevenz-rust`. Has no `.rar` support; checking a `.rar` reports a
/// per-item failure rather than a guess.
#[derive(Debug, Default)]
pub struct LibraryBackend;

impl LibraryBackend {
    pub fn new() -> Self {
        LibraryBackend
    }
}

impl ArchiveBackend for LibraryBackend {
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
        match format {
            OutputFormat::Zip => create_zip(input, output, cancel),
            OutputFormat::SevenZ => create_7z(input, output, cancel),
        }
    }

    fn check(&self, archive: &Path, cancel: &CancellationSignal) -> Result<bool, BackendError> {
        if cancel.is_cancelled() {
            return Err(BackendError::Cancelled);
        }
        let extension = archive
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "zip" => check_zip(archive, cancel),
            "7z" => check_7z(archive, cancel),
            other => Err(BackendError::Failed(format!(
                "no in-process support for .{other} archives"
            ))),
        }
    }
}

/// Reader adapter that fails with `Interrupted` once the run is cancelled,
/// so a compression stream stops between chunks instead of running to
/// completion.
struct CancelReader<R> {
    inner: R,
    cancel: CancellationSignal,
}

impl<R: Read> CancelReader<R> {
    fn new(inner: R, cancel: CancellationSignal) -> Self {
        CancelReader { inner, cancel }
    }
}

impl<R: Read> Read for CancelReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.cancel.is_cancelled() {
            return Err(io::Error::new(
                io::ErrorKind::Interrupted,
                "compression cancelled",
            ));
        }
        self.inner.read(buf)
    }
}

fn create_zip(input: &Path, output: &Path, cancel: &CancellationSignal) -> Result<(), BackendError> {
    let entry_name = entry_name(input);
    let file = File::create(output).map_err(|e| BackendError::from_failure(e, cancel))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer
        .start_file(entry_name, options)
        .map_err(|e| BackendError::from_failure(e, cancel))?;

    let source = File::open(input).map_err(|e| BackendError::from_failure(e, cancel))?;
    let mut reader = CancelReader::new(BufReader::new(source), cancel.clone());
    io::copy(&mut reader, &mut writer).map_err(|e| BackendError::from_failure(e, cancel))?;

    writer
        .finish()
        .map_err(|e| BackendError::from_failure(e, cancel))?;
    Ok(())
}

fn create_7z(input: &Path, output: &Path, cancel: &CancellationSignal) -> Result<(), BackendError> {
    let entry_name = entry_name(input);
    let mut writer =
        SevenZWriter::create(output).map_err(|e| BackendError::from_failure(e, cancel))?;

    let source = File::open(input).map_err(|e| BackendError::from_failure(e, cancel))?;
    let reader = CancelReader::new(BufReader::new(source), cancel.clone());
    writer
        .push_archive_entry(
            SevenZArchiveEntry::from_path(input, entry_name),
            Some(reader),
        )
        .map_err(|e| BackendError::from_failure(e, cancel))?;

    writer
        .finish()
        .map_err(|e| BackendError::from_failure(e, cancel))?;
    Ok(())
}

fn check_zip(archive: &Path, cancel: &CancellationSignal) -> Result<bool, BackendError> {
    let file = File::open(archive).map_err(|e| BackendError::from_failure(e, cancel))?;
    let mut zip = match ZipArchive::new(BufReader::new(file)) {
        Ok(zip) => zip,
        Err(_) => return Ok(false),
    };

    for index in 0..zip.len() {
        if cancel.is_cancelled() {
            return Err(BackendError::Cancelled);
        }
        let mut entry = match zip.by_index(index) {
            Ok(entry) => entry,
            Err(_) => return Ok(false),
        };
        // Draining the entry validates its CRC as a side effect.
        if io::copy(&mut entry, &mut io::sink()).is_err() {
            return Ok(false);
        }
    }
    Ok(true)
}

fn check_7z(archive: &Path, cancel: &CancellationSignal) -> Result<bool, BackendError> {
    let file = File::open(archive).map_err(|e| BackendError::from_failure(e, cancel))?;
    let len = file
        .metadata()
        .map_err(|e| BackendError::from_failure(e, cancel))?
        .len();
    let mut reader = match SevenZReader::new(BufReader::new(file), len, Password::empty()) {
        Ok(reader) => reader,
        Err(_) => return Ok(false),
    };

    let mut intact = true;
    let mut interrupted = false;
    let result = reader.for_each_entries(|_entry, entry_reader| {
        if cancel.is_cancelled() {
            interrupted = true;
            return Ok(false);
        }
        if io::copy(entry_reader, &mut io::sink()).is_err() {
            intact = false;
            return Ok(false);
        }
        Ok(true)
    });

    if interrupted {
        return Err(BackendError::Cancelled);
    }
    Ok(result.is_ok() && intact)
}

fn entry_name(input: &Path) -> String {
    input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string())
}
