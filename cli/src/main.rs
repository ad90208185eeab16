//! ArcBatch - Command-line interface for the batch archive engine.
//!
//! Provides argument parsing, progress reporting to stderr, and an optional
//! machine-readable JSON summary on stdout.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use engine::{
    BatchSummary, CancellationSignal, CompressionJob, FolderPicker, JobConfig, LibraryBackend,
    OutputFormat, ProgressReporter, ReportSink, SevenZipCommandBackend, VerificationJob,
};

/// ArcBatch - batch-compress files and verify archives
#[derive(Parser, Debug)]
#[command(name = "arcbatch")]
#[command(version)]
#[command(about = "Compress every file in a folder, or verify archives under a tree")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Print per-file progress lines
    #[arg(long, global = true)]
    verbose: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress every file directly under the source folder
    Compress {
        /// Source folder (prompted for when omitted)
        #[arg(long, value_name = "PATH")]
        src: Option<PathBuf>,

        /// Folder receiving the archives (prompted for when omitted)
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,

        /// Archive format: 7z or zip
        #[arg(long, value_name = "FORMAT", default_value = "7z")]
        format: String,

        /// Delete each source file after successful compression
        #[arg(long)]
        delete_originals: bool,

        /// Number of concurrent workers
        #[arg(long, value_name = "N", default_value_t = 1)]
        jobs: usize,

        /// Archive backend: library or 7z
        #[arg(long, value_name = "BACKEND", default_value = "library")]
        backend: String,
    },

    /// Verify integrity of every archive under the source folder
    Verify {
        /// Folder to scan (prompted for when omitted)
        #[arg(long, value_name = "PATH")]
        src: Option<PathBuf>,

        /// Also scan subfolders (and mirror them when relocating)
        #[arg(long)]
        recursive: bool,

        /// Move archives that pass the check here
        #[arg(long, value_name = "PATH")]
        move_valid: Option<PathBuf>,

        /// Move archives that fail the check here
        #[arg(long, value_name = "PATH")]
        move_corrupt: Option<PathBuf>,

        /// Archive backend: library or 7z
        #[arg(long, value_name = "BACKEND", default_value = "library")]
        backend: String,
    },
}

/// CLI implementation of ProgressReporter, writing to stderr.
struct CliProgress {
    verbose: bool,
}

impl CliProgress {
    fn new(verbose: bool) -> Self {
        CliProgress { verbose }
    }

    fn timestamp() -> String {
        chrono::Local::now().format("%H:%M:%S").to_string()
    }
}

impl ProgressReporter for CliProgress {
    fn report(&self, current: usize, total: usize, file_name: &str, verb: &str) {
        if self.verbose {
            eprintln!("[{:>4}/{:<4}] {verb}: {file_name}", current, total);
        } else {
            eprint!("\r[{current}/{total}] {verb}: {file_name}        ");
            let _ = std::io::stderr().flush();
        }
    }

    fn log(&self, line: &str) {
        eprintln!("{} {line}", Self::timestamp());
    }

    fn throughput(&self, mbps: f64) {
        if self.verbose && mbps > 0.0 {
            eprintln!("  writing at {mbps:.2} MB/s");
        }
    }
}

/// Crash reports end up in the log; there is no remote reporting endpoint
/// in the CLI build.
struct LogReportSink;

impl ReportSink for LogReportSink {
    fn submit(&self, report: &str) {
        tracing::error!(target: "arcbatch::report", "{report}");
    }
}

/// Folder picker that prompts on stderr and reads a line from stdin. Used
/// only when a path argument was omitted, before the run starts.
struct PromptPicker;

impl FolderPicker for PromptPicker {
    fn pick(&self, purpose: &str) -> Option<PathBuf> {
        eprint!("Select {purpose} folder: ");
        let _ = std::io::stderr().flush();
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line).ok()?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let exit_code = match run_cli(&args) {
        Ok(summary) => {
            if args.json {
                match serde_json::to_string_pretty(&summary) {
                    Ok(json) => println!("{json}"),
                    Err(e) => eprintln!("Could not serialize summary: {e}"),
                }
            } else {
                print_summary(&summary);
            }
            if summary.failed > 0 {
                1
            } else {
                0
            }
        }
        Err(msg) => {
            eprintln!("Error: {msg}");
            2
        }
    };

    std::process::exit(exit_code);
}

/// Main CLI logic - separated from process exit handling
fn run_cli(args: &Args) -> Result<BatchSummary, String> {
    let picker = PromptPicker;
    let reporter = Arc::new(CliProgress::new(args.verbose));
    let report_sink = Arc::new(LogReportSink);
    let cancel = CancellationSignal::new();

    match &args.command {
        Command::Compress {
            src,
            out,
            format,
            delete_originals,
            jobs,
            backend,
        } => {
            let src = resolve_path(src, "source", &picker)?;
            let out = resolve_path(out, "output", &picker)?;
            let format = parse_format(format)?;
            let backend = parse_backend(backend)?;

            let mut config = JobConfig::compress(src, out, format);
            config.delete_originals = *delete_originals;
            config.max_concurrency = (*jobs).max(1);

            let job = CompressionJob::new(config, backend, reporter, report_sink, cancel)
                .map_err(|e| e.to_string())?;
            let summary = job.run().map_err(|e| e.to_string())?;
            if !args.verbose {
                eprintln!();
            }
            Ok(summary)
        }
        Command::Verify {
            src,
            recursive,
            move_valid,
            move_corrupt,
            backend,
        } => {
            let src = resolve_path(src, "source", &picker)?;
            let backend = parse_backend(backend)?;

            let mut config = JobConfig::verify(src);
            config.include_subfolders = *recursive;
            config.move_on_success = move_valid.clone();
            config.move_on_failure = move_corrupt.clone();

            let job = VerificationJob::new(config, backend, reporter, report_sink, cancel)
                .map_err(|e| e.to_string())?;
            let summary = job.run().map_err(|e| e.to_string())?;
            if !args.verbose {
                eprintln!();
            }
            Ok(summary)
        }
    }
}

fn resolve_path(
    arg: &Option<PathBuf>,
    purpose: &str,
    picker: &dyn FolderPicker,
) -> Result<PathBuf, String> {
    match arg {
        Some(path) => Ok(path.clone()),
        None => picker
            .pick(purpose)
            .ok_or_else(|| format!("no {purpose} folder selected")),
    }
}

fn parse_format(raw: &str) -> Result<OutputFormat, String> {
    match raw.to_lowercase().as_str() {
        "7z" => Ok(OutputFormat::SevenZ),
        "zip" => Ok(OutputFormat::Zip),
        other => Err(format!("Invalid format '{other}'. Must be '7z' or 'zip'")),
    }
}

fn parse_backend(raw: &str) -> Result<Arc<dyn engine::ArchiveBackend>, String> {
    match raw.to_lowercase().as_str() {
        "library" => Ok(Arc::new(LibraryBackend::new())),
        "7z" => Ok(Arc::new(SevenZipCommandBackend::default())),
        other => Err(format!(
            "Invalid backend '{other}'. Must be 'library' or '7z'"
        )),
    }
}

fn print_summary(summary: &BatchSummary) {
    eprintln!();
    if summary.cancelled {
        eprintln!("Run cancelled.");
    } else {
        eprintln!("Run complete!");
    }
    eprintln!(
        "Summary: {} total, {} succeeded, {} failed, {} skipped",
        summary.total, summary.succeeded, summary.failed, summary.skipped
    );
    eprintln!("Elapsed: {}", format_duration(summary.elapsed));
}

fn format_duration(elapsed: std::time::Duration) -> String {
    let secs = elapsed.as_secs();
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}
