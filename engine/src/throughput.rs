//! Periodic write-throughput sampling.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;

use crate::progress::ProgressReporter;

/// Default time between samples.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(1000);

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Default)]
struct SamplerState {
    /// Most recently written output artifact, published by workers.
    target: Option<PathBuf>,
    /// Size observed at the previous tick.
    last_bytes: u64,
}

/// Samples the size of the most recently written output file on a fixed
/// timer, independent of task completions, and reports the instantaneous
/// write rate in MB/s.
///
/// Started at batch start; [`ThroughputSampler::stop`] joins the timer
/// thread and emits a final zero. The byte baseline is behind a single
/// mutex shared between the sampler tick and writers publishing a new
/// artifact.
pub struct ThroughputSampler {
    state: Arc<Mutex<SamplerState>>,
    reporter: Arc<dyn ProgressReporter>,
    stop_tx: Option<crossbeam_channel::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ThroughputSampler {
    pub fn start(reporter: Arc<dyn ProgressReporter>) -> Self {
        Self::start_with_interval(reporter, DEFAULT_SAMPLE_INTERVAL)
    }

    pub fn start_with_interval(reporter: Arc<dyn ProgressReporter>, interval: Duration) -> Self {
        let state = Arc::new(Mutex::new(SamplerState::default()));
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);

        let tick_state = Arc::clone(&state);
        let tick_reporter = Arc::clone(&reporter);
        let handle = thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let elapsed = last_tick.elapsed().as_secs_f64();
                        last_tick = Instant::now();
                        if let Some(mbps) = sample(&tick_state, elapsed) {
                            tick_reporter.throughput(mbps);
                        }
                    }
                    // Sender dropped or an explicit stop: either way we're done.
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        ThroughputSampler {
            state,
            reporter,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Publish the artifact the sampler should watch from now on. Resets
    /// the byte baseline so the next tick measures only the new file.
    pub fn track(&self, path: &Path) {
        if let Ok(mut state) = self.state.lock() {
            state.target = Some(path.to_path_buf());
            state.last_bytes = 0;
        }
    }

    /// Stop sampling, join the timer thread, and emit a final zero rate.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(stop_tx) = self.stop_tx.take() else {
            return;
        };
        drop(stop_tx);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.reporter.throughput(0.0);
    }
}

impl Drop for ThroughputSampler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// One measurement: bytes written to the tracked artifact since the last
/// tick, converted to MB/s. `None` when nothing is being tracked yet.
fn sample(state: &Mutex<SamplerState>, elapsed_secs: f64) -> Option<f64> {
    if elapsed_secs <= 0.0 {
        return None;
    }
    let mut state = state.lock().ok()?;
    let target = state.target.as_deref()?;
    let current = fs::metadata(target).map(|m| m.len()).unwrap_or(0);
    let delta = current.saturating_sub(state.last_bytes);
    state.last_bytes = current;
    Some(delta as f64 / elapsed_secs / BYTES_PER_MB)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingReporter {
        rates: StdMutex<Vec<f64>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn report(&self, _current: usize, _total: usize, _file_name: &str, _verb: &str) {}

        fn log(&self, _line: &str) {}

        fn throughput(&self, mbps: f64) {
            self.rates.lock().unwrap().push(mbps);
        }
    }

    #[test]
    fn test_reports_rate_for_growing_file() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let artifact = temp_dir.path().join("out.zip");
        fs::write(&artifact, vec![0u8; 256 * 1024]).expect("write artifact");

        let reporter = Arc::new(RecordingReporter::default());
        let sampler = ThroughputSampler::start_with_interval(
            reporter.clone(),
            Duration::from_millis(20),
        );
        sampler.track(&artifact);
        thread::sleep(Duration::from_millis(120));
        sampler.stop();

        let rates = reporter.rates.lock().unwrap();
        assert!(
            rates.iter().any(|r| *r > 0.0),
            "expected at least one positive sample, got {rates:?}"
        );
    }

    #[test]
    fn test_stop_emits_final_zero() {
        let reporter = Arc::new(RecordingReporter::default());
        let sampler = ThroughputSampler::start_with_interval(
            reporter.clone(),
            Duration::from_millis(20),
        );
        thread::sleep(Duration::from_millis(60));
        sampler.stop();

        let rates = reporter.rates.lock().unwrap();
        assert_eq!(rates.last().copied(), Some(0.0));
    }

    #[test]
    fn test_silent_until_first_track() {
        let reporter = Arc::new(RecordingReporter::default());
        let sampler = ThroughputSampler::start_with_interval(
            reporter.clone(),
            Duration::from_millis(10),
        );
        thread::sleep(Duration::from_millis(50));
        sampler.stop();

        let rates = reporter.rates.lock().unwrap();
        // only the final zero
        assert_eq!(rates.as_slice(), &[0.0]);
    }
}
