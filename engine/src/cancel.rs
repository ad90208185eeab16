//! Cooperative cancellation signal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A single owned cancellation source per run, shared by reference with
/// every worker and the throughput sampler.
///
/// The signal is read-only after creation except for the one `trigger`
/// operation. A new instance is created at the start of each run; a
/// triggered signal is never reused.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    flag: Arc<AtomicBool>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_untriggered() {
        let signal = CancellationSignal::new();
        assert!(!signal.is_cancelled());
    }

    #[test]
    fn test_trigger_visible_through_clones() {
        let signal = CancellationSignal::new();
        let shared = signal.clone();
        signal.trigger();
        assert!(shared.is_cancelled());
        // triggering twice is harmless
        shared.trigger();
        assert!(signal.is_cancelled());
    }
}
