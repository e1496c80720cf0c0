//! Lightweight wall-clock timing utilities.
//!
//! Used by the reporting layer to measure per-run duration and to
//! accumulate totals across repeated runs.

use std::time::Instant;

/// A simple timer that measures elapsed time.
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    /// Create and start a new timer with the given label.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    /// Elapsed time so far in seconds, without stopping.
    pub fn elapsed_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Stop the timer and return elapsed time in seconds.
    pub fn stop(self) -> f64 {
        self.elapsed_s()
    }

    /// Stop the timer, log the result at debug level and return it.
    pub fn stop_and_log(self) -> f64 {
        let label = self.label;
        let elapsed = self.stop();
        tracing::debug!(label, elapsed_s = elapsed, "timer stopped");
        elapsed
    }
}

/// Durations collected across repeated runs, in seconds.
#[derive(Clone, Debug, Default)]
pub struct TimingSamples {
    samples: Vec<f64>,
}

impl TimingSamples {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            samples: Vec::with_capacity(n),
        }
    }

    /// Record one duration. Negative durations are stored as zero.
    pub fn record(&mut self, duration_s: f64) {
        self.samples.push(duration_s.max(0.0));
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn total_seconds(&self) -> f64 {
        self.samples.iter().sum()
    }

    /// Mean duration, or 0 with no samples.
    pub fn mean_seconds(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.total_seconds() / self.samples.len() as f64
        }
    }

    /// Upper median (element `n / 2` of the sorted samples).
    pub fn median_seconds(&self) -> Option<f64> {
        let sorted = self.sorted();
        sorted.get(sorted.len() / 2).copied()
    }

    pub fn min_seconds(&self) -> Option<f64> {
        self.samples.iter().copied().reduce(f64::min)
    }

    pub fn max_seconds(&self) -> Option<f64> {
        self.samples.iter().copied().reduce(f64::max)
    }

    fn sorted(&self) -> Vec<f64> {
        let mut sorted = self.samples.clone();
        sorted.sort_by(f64::total_cmp);
        sorted
    }
}
