//! Named wall-clock timers collected into an explicit context.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Accumulated time for one label.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TimingEntry {
    pub total: Duration,
    pub count: u32,
}

impl TimingEntry {
    /// Average duration per recording.
    pub fn mean(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            self.total / self.count
        }
    }
}

/// A collection of named timing entries.
///
/// Owned by whoever drives the work; nothing here is global.
#[derive(Debug, Default, Clone)]
pub struct Timings {
    entries: BTreeMap<String, TimingEntry>,
}

impl Timings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a stopwatch; call [`Stopwatch::stop`] to record it.
    pub fn start(label: impl Into<String>) -> Stopwatch {
        Stopwatch {
            label: label.into(),
            start: Instant::now(),
        }
    }

    /// Add one recording of `elapsed` under `label`.
    pub fn record(&mut self, label: &str, elapsed: Duration) {
        let entry = self.entries.entry(label.to_string()).or_default();
        entry.total += elapsed;
        entry.count += 1;
    }

    /// Time a closure and record it under `label`.
    pub fn measure<T>(&mut self, label: &str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        self.record(label, start.elapsed());
        result
    }

    pub fn get(&self, label: &str) -> Option<TimingEntry> {
        self.entries.get(label).copied()
    }

    /// Fold another context's entries into this one.
    pub fn merge(&mut self, other: &Timings) {
        for (label, theirs) in &other.entries {
            let entry = self.entries.entry(label.clone()).or_default();
            entry.total += theirs.total;
            entry.count += theirs.count;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TimingEntry)> {
        self.entries.iter().map(|(label, entry)| (label.as_str(), entry))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Log every entry as `label: total | count | mean`.
    pub fn report(&self) {
        log::info!("Timing data:");
        for (label, entry) in &self.entries {
            log::info!(
                "{}: {:.3}s | {} | {:.3}s",
                label,
                entry.total.as_secs_f64(),
                entry.count,
                entry.mean().as_secs_f64()
            );
        }
    }
}

/// A running timer created by [`Timings::start`].
#[derive(Debug)]
pub struct Stopwatch {
    label: String,
    start: Instant,
}

impl Stopwatch {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Stop and record into `timings`, returning the elapsed time.
    pub fn stop(self, timings: &mut Timings) -> Duration {
        let elapsed = self.start.elapsed();
        timings.record(&self.label, elapsed);
        elapsed
    }
}
