//! # Default counting primitive.
//!
//! [`ProgressTracker`] counts iterations, measures elapsed time and a smoothed
//! rate, and throttles visibility with a minimum interval between visible
//! updates (like terminal progress bars do to avoid flooding).
//!
//! ## Visibility
//! ```text
//! advance(n) ──► count += n
//!     │
//!     ├─ now - last_visible >= min_interval ──► visible  (rate updated)
//!     └─ otherwise                          ──► throttled (pending)
//!
//! flush() ──► pending? ──► visible
//! ```
//!
//! ## Rate
//! With `smoothing = 0` the rate is the plain average since start. Otherwise
//! each visible update folds the instantaneous rate into an exponential moving
//! average: `rate = s × instant + (1 − s) × rate`.

use std::time::{Duration, Instant};

use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::progress::ProgressSnapshot;
use crate::tracker::{Track, TrackerConfig};

/// Counter with timing and display throttling.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    count: u64,
    initial: u64,
    total: Option<u64>,
    desc: Option<String>,
    unit: String,
    extra: Map<String, Value>,

    min_interval: Duration,
    smoothing: f64,

    started_at: Instant,
    last_visible_at: Instant,
    last_visible_count: u64,
    rate: Option<f64>,
}

impl ProgressTracker {
    /// Creates a tracker from configuration.
    ///
    /// # Errors
    /// Whatever [`TrackerConfig::validate`] rejects.
    pub fn new(cfg: &TrackerConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self::from_validated(cfg))
    }

    fn from_validated(cfg: &TrackerConfig) -> Self {
        let now = Instant::now();
        Self {
            count: cfg.initial,
            initial: cfg.initial,
            total: cfg.total,
            desc: cfg.desc.clone(),
            unit: cfg.unit.clone(),
            extra: cfg.extra.clone(),
            min_interval: cfg.min_interval,
            smoothing: cfg.smoothing,
            started_at: now,
            last_visible_at: now,
            last_visible_count: cfg.initial,
            rate: None,
        }
    }

    /// Time since the tracker was created.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Current smoothed rate (iterations per second).
    pub fn rate(&self) -> Option<f64> {
        self.rate
    }

    fn mark_visible(&mut self, now: Instant) {
        let dn = self.count.saturating_sub(self.last_visible_count) as f64;
        let dt = now.duration_since(self.last_visible_at).as_secs_f64();

        if self.smoothing == 0.0 {
            let elapsed = now.duration_since(self.started_at).as_secs_f64();
            if elapsed > 0.0 {
                self.rate = Some(self.count.saturating_sub(self.initial) as f64 / elapsed);
            }
        } else if dt > 0.0 {
            let instant = dn / dt;
            self.rate = Some(match self.rate {
                None => instant,
                Some(prev) => self.smoothing * instant + (1.0 - self.smoothing) * prev,
            });
        }

        self.last_visible_at = now;
        self.last_visible_count = self.count;
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::from_validated(&TrackerConfig::default())
    }
}

impl Track for ProgressTracker {
    fn advance(&mut self, n: u64) -> bool {
        self.count = self.count.saturating_add(n);

        let now = Instant::now();
        if now.duration_since(self.last_visible_at) >= self.min_interval {
            self.mark_visible(now);
            true
        } else {
            false
        }
    }

    fn flush(&mut self) -> bool {
        if self.count == self.last_visible_count {
            return false;
        }
        self.mark_visible(Instant::now());
        true
    }

    fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            count: self.count,
            total: self.total,
            elapsed: self.started_at.elapsed().as_secs_f64(),
            rate: self.rate,
            desc: self.desc.clone(),
            unit: self.unit.clone(),
            extra: self.extra.clone(),
        }
    }

    fn count(&self) -> u64 {
        self.count
    }

    fn total(&self) -> Option<u64> {
        self.total
    }

    fn set_total(&mut self, total: Option<u64>) {
        self.total = total;
    }
}
