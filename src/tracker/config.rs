//! # Tracker configuration.
//!
//! [`TrackerConfig`] bundles the settings of the counting primitive and the
//! publishing options layered on top of it. Build it with
//! [`TrackerConfig::builder`], or start from [`TrackerConfig::default`].
//! Either way the configuration is validated again by every constructor
//! that consumes it.
//!
//! ## Sentinel values
//! - `total = None` → unknown; publishers over exact-size iterators infer it
//! - `min_interval = 0s` → every advance is visible
//! - `smoothing = 0.0` → rate is the plain average since start

use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::policies::{CallbackPolicy, ReplayPolicy};

/// Settings for a tracker and the publisher wrapping it.
///
/// ## Field semantics
/// - `total`: expected iteration count (`None` = unknown)
/// - `initial`: starting count
/// - `desc` / `unit`: labels copied into every snapshot
/// - `min_interval`: minimum wall time between two visible updates
/// - `smoothing`: exponential moving average factor for `rate`, in `[0, 1]`
/// - `always_notify`: notify subscribers on every advance, ignoring throttling
/// - `replay`: whether `subscribe` immediately delivers the current state
/// - `callback_policy`: what a panicking callback does to the others
/// - `extra`: additional fields copied into every snapshot
#[derive(Clone, Debug)]
pub struct TrackerConfig {
    pub total: Option<u64>,
    pub initial: u64,
    pub desc: Option<String>,
    pub unit: String,
    pub min_interval: Duration,
    pub smoothing: f64,
    pub always_notify: bool,
    pub replay: ReplayPolicy,
    pub callback_policy: CallbackPolicy,
    pub extra: Map<String, Value>,
}

impl TrackerConfig {
    /// Checks values that the field types alone cannot rule out.
    ///
    /// Every tracker and publisher constructor calls this, so a struct literal
    /// gets the same checks as [`TrackerConfig::builder`].
    ///
    /// # Errors
    /// [`ConfigError::InvalidSmoothing`] if `smoothing` is not finite or outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.smoothing.is_finite() || !(0.0..=1.0).contains(&self.smoothing) {
            return Err(ConfigError::InvalidSmoothing {
                smoothing: self.smoothing,
            });
        }
        Ok(())
    }
}

impl Default for TrackerConfig {
    /// Default configuration:
    ///
    /// - `total = None`, `initial = 0`
    /// - `unit = "it"`
    /// - `min_interval = 100ms`
    /// - `smoothing = 0.3`
    /// - `always_notify = false`
    /// - `replay = ReplayPolicy::Immediate`
    /// - `callback_policy = CallbackPolicy::Isolate`
    fn default() -> Self {
        Self {
            total: None,
            initial: 0,
            desc: None,
            unit: "it".to_string(),
            min_interval: Duration::from_millis(100),
            smoothing: 0.3,
            always_notify: false,
            replay: ReplayPolicy::default(),
            callback_policy: CallbackPolicy::default(),
            extra: Map::new(),
        }
    }
}
