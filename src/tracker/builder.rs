use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::policies::{CallbackPolicy, ReplayPolicy};
use crate::tracker::TrackerConfig;

/// Builder for [`TrackerConfig`] with fluent API.
///
/// Numeric inputs are accepted as signed values so that configuration coming
/// from loosely typed sources is validated here instead of wrapping around.
#[derive(Clone, Debug)]
pub struct TrackerConfigBuilder {
    total: Option<i64>,
    initial: i64,
    desc: Option<String>,
    unit: String,
    min_interval: Duration,
    smoothing: f64,
    always_notify: bool,
    replay: ReplayPolicy,
    callback_policy: CallbackPolicy,
    extra: Map<String, Value>,
}

impl TrackerConfigBuilder {
    /// Creates a builder seeded with [`TrackerConfig::default`] values.
    pub fn new() -> Self {
        let defaults = TrackerConfig::default();
        Self {
            total: None,
            initial: 0,
            desc: defaults.desc,
            unit: defaults.unit,
            min_interval: defaults.min_interval,
            smoothing: defaults.smoothing,
            always_notify: defaults.always_notify,
            replay: defaults.replay,
            callback_policy: defaults.callback_policy,
            extra: defaults.extra,
        }
    }

    pub fn total(mut self, total: i64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn initial(mut self, initial: i64) -> Self {
        self.initial = initial;
        self
    }

    pub fn desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    pub fn smoothing(mut self, smoothing: f64) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn always_notify(mut self, always_notify: bool) -> Self {
        self.always_notify = always_notify;
        self
    }

    pub fn replay(mut self, replay: ReplayPolicy) -> Self {
        self.replay = replay;
        self
    }

    pub fn callback_policy(mut self, policy: CallbackPolicy) -> Self {
        self.callback_policy = policy;
        self
    }

    /// Adds a field copied verbatim into every snapshot.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    /// - [`ConfigError::NegativeTotal`] if `total < 0`
    /// - [`ConfigError::NegativeInitial`] if `initial < 0`
    /// - [`ConfigError::InvalidSmoothing`] if `smoothing` is not finite or outside `[0, 1]`
    pub fn build(self) -> Result<TrackerConfig, ConfigError> {
        let total = match self.total {
            Some(total) if total < 0 => return Err(ConfigError::NegativeTotal { total }),
            Some(total) => Some(total as u64),
            None => None,
        };
        if self.initial < 0 {
            return Err(ConfigError::NegativeInitial {
                initial: self.initial,
            });
        }

        let cfg = TrackerConfig {
            total,
            initial: self.initial as u64,
            desc: self.desc,
            unit: self.unit,
            min_interval: self.min_interval,
            smoothing: self.smoothing,
            always_notify: self.always_notify,
            replay: self.replay,
            callback_policy: self.callback_policy,
            extra: self.extra,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

impl Default for TrackerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerConfig {
    /// Creates a builder for constructing a validated `TrackerConfig`.
    pub fn builder() -> TrackerConfigBuilder {
        TrackerConfigBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        let cfg = TrackerConfig::builder().build().unwrap();
        assert_eq!(cfg.total, None);
        assert_eq!(cfg.unit, "it");
        assert_eq!(cfg.replay, ReplayPolicy::Immediate);
        assert_eq!(cfg.callback_policy, CallbackPolicy::Isolate);
    }

    #[test]
    fn rejects_negative_total() {
        let err = TrackerConfig::builder().total(-3).build().unwrap_err();
        assert_eq!(err, ConfigError::NegativeTotal { total: -3 });
        assert_eq!(err.as_label(), "config_negative_total");
    }

    #[test]
    fn rejects_negative_initial() {
        let err = TrackerConfig::builder().initial(-1).build().unwrap_err();
        assert_eq!(err.as_label(), "config_negative_initial");
    }

    #[test]
    fn rejects_out_of_range_smoothing() {
        for smoothing in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            let err = TrackerConfig::builder()
                .smoothing(smoothing)
                .build()
                .unwrap_err();
            assert_eq!(err.as_label(), "config_invalid_smoothing");
        }
    }

    #[test]
    fn accepts_zero_total_and_boundaries() {
        let cfg = TrackerConfig::builder()
            .total(0)
            .smoothing(1.0)
            .desc("jobs")
            .extra("position", 2)
            .build()
            .unwrap();
        assert_eq!(cfg.total, Some(0));
        assert_eq!(cfg.desc.as_deref(), Some("jobs"));
        assert_eq!(cfg.extra.get("position"), Some(&Value::from(2)));
    }
}
