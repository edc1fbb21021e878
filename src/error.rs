//! Error types used by progresscast.
//!
//! Only configuration can fail. Everything else in the crate reports through
//! return values (`unsubscribe -> bool`) or observable counters (evictions,
//! callback panics), never through errors:
//!
//! - [`ConfigError`] malformed tracker or handler configuration, rejected at
//!   construction and never silently coerced.
//!
//! The type provides `as_label` / `as_message` helpers for logs and metrics.

use std::any::Any;

use thiserror::Error;

/// # Errors produced while validating configuration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A negative total was supplied.
    #[error("total must be non-negative, got {total}")]
    NegativeTotal {
        /// The rejected value.
        total: i64,
    },

    /// A negative initial count was supplied.
    #[error("initial count must be non-negative, got {initial}")]
    NegativeInitial {
        /// The rejected value.
        initial: i64,
    },

    /// Rate smoothing factor outside `[0, 1]` or not finite.
    #[error("smoothing must be a finite value in [0, 1], got {smoothing}")]
    InvalidSmoothing {
        /// The rejected value.
        smoothing: f64,
    },

    /// Listener queues need room for at least one message.
    #[error("listener queue capacity must be at least 1")]
    ZeroQueueCapacity,

    /// Listener queue bound above what the channel can allocate.
    #[error("listener queue capacity {capacity} exceeds the maximum of {max}")]
    QueueCapacityTooLarge {
        /// The rejected value.
        capacity: usize,
        /// Largest accepted value.
        max: usize,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use progresscast::ConfigError;
    ///
    /// let err = ConfigError::NegativeTotal { total: -1 };
    /// assert_eq!(err.as_label(), "config_negative_total");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::NegativeTotal { .. } => "config_negative_total",
            ConfigError::NegativeInitial { .. } => "config_negative_initial",
            ConfigError::InvalidSmoothing { .. } => "config_invalid_smoothing",
            ConfigError::ZeroQueueCapacity => "config_zero_queue_capacity",
            ConfigError::QueueCapacityTooLarge { .. } => "config_queue_capacity_too_large",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ConfigError::NegativeTotal { total } => format!("total={total}"),
            ConfigError::NegativeInitial { initial } => format!("initial={initial}"),
            ConfigError::InvalidSmoothing { smoothing } => format!("smoothing={smoothing}"),
            ConfigError::ZeroQueueCapacity => "queue_capacity=0".to_string(),
            ConfigError::QueueCapacityTooLarge { capacity, max } => {
                format!("queue_capacity={capacity} max={max}")
            }
        }
    }
}

/// Extracts a printable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
