//! # Handler configuration.
//!
//! Provides [`HandlerConfig`], the settings of one [`Handler`](crate::Handler)
//! fan-out instance.
//!
//! ## Sentinel values
//! - `queue_capacity = 0` → rejected by [`HandlerConfig::validate`] (a listener
//!   that can hold nothing would be evicted by its first announce)
//! - `queue_capacity > MAX_QUEUE_CAPACITY` → rejected; the channel cannot be allocated
//! - `bus_capacity = 0` → clamped to 1 by the event bus

use tokio::sync::Semaphore;

use crate::error::ConfigError;

/// Largest listener bound a tokio channel accepts.
pub const MAX_QUEUE_CAPACITY: usize = Semaphore::MAX_PERMITS;

/// Configuration for a [`Handler`](crate::Handler).
///
/// ## Field semantics
/// - `queue_capacity`: bound of every listener queue created by `listen()`
/// - `bus_capacity`: lifecycle event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Maximum number of undrained updates per listener.
    ///
    /// When an announce finds a listener queue at this bound, the listener is
    /// evicted permanently. The owner keeps whatever is already buffered.
    pub queue_capacity: usize,

    /// Capacity of the lifecycle event broadcast channel.
    ///
    /// Receivers lagging more than `bus_capacity` events get `Lagged` and skip
    /// older items.
    pub bus_capacity: usize,
}

impl HandlerConfig {
    /// Checks the configuration.
    ///
    /// # Errors
    /// - [`ConfigError::ZeroQueueCapacity`] if `queue_capacity == 0`
    /// - [`ConfigError::QueueCapacityTooLarge`] if `queue_capacity > MAX_QUEUE_CAPACITY`
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.queue_capacity {
            0 => Err(ConfigError::ZeroQueueCapacity),
            capacity if capacity > MAX_QUEUE_CAPACITY => Err(ConfigError::QueueCapacityTooLarge {
                capacity,
                max: MAX_QUEUE_CAPACITY,
            }),
            _ => Ok(()),
        }
    }

    /// Sets the listener queue bound.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Sets the event bus capacity.
    #[must_use]
    pub fn with_bus_capacity(mut self, capacity: usize) -> Self {
        self.bus_capacity = capacity;
        self
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for HandlerConfig {
    /// Default configuration:
    ///
    /// - `queue_capacity = 25`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            queue_capacity: 25,
            bus_capacity: 1024,
        }
    }
}
