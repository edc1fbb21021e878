//! # Iteration tracking.
//!
//! This module provides the counting primitive wrapped by publishers:
//! - [`Track`] capability trait (count, total, advance)
//! - [`ProgressTracker`] default implementation with throttling and rate
//! - [`TrackerConfig`] / [`TrackerConfigBuilder`] validated configuration

mod builder;
mod config;
mod counter;
mod track;

pub use builder::TrackerConfigBuilder;
pub use config::TrackerConfig;
pub use counter::ProgressTracker;
pub use track::Track;
