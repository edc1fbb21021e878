//! Progress data model shared by publishers and the handler.
//!
//! ## Contents
//! - [`ProgressSnapshot`] state produced by one advance
//! - [`TaggedUpdate`] snapshot + progress bar identity + metadata
//! - [`ProgressBarId`], [`SubscriptionId`], [`ListenerId`] UUID-backed identities

mod ids;
mod snapshot;
mod update;

pub use ids::{ListenerId, ProgressBarId, SubscriptionId};
pub use snapshot::ProgressSnapshot;
pub use update::{REQUEST_ID_KEY, TaggedUpdate};
