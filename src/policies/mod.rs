//! Publishing policies.
//!
//! This module groups the knobs that control **how** a publisher delivers
//! snapshots to its callbacks.
//!
//! ## Contents
//! - [`CallbackPolicy`] what a panicking callback does to the others
//! - [`ReplayPolicy`]   whether `subscribe` replays the current state
//!
//! ## Quick wiring
//! ```text
//! TrackerConfig { callback_policy, replay, .. }
//!      └─► Publisher uses:
//!           - replay on subscribe()
//!           - callback_policy on every notification
//! ```
//!
//! ## Defaults
//! - `CallbackPolicy::Isolate`
//! - `ReplayPolicy::Immediate`

mod callback;
mod replay;

pub use callback::CallbackPolicy;
pub use replay::ReplayPolicy;
