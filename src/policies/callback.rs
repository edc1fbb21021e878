//! # Callback failure policy.
//!
//! [`CallbackPolicy`] decides what happens when a subscriber callback panics
//! while a publisher is notifying its subscribers.
//!
//! - [`CallbackPolicy::Isolate`] the panic is caught, counted and logged; the
//!   remaining callbacks for that step still run (default).
//! - [`CallbackPolicy::Propagate`] the panic unwinds out of the advance,
//!   aborting the remaining callbacks for that step.
//!
//! ## Choosing the right policy
//! ```text
//! long-lived services, many independent consumers  → Isolate
//! tests / fail-fast tooling                        → Propagate
//! ```
//!
//! **Warning**: `Isolate` runs callbacks under `AssertUnwindSafe`. A callback
//! that panics while holding a lock on shared state can leave that state
//! inconsistent (and poisoned).

/// Policy controlling how a panicking callback affects its siblings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CallbackPolicy {
    /// Catch the panic, count it, continue with the next callback.
    #[default]
    Isolate,
    /// Let the panic unwind through the advancing call.
    Propagate,
}
