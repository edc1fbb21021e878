//! # Replay-on-subscribe policy.
//!
//! [`ReplayPolicy`] decides whether a new subscription immediately receives the
//! publisher's current state.
//!
//! - [`ReplayPolicy::Immediate`] `subscribe` invokes the callback once with the
//!   current snapshot before returning (default). Late subscribers see where the
//!   iteration is without waiting for the next visible advance.
//! - [`ReplayPolicy::Skip`] the callback only fires on subsequent advances.
//!
//! ```text
//! subscribe(cb)             Immediate           Skip
//!   └─► register            cb(snapshot@now)    ─
//!   advance ──► visible     cb(snapshot)        cb(snapshot)
//! ```

/// Policy controlling replay of current state on `subscribe`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReplayPolicy {
    /// Deliver the current snapshot right away.
    #[default]
    Immediate,
    /// Deliver nothing until the next visible advance.
    Skip,
}
