//! # Tracking capability
//!
//! [`Track`] is the minimal contract a [`Publisher`](crate::Publisher) needs from
//! the primitive that does the actual counting and timing: it has a count, it
//! has a total, and it can advance. The publisher never reaches into the
//! tracker's internals, it only intercepts `advance`.
//!
//! ## Contract
//! - `advance` returns `true` when the change is **visible**, i.e. it passed the
//!   tracker's own throttling. Publishers notify subscribers only then.
//! - `flush` makes any throttled progress visible and reports whether there was
//!   any. It is called once when iteration ends so the final state is observed.
//! - `snapshot` must reflect every advance made so far (never stale).

use crate::progress::ProgressSnapshot;

/// Counting/timing primitive wrapped by a publisher.
pub trait Track: Send {
    /// Advances by `n` steps; returns `true` if the change is visible.
    fn advance(&mut self, n: u64) -> bool;

    /// Makes pending (throttled) progress visible.
    ///
    /// Returns `true` if there was progress not yet visible.
    fn flush(&mut self) -> bool;

    /// Full current state.
    fn snapshot(&self) -> ProgressSnapshot;

    /// Iterations completed so far.
    fn count(&self) -> u64;

    /// Expected number of iterations, if known.
    fn total(&self) -> Option<u64>;

    /// Replaces the expected number of iterations.
    fn set_total(&mut self, total: Option<u64>);
}
