//! # Handler lifecycle events.
//!
//! The [`EventKind`] enum classifies what happened to a listener queue:
//! added, removed, evicted (overflow), or closed (owner dropped it).
//!
//! The [`Event`] struct carries metadata such as timestamps, the listener id
//! and the number of messages left in an evicted queue.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use progresscast::{Event, EventKind, ListenerId};
//!
//! let id = ListenerId::new();
//! let ev = Event::listener_evicted(id, 25);
//!
//! assert_eq!(ev.kind, EventKind::ListenerEvicted);
//! assert_eq!(ev.listener, Some(id));
//! assert_eq!(ev.pending, Some(25));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::progress::ListenerId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of handler events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A listener queue was registered by `listen()`.
    ///
    /// Sets:
    /// - `listener`: listener id
    /// - `at`, `seq`
    ListenerAdded,

    /// A listener was removed by an explicit `unsubscribe`.
    ///
    /// Sets:
    /// - `listener`: listener id
    /// - `pending`: messages still buffered for the owner
    /// - `at`, `seq`
    ListenerRemoved,

    /// A listener's queue was full during `announce`; it was dropped for good.
    ///
    /// Sets:
    /// - `listener`: listener id
    /// - `pending`: messages still buffered for the owner (= capacity)
    /// - `reason`: `"full"`
    /// - `at`, `seq`
    ListenerEvicted,

    /// The owner dropped its queue; the handler reaped the registration.
    ///
    /// Sets:
    /// - `listener`: listener id
    /// - `reason`: `"closed"`
    /// - `at`, `seq`
    ListenerClosed,
}

/// Handler event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Listener concerned, if applicable.
    pub listener: Option<ListenerId>,
    /// Human-readable reason (`"full"`, `"closed"`).
    pub reason: Option<Arc<str>>,
    /// Messages still buffered in the listener queue.
    pub pending: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            listener: None,
            reason: None,
            pending: None,
        }
    }

    /// Attaches a listener id.
    #[inline]
    pub fn with_listener(mut self, id: ListenerId) -> Self {
        self.listener = Some(id);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the number of buffered messages.
    #[inline]
    pub fn with_pending(mut self, pending: usize) -> Self {
        self.pending = Some(pending);
        self
    }

    /// Creates a listener eviction event.
    #[inline]
    pub fn listener_evicted(id: ListenerId, pending: usize) -> Self {
        Event::new(EventKind::ListenerEvicted)
            .with_listener(id)
            .with_pending(pending)
            .with_reason("full")
    }

    #[inline]
    pub fn is_eviction(&self) -> bool {
        matches!(self.kind, EventKind::ListenerEvicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::ListenerAdded);
        let b = Event::new(EventKind::ListenerRemoved);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn eviction_event_carries_listener_and_backlog() {
        let id = ListenerId::new();
        let ev = Event::listener_evicted(id, 3);
        assert!(ev.is_eviction());
        assert_eq!(ev.listener, Some(id));
        assert_eq!(ev.pending, Some(3));
        assert_eq!(ev.reason.as_deref(), Some("full"));

        assert!(!Event::new(EventKind::ListenerClosed).is_eviction());
    }
}
