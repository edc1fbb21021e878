//! # Listener queues.
//!
//! A [`ListenerQueue`] is the receiving half of one bounded fan-out queue
//! created by [`Handler::listen`](crate::Handler::listen). The handler keeps
//! the sending half; the caller owns and drains this half.
//!
//! ## State machine
//! ```text
//!             announce: queue full
//!   Active ─────────────────────────► Evicted   (terminal)
//!     │
//!     │  unsubscribe / queue dropped
//!     └─────────────────────────────► Removed   (terminal)
//! ```
//!
//! ## Rules
//! - Buffered updates stay readable after the queue leaves `Active`.
//! - Once the buffer is empty in a terminal state, `recv` returns `None`.
//! - Dropping the queue is enough to leave the fan-out; the handler reaps it on
//!   the next announce.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::progress::{ListenerId, TaggedUpdate};

/// Lifecycle state of a listener queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// Registered and receiving announcements.
    Active,
    /// Dropped by the handler because the queue was full.
    Evicted,
    /// Removed by `unsubscribe` or reaped after the owner dropped it.
    Removed,
}

impl ListenerState {
    /// Returns a stable snake_case label.
    pub fn as_label(&self) -> &'static str {
        match self {
            ListenerState::Active => "active",
            ListenerState::Evicted => "evicted",
            ListenerState::Removed => "removed",
        }
    }
}

const ACTIVE: u8 = 0;
const EVICTED: u8 = 1;
const REMOVED: u8 = 2;

/// State shared between the handler's slot and the caller's queue.
#[derive(Debug, Default)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn load(&self) -> ListenerState {
        match self.0.load(Ordering::Acquire) {
            ACTIVE => ListenerState::Active,
            EVICTED => ListenerState::Evicted,
            _ => ListenerState::Removed,
        }
    }

    /// Leaves `Active` for a terminal state. Terminal states never change.
    pub(crate) fn finish(&self, to: ListenerState) -> bool {
        let to = match to {
            ListenerState::Active => return false,
            ListenerState::Evicted => EVICTED,
            ListenerState::Removed => REMOVED,
        };
        self.0
            .compare_exchange(ACTIVE, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Receiving half of a bounded listener queue.
///
/// Also a [`Stream`] of `Arc<TaggedUpdate>`, ending once the queue left the
/// fan-out and its buffer is drained.
#[derive(Debug)]
pub struct ListenerQueue {
    id: ListenerId,
    rx: mpsc::Receiver<Arc<TaggedUpdate>>,
    state: Arc<StateCell>,
}

impl ListenerQueue {
    pub(crate) fn new(
        id: ListenerId,
        rx: mpsc::Receiver<Arc<TaggedUpdate>>,
        state: Arc<StateCell>,
    ) -> Self {
        Self { id, rx, state }
    }

    /// Identity used by [`Handler::unsubscribe_id`](crate::Handler::unsubscribe_id).
    #[inline]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    #[inline]
    pub fn state(&self) -> ListenerState {
        self.state.load()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state() == ListenerState::Active
    }

    /// Pops the oldest buffered update without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<TaggedUpdate>> {
        self.rx.try_recv().ok()
    }

    /// Waits for the next update.
    ///
    /// Returns `None` once the queue left the fan-out and the buffer is empty.
    pub async fn recv(&mut self) -> Option<Arc<TaggedUpdate>> {
        self.rx.recv().await
    }

    /// Blocking variant of [`recv`](Self::recv) for plain threads.
    ///
    /// # Panics
    /// When called from within an asynchronous execution context.
    pub fn blocking_recv(&mut self) -> Option<Arc<TaggedUpdate>> {
        self.rx.blocking_recv()
    }

    /// Takes every update buffered right now.
    pub fn drain(&mut self) -> Vec<Arc<TaggedUpdate>> {
        let mut out = Vec::with_capacity(self.rx.len());
        while let Ok(update) = self.rx.try_recv() {
            out.push(update);
        }
        out
    }

    /// Number of buffered updates.
    #[inline]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Stream for ListenerQueue {
    type Item = Arc<TaggedUpdate>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_are_final() {
        let cell = StateCell::default();
        assert_eq!(cell.load(), ListenerState::Active);

        assert!(cell.finish(ListenerState::Evicted));
        assert!(!cell.finish(ListenerState::Removed));
        assert!(!cell.finish(ListenerState::Active));
        assert_eq!(cell.load(), ListenerState::Evicted);
    }

    #[test]
    fn labels() {
        assert_eq!(ListenerState::Active.as_label(), "active");
        assert_eq!(ListenerState::Evicted.as_label(), "evicted");
        assert_eq!(ListenerState::Removed.as_label(), "removed");
    }
}
