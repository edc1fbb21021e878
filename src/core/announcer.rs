//! Non-owning announce capability handed to handler-created subscribers.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::progress::TaggedUpdate;

use super::handler::Inner;

/// Weak handle to a [`Handler`](crate::Handler).
///
/// Subscribers created by the handler hold one of these instead of the handler
/// itself, so they never keep it alive. Once every `Handler` clone is dropped,
/// announcing is a no-op.
#[derive(Clone)]
pub struct Announcer {
    inner: Weak<Inner>,
}

impl Announcer {
    pub(crate) fn new(inner: Weak<Inner>) -> Self {
        Self { inner }
    }

    /// Announces `update` to every live listener.
    ///
    /// Returns `false` when the handler is gone.
    pub fn announce(&self, update: TaggedUpdate) -> bool {
        match self.inner.upgrade() {
            Some(inner) => {
                inner.announce(Arc::new(update));
                true
            }
            None => false,
        }
    }

    /// True while the handler is alive.
    pub fn is_connected(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl fmt::Debug for Announcer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Announcer")
            .field("connected", &self.is_connected())
            .finish()
    }
}
