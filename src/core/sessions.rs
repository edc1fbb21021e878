//! # Session registry: routing updates to the connection that asked for them.
//!
//! Collaborators that forward progress over a network (one socket per
//! client request) keep their per-connection sending handles here, keyed by
//! the `request_id` metadata that every [`TaggedUpdate`] of that request carries.
//!
//! ## Rules
//! - `open` replaces any previous session under the same id.
//! - Dropping a [`SessionGuard`] removes its own entry, never a newer one that
//!   replaced it.
//! - Values are cheap `Clone` handles (e.g. channel senders); lookups clone them
//!   out so no lock is held while sending.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::progress::TaggedUpdate;

type Sessions<S> = HashMap<String, (u64, S)>;

/// Map from request id to session handle, shareable across threads.
pub struct SessionRegistry<S> {
    sessions: Arc<Mutex<Sessions<S>>>,
    generation: Arc<AtomicU64>,
}

impl<S> SessionRegistry<S> {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Sessions<S>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers `session` under `request_id` until the guard is dropped.
    pub fn open(&self, request_id: impl Into<String>, session: S) -> SessionGuard<S> {
        let request_id = request_id.into();
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        self.lock().insert(request_id.clone(), (generation, session));
        SessionGuard {
            registry: self.clone(),
            request_id,
            generation,
        }
    }

    /// Removes the session under `request_id`, returning it.
    pub fn close(&self, request_id: &str) -> Option<S> {
        self.lock().remove(request_id).map(|(_, session)| session)
    }

    pub fn contains(&self, request_id: &str) -> bool {
        self.lock().contains_key(request_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl<S: Clone> SessionRegistry<S> {
    pub fn get(&self, request_id: &str) -> Option<S> {
        self.lock().get(request_id).map(|(_, session)| session.clone())
    }

    /// Session owning `update`, found through its `request_id` metadata.
    pub fn route(&self, update: &TaggedUpdate) -> Option<S> {
        update.request_id().and_then(|id| self.get(id))
    }
}

impl<S> Clone for SessionRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
            generation: Arc::clone(&self.generation),
        }
    }
}

impl<S> Default for SessionRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps a session registered; removes it on drop.
pub struct SessionGuard<S> {
    registry: SessionRegistry<S>,
    request_id: String,
    generation: u64,
}

impl<S> SessionGuard<S> {
    #[inline]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

impl<S> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        let mut sessions = self.registry.lock();
        if sessions
            .get(&self.request_id)
            .is_some_and(|(generation, _)| *generation == self.generation)
        {
            sessions.remove(&self.request_id);
        }
    }
}
