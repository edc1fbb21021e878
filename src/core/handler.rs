//! # Handler: process-wide progress fan-out.
//!
//! A [`Handler`] multiplexes [`TaggedUpdate`]s from any number of publishers,
//! on any number of threads, into per-listener bounded queues.
//!
//! ## Architecture
//! ```text
//! Subscriber A ──┐ (Announcer, weak)
//! Subscriber B ──┼──► announce(update) ──► [queue L3] ──► owner of L3
//! Pool counter ──┘        │  newest first ├► [queue L2] ──► owner of L2
//!                         │               └► [queue L1] ──► owner of L1
//!                         │
//!                         └─ full? ──► evict ──► Bus ──► events()
//! ```
//!
//! ## Rules
//! - **Non-blocking**: `announce` uses `try_send` and never waits, even under the lock.
//! - **Eviction is permanent**: a full queue is removed from the fan-out; the owner
//!   keeps its buffered updates and must `listen()` again to resume.
//! - **Reaping**: a queue whose owner dropped it is removed on the next announce.
//! - **One copy per live listener**: every announce delivers the same `Arc` to
//!   each listener that has room.
//! - **Surfaced, not silent**: evictions are counted in [`HandlerStats`], logged
//!   at `warn` and published as [`EventKind::ListenerEvicted`].
//!
//! ## Example
//! ```rust
//! use progresscast::{Handler, TrackerConfig};
//! use serde_json::{Map, Value};
//! use std::time::Duration;
//!
//! let handler = Handler::default();
//! let mut listener = handler.listen();
//!
//! let mut metadata = Map::new();
//! metadata.insert("job_id".into(), Value::from("abc"));
//! let cfg = TrackerConfig { min_interval: Duration::ZERO, ..TrackerConfig::default() };
//!
//! let sum: u32 = handler
//!     .create_progress_subscriber(0..3u32, metadata, cfg)
//!     .unwrap()
//!     .sum();
//! assert_eq!(sum, 3);
//!
//! let updates = listener.drain();
//! assert_eq!(updates.len(), 4);
//! assert_eq!(updates[3].format.count, 3);
//! assert_eq!(updates[3].metadata_str("job_id"), Some("abc"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use futures::Stream;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::events::{Bus, Event, EventKind};
use crate::progress::{ListenerId, TaggedUpdate};
use crate::publisher::{Manual, Subscriber};
use crate::tracker::TrackerConfig;

use super::announcer::Announcer;
use super::config::HandlerConfig;
use super::listener::{ListenerQueue, ListenerState, StateCell};

static GLOBAL: OnceLock<Handler> = OnceLock::new();

/// Sending half of one listener queue, owned by the handler.
struct ListenerSlot {
    id: ListenerId,
    sender: mpsc::Sender<Arc<TaggedUpdate>>,
    state: Arc<StateCell>,
}

impl ListenerSlot {
    /// Updates buffered and not yet drained by the owner.
    fn pending(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }
}

pub(crate) struct Inner {
    listeners: Mutex<Vec<ListenerSlot>>,
    bus: Bus,
    config: HandlerConfig,
    announced: AtomicU64,
    delivered: AtomicU64,
    evicted: AtomicU64,
    removed: AtomicU64,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Vec<ListenerSlot>> {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Pushes `update` into every live listener and returns how many received it.
    pub(crate) fn announce(&self, update: Arc<TaggedUpdate>) -> usize {
        let mut delivered = 0usize;
        let mut evicted = Vec::new();
        let mut closed = Vec::new();

        {
            let mut listeners = self.lock();
            for i in (0..listeners.len()).rev() {
                match listeners[i].sender.try_send(Arc::clone(&update)) {
                    Ok(()) => delivered += 1,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        let slot = listeners.remove(i);
                        slot.state.finish(ListenerState::Evicted);
                        evicted.push((slot.id, slot.pending()));
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        let slot = listeners.remove(i);
                        slot.state.finish(ListenerState::Removed);
                        closed.push(slot.id);
                    }
                }
            }
        }

        self.announced.fetch_add(1, Ordering::Relaxed);
        self.delivered.fetch_add(delivered as u64, Ordering::Relaxed);
        self.evicted.fetch_add(evicted.len() as u64, Ordering::Relaxed);
        self.removed.fetch_add(closed.len() as u64, Ordering::Relaxed);

        for (id, pending) in evicted {
            warn!(
                listener = %id,
                progress_bar = %update.progress_bar_id,
                pending,
                "listener queue full, evicted"
            );
            self.bus.publish(Event::listener_evicted(id, pending));
        }
        for id in closed {
            debug!(listener = %id, "listener queue dropped by owner, reaped");
            self.bus.publish(
                Event::new(EventKind::ListenerClosed)
                    .with_listener(id)
                    .with_reason("closed"),
            );
        }
        delivered
    }
}

/// Announces each tagged update with `metadata` attached.
fn forwarder(
    announcer: Announcer,
    metadata: Map<String, Value>,
) -> impl FnMut(TaggedUpdate) + Send + 'static {
    move |update: TaggedUpdate| {
        announcer.announce(update.with_metadata(metadata.clone()));
    }
}

/// Point-in-time counters of a [`Handler`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HandlerStats {
    /// Listeners currently registered.
    pub listeners: usize,
    /// Calls to `announce`.
    pub announced: u64,
    /// Updates pushed into listener queues.
    pub delivered: u64,
    /// Listeners dropped because their queue was full.
    pub evicted: u64,
    /// Listeners removed by `unsubscribe` or reaped after their owner dropped them.
    pub removed: u64,
}

/// Fan-out switchboard from progress publishers to bounded listener queues.
///
/// Cheap to clone; clones share the same listeners.
#[derive(Clone)]
pub struct Handler {
    inner: Arc<Inner>,
}

impl Handler {
    /// Creates a handler after validating `config`.
    ///
    /// # Errors
    /// Whatever [`HandlerConfig::validate`] rejects: a zero or oversized listener bound.
    pub fn new(config: HandlerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: HandlerConfig) -> Self {
        let bus = Bus::new(config.bus_capacity_clamped());
        Self {
            inner: Arc::new(Inner {
                listeners: Mutex::new(Vec::new()),
                bus,
                config,
                announced: AtomicU64::new(0),
                delivered: AtomicU64::new(0),
                evicted: AtomicU64::new(0),
                removed: AtomicU64::new(0),
            }),
        }
    }

    /// Lazily-initialized process-wide handler with the default configuration.
    pub fn global() -> &'static Handler {
        GLOBAL.get_or_init(Handler::default)
    }

    #[inline]
    pub fn config(&self) -> &HandlerConfig {
        &self.inner.config
    }

    /// Registers a new bounded queue and hands its receiving half to the caller.
    pub fn listen(&self) -> ListenerQueue {
        let id = ListenerId::new();
        let (sender, rx) = mpsc::channel(self.inner.config.queue_capacity);
        let state = Arc::new(StateCell::default());

        self.inner.lock().push(ListenerSlot {
            id,
            sender,
            state: Arc::clone(&state),
        });

        debug!(listener = %id, capacity = self.inner.config.queue_capacity, "listener registered");
        self.inner
            .bus
            .publish(Event::new(EventKind::ListenerAdded).with_listener(id));
        ListenerQueue::new(id, rx, state)
    }

    /// Pushes `update` into every live listener, newest-registered first.
    ///
    /// Returns the number of listeners that received it.
    pub fn announce(&self, update: TaggedUpdate) -> usize {
        self.inner.announce(Arc::new(update))
    }

    /// Same as [`announce`](Self::announce) for an already shared update.
    pub fn announce_arc(&self, update: Arc<TaggedUpdate>) -> usize {
        self.inner.announce(update)
    }

    /// Removes `listener` from the fan-out. Idempotent.
    ///
    /// Returns `false` if it was not registered (already removed or evicted).
    pub fn unsubscribe(&self, listener: &ListenerQueue) -> bool {
        self.unsubscribe_id(listener.id())
    }

    /// Removes the listener with `id` from the fan-out. Idempotent.
    pub fn unsubscribe_id(&self, id: ListenerId) -> bool {
        let slot = {
            let mut listeners = self.inner.lock();
            match listeners.iter().position(|slot| slot.id == id) {
                Some(pos) => listeners.remove(pos),
                None => return false,
            }
        };
        slot.state.finish(ListenerState::Removed);
        self.inner.removed.fetch_add(1, Ordering::Relaxed);

        let pending = slot.pending();
        debug!(listener = %id, pending, "listener removed");
        self.inner.bus.publish(
            Event::new(EventKind::ListenerRemoved)
                .with_listener(id)
                .with_pending(pending),
        );
        true
    }

    /// Weak announce capability for collaborators that must not keep the handler alive.
    pub fn announcer(&self) -> Announcer {
        Announcer::new(Arc::downgrade(&self.inner))
    }

    /// Subscriber over `iterable` whose updates carry `metadata` and are announced here.
    ///
    /// # Errors
    /// Whatever [`TrackerConfig::validate`] rejects; nothing is announced then.
    pub fn create_progress_subscriber<It>(
        &self,
        iterable: It,
        metadata: Map<String, Value>,
        config: TrackerConfig,
    ) -> Result<Subscriber<It::IntoIter>, ConfigError>
    where
        It: IntoIterator,
    {
        Subscriber::new(iterable, forwarder(self.announcer(), metadata), config)
    }

    /// Stream variant of [`create_progress_subscriber`](Self::create_progress_subscriber).
    pub fn create_stream_subscriber<St>(
        &self,
        stream: St,
        metadata: Map<String, Value>,
        config: TrackerConfig,
    ) -> Result<Subscriber<St>, ConfigError>
    where
        St: Stream + Unpin,
    {
        Subscriber::from_stream(stream, forwarder(self.announcer(), metadata), config)
    }

    /// Manual counter whose updates carry `metadata` and are announced here.
    ///
    /// Useful for pool-level counters advanced once per finished task.
    pub fn create_counter(
        &self,
        metadata: Map<String, Value>,
        config: TrackerConfig,
    ) -> Result<Subscriber<Manual>, ConfigError> {
        Subscriber::manual(forwarder(self.announcer(), metadata), config)
    }

    /// Subscribes to listener lifecycle events published from now on.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn stats(&self) -> HandlerStats {
        HandlerStats {
            listeners: self.listener_count(),
            announced: self.inner.announced.load(Ordering::Relaxed),
            delivered: self.inner.delivered.load(Ordering::Relaxed),
            evicted: self.inner.evicted.load(Ordering::Relaxed),
            removed: self.inner.removed.load(Ordering::Relaxed),
        }
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::from_validated(HandlerConfig::default())
    }
}
