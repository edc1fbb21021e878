//! # progresscast
//!
//! **progresscast** instruments long-running iterative work so that its
//! progress can be observed by a dynamic set of consumers (in-process
//! callbacks, cross-thread queues, network collaborators) without the
//! iterating code knowing who is listening.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Subscriber  │   │  Subscriber  │   │   counter    │
//!     │ (thread #1)  │   │ (thread #2)  │   │ (pool-level) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ Publisher        │ Publisher        │ Publisher
//!            │ ├ ProgressTracker│ (throttle, rate) │
//!            │ └ callbacks      │                  │
//!            ▼ TaggedUpdate     ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Handler (fan-out switchboard)                                    │
//! │  - listener queues (bounded, newest first)                        │
//! │  - eviction on overflow                                           │
//! │  - Bus (lifecycle events)                                         │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               ▼
//!   ListenerQueue      ListenerQueue      ListenerQueue   events()
//!   (websocket task)   (SSE task)         (test drain)    (lifecycle receivers)
//! ```
//!
//! ### One advance
//! ```text
//! next() / update(n)
//!   ├─► tracker.advance(n) ──► visible? (min_interval, always_notify)
//!   │        └─ no  ──► nothing is emitted
//!   └─ yes ──► snapshot ──► callback #1 ──► callback #2 ──► ...
//!                               │ (Subscriber)
//!                               └─► TaggedUpdate{ id, format, metadata }
//!                                     └─► Handler::announce ──► every live listener
//! ```
//!
//! ## Features
//! | Area              | Description                                                | Key types / traits                        |
//! |-------------------|------------------------------------------------------------|-------------------------------------------|
//! | **Publishing**    | Progress-reporting iterators, streams and manual counters. | [`Publisher`], [`ProgressIteratorExt`]    |
//! | **Tagging**       | Identity-stamped updates for one external sink.            | [`Subscriber`], [`TaggedUpdate`]          |
//! | **Fan-out**       | Bounded per-listener queues with eviction.                 | [`Handler`], [`ListenerQueue`]            |
//! | **Sessions**      | Route updates to the connection that requested them.       | [`SessionRegistry`]                       |
//! | **Lifecycle**     | Listener added/removed/evicted/closed notifications.       | [`Event`], [`Bus`]                        |
//! | **Policies**      | Callback failure isolation, replay on subscribe.           | [`CallbackPolicy`], [`ReplayPolicy`]      |
//! | **Configuration** | Validated tracker and handler settings.                    | [`TrackerConfig`], [`HandlerConfig`]      |
//!
//! ## Example
//! ```rust
//! use std::thread;
//! use std::time::Duration;
//! use progresscast::{Handler, TrackerConfig};
//! use serde_json::{Map, Value};
//!
//! let handler = Handler::default();
//! let mut listener = handler.listen();
//!
//! let workers: Vec<_> = (0..4)
//!     .map(|worker| {
//!         let handler = handler.clone();
//!         thread::spawn(move || {
//!             let mut metadata = Map::new();
//!             metadata.insert("worker".into(), Value::from(worker));
//!             let cfg = TrackerConfig { min_interval: Duration::ZERO, ..TrackerConfig::default() };
//!             let steps = handler.create_progress_subscriber(0..5, metadata, cfg).unwrap();
//!             for _step in steps {}
//!         })
//!     })
//!     .collect();
//! for w in workers {
//!     w.join().unwrap();
//! }
//!
//! // One replayed snapshot plus five advances per worker.
//! assert_eq!(listener.drain().len(), 4 * 6);
//! ```

mod core;
mod error;
mod events;
mod policies;
mod progress;
mod publisher;
mod tracker;

// ---- Public re-exports ----

pub use crate::core::{
    Announcer, Handler, HandlerConfig, HandlerStats, ListenerQueue, ListenerState,
    MAX_QUEUE_CAPACITY, SessionGuard, SessionRegistry,
};
pub use error::ConfigError;
pub use events::{Bus, Event, EventKind};
pub use policies::{CallbackPolicy, ReplayPolicy};
pub use progress::{
    ListenerId, ProgressBarId, ProgressSnapshot, REQUEST_ID_KEY, SubscriptionId, TaggedUpdate,
};
pub use publisher::{Callback, Manual, ProgressIteratorExt, Publisher, SharedPublisher, Subscriber};
pub use tracker::{ProgressTracker, Track, TrackerConfig, TrackerConfigBuilder};
