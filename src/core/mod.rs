//! Fan-out core: the process-wide handler and its listener queues.
//!
//! Internal modules:
//! - [`handler`]: listener registry, non-blocking announce with eviction, lifecycle events;
//! - [`listener`]: receiving half of a bounded listener queue and its state machine;
//! - [`announcer`]: weak announce capability held by handler-created subscribers;
//! - [`sessions`]: request-id keyed session registry for transport collaborators;
//! - [`config`]: handler configuration.

mod announcer;
mod config;
mod handler;
mod listener;
mod sessions;

pub use announcer::Announcer;
pub use config::{HandlerConfig, MAX_QUEUE_CAPACITY};
pub use handler::{Handler, HandlerStats};
pub use listener::{ListenerQueue, ListenerState};
pub use sessions::{SessionGuard, SessionRegistry};
