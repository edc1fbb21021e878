//! Handler events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publisher**: `Handler` (listener lifecycle, eviction).
//! - **Consumers**: `Handler::events()` receivers.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
