//! # Publishers and subscribers.
//!
//! - [`Publisher`] tracker + ordered callback registry, intercepting advance
//! - [`Subscriber`] publisher tagging snapshots with its [`ProgressBarId`](crate::ProgressBarId)
//! - [`SharedPublisher`] mutex-guarded publisher for multi-threaded driving
//! - [`ProgressIteratorExt`] `iter.publish(config)` sugar
//!
//! ## Source kinds
//! ```text
//! Publisher<I: Iterator>        for item in publisher { .. }
//! Publisher<St: Stream>         while let Some(x) = publisher.next().await { .. }
//! Publisher<Manual>             publisher.update(n)
//! ```

mod publisher;
mod registry;
mod shared;
mod subscriber;

pub use publisher::{Manual, ProgressIteratorExt, Publisher};
pub use registry::Callback;
pub use shared::SharedPublisher;
pub use subscriber::Subscriber;
