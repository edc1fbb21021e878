//! # Subscriber: a publisher whose snapshots carry its identity.
//!
//! [`Subscriber`] decorates a [`Publisher`] with one internal subscription that
//! wraps every snapshot into a [`TaggedUpdate`] (`progress_bar_id` + snapshot)
//! and forwards it to a single external `on_progress_update` function. Many
//! subscribers can then feed one consumer, which tells them apart by id.
//!
//! ```text
//! Subscriber ──► Publisher ──► snapshot
//!                    │
//!                    └─ internal callback ─► TaggedUpdate { progress_bar_id, format_dict }
//!                                                  │
//!                                                  └─► on_progress_update(update)
//! ```
//!
//! ## Rules
//! - Exactly one internal registration exists from construction on.
//! - Every update carries the same `progress_bar_id` for the subscriber's lifetime.
//! - Further callbacks can be added with `subscribe`; they get plain snapshots.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;

use crate::error::ConfigError;
use crate::progress::{ProgressBarId, ProgressSnapshot, SubscriptionId, TaggedUpdate};
use crate::publisher::{Manual, Publisher, SharedPublisher};
use crate::tracker::{ProgressTracker, Track, TrackerConfig};

/// Publisher tagging every snapshot with its identity.
pub struct Subscriber<S = Manual, T = ProgressTracker> {
    publisher: Publisher<S, T>,
}

impl<I: Iterator> Subscriber<I> {
    /// Wraps an iterable; `on_progress_update` receives every tagged update.
    ///
    /// # Errors
    /// Whatever [`TrackerConfig::validate`] rejects.
    pub fn new<It, F>(
        iterable: It,
        on_progress_update: F,
        config: TrackerConfig,
    ) -> Result<Self, ConfigError>
    where
        It: IntoIterator<IntoIter = I>,
        F: FnMut(TaggedUpdate) + Send + 'static,
    {
        Ok(Self::wrap(Publisher::new(iterable, config)?, on_progress_update))
    }
}

impl<St: Stream + Unpin> Subscriber<St> {
    /// Wraps an asynchronous stream.
    pub fn from_stream<F>(
        stream: St,
        on_progress_update: F,
        config: TrackerConfig,
    ) -> Result<Self, ConfigError>
    where
        F: FnMut(TaggedUpdate) + Send + 'static,
    {
        Ok(Self::wrap(Publisher::from_stream(stream, config)?, on_progress_update))
    }
}

impl Subscriber<Manual> {
    /// Creates a manual counter, e.g. one update per completed remote task.
    pub fn manual<F>(on_progress_update: F, config: TrackerConfig) -> Result<Self, ConfigError>
    where
        F: FnMut(TaggedUpdate) + Send + 'static,
    {
        Ok(Self::wrap(Publisher::manual(config)?, on_progress_update))
    }
}

impl<S, T: Track> Subscriber<S, T> {
    /// Turns an existing publisher into a subscriber.
    pub fn wrap<F>(mut publisher: Publisher<S, T>, mut on_progress_update: F) -> Self
    where
        F: FnMut(TaggedUpdate) + Send + 'static,
    {
        let progress_bar_id = publisher.id();
        publisher.subscribe(move |snapshot| {
            on_progress_update(TaggedUpdate::new(progress_bar_id, snapshot.clone()));
        });
        Self { publisher }
    }

    /// Identity carried by every update.
    #[inline]
    pub fn id(&self) -> ProgressBarId {
        self.publisher.id()
    }

    /// Advances by `n` steps; returns whether the change was visible.
    pub fn update(&mut self, n: u64) -> bool {
        self.publisher.update(n)
    }

    /// Adds a plain snapshot callback next to the internal one.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ProgressSnapshot) + Send + 'static,
    {
        self.publisher.subscribe(callback)
    }

    /// Removes a callback added with [`subscribe`](Self::subscribe).
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.publisher.unsubscribe(id)
    }

    /// Replaces the expected total.
    pub fn set_total(&mut self, total: Option<u64>) {
        self.publisher.set_total(total);
    }

    /// Flushes the final state and stops accepting updates.
    pub fn close(&mut self) {
        self.publisher.close();
    }

    /// Current full snapshot.
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.publisher.snapshot()
    }

    /// Number of registered callbacks, the internal one included.
    pub fn subscriber_count(&self) -> usize {
        self.publisher.subscriber_count()
    }

    /// Underlying publisher.
    pub fn publisher(&self) -> &Publisher<S, T> {
        &self.publisher
    }

    /// Unwraps into the underlying publisher; the tagging callback stays registered.
    pub fn into_publisher(self) -> Publisher<S, T> {
        self.publisher
    }

    /// Shares this subscriber across threads.
    pub fn into_shared(self) -> SharedPublisher<S, T> {
        SharedPublisher::new(self.publisher)
    }
}

impl<I: Iterator, T: Track> Iterator for Subscriber<I, T> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        self.publisher.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        Iterator::size_hint(&self.publisher)
    }
}

impl<St, T> Stream for Subscriber<St, T>
where
    St: Stream + Unpin,
    T: Track + Unpin,
{
    type Item = St::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<St::Item>> {
        Pin::new(&mut self.get_mut().publisher).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn unthrottled() -> TrackerConfig {
        TrackerConfig {
            min_interval: Duration::ZERO,
            ..TrackerConfig::default()
        }
    }

    fn collector() -> (Arc<Mutex<Vec<TaggedUpdate>>>, impl FnMut(TaggedUpdate) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |update| sink.lock().unwrap().push(update))
    }

    #[test]
    fn starts_with_exactly_one_internal_callback() {
        let subscriber =
            Subscriber::new(Vec::<u8>::new(), |_| {}, TrackerConfig::default()).unwrap();
        assert_eq!(subscriber.subscriber_count(), 1);
    }

    #[test]
    fn every_update_carries_the_same_identity() {
        let (seen, on_update) = collector();
        let mut subscriber = Subscriber::new(0..20, on_update, unthrottled()).unwrap();
        let id = subscriber.id();
        for _ in subscriber.by_ref() {}

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 21);
        let ids: HashSet<_> = seen.iter().map(|u| u.progress_bar_id).collect();
        assert_eq!(ids.len(), 1);
        assert!(ids.contains(&id));
        assert_eq!(seen.last().map(|u| u.format.count), Some(20));
        assert!(seen.iter().all(|u| u.metadata.is_empty()));
    }

    #[test]
    fn manual_updates_are_forwarded() {
        let (seen, on_update) = collector();
        let cfg = TrackerConfig {
            total: Some(3),
            ..unthrottled()
        };
        let mut subscriber = Subscriber::manual(on_update, cfg).unwrap();
        for _ in 0..3 {
            subscriber.update(1);
        }

        let counts: Vec<_> = seen.lock().unwrap().iter().map(|u| u.format.count).collect();
        assert_eq!(counts, vec![0, 1, 2, 3]);
        assert!(subscriber.snapshot().is_complete());
    }

    #[test]
    fn extra_subscriptions_leave_the_internal_one_alone() {
        let (seen, on_update) = collector();
        let mut subscriber = Subscriber::manual(on_update, unthrottled()).unwrap();

        let extra = subscriber.subscribe(|_| {});
        assert_eq!(subscriber.subscriber_count(), 2);
        assert!(subscriber.unsubscribe(extra));
        assert!(!subscriber.unsubscribe(extra));
        assert_eq!(subscriber.subscriber_count(), 1);

        subscriber.update(1);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}
