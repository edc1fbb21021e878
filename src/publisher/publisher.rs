//! # Publisher: a tracker that broadcasts its snapshots.
//!
//! [`Publisher`] composes a source (iterator, stream, or [`Manual`]) with a
//! [`Track`] implementation and a private callback registry. It intercepts only
//! the advance step: the tracker does the counting and throttling, the
//! publisher fans the resulting snapshot out to every callback.
//!
//! ## Advance
//! ```text
//! update(n)
//!   ├─► tracker.advance(n) ──► visible?
//!   │                           ├─ yes ─────────────► notify all (registration order)
//!   │                           └─ no  ─ always_notify? ─► notify all
//!   └─► returns visible
//! ```
//!
//! ## Iteration
//! The step for element *k* is counted when element *k + 1* is requested, so
//! `count` is the number of **completed** iterations. When the source is
//! exhausted, throttled progress is flushed and subscribers see the final
//! count. Leaving a loop early (`break`) does not count the element in hand.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use std::time::Duration;
//! use progresscast::{Publisher, TrackerConfig};
//!
//! let cfg = TrackerConfig { min_interval: Duration::ZERO, ..TrackerConfig::default() };
//! let mut publisher = Publisher::new(0..3, cfg).unwrap();
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! publisher.subscribe(move |snap| sink.lock().unwrap().push(snap.count));
//!
//! let items: Vec<_> = publisher.by_ref().collect();
//! assert_eq!(items, vec![0, 1, 2]);
//! // replay of the initial state, then one update per completed iteration
//! assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3]);
//! ```

use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;

use crate::error::ConfigError;
use crate::policies::ReplayPolicy;
use crate::progress::{ProgressBarId, ProgressSnapshot, SubscriptionId};
use crate::publisher::registry::CallbackRegistry;
use crate::tracker::{ProgressTracker, Track, TrackerConfig};

/// Source marker for publishers advanced only through [`Publisher::update`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Manual;

/// Progress tracker with a multi-callback broadcast capability.
pub struct Publisher<S = Manual, T = ProgressTracker> {
    id: ProgressBarId,
    source: S,
    tracker: T,
    registry: CallbackRegistry,
    always_notify: bool,
    replay: ReplayPolicy,
    /// An element was handed out and its iteration is not counted yet.
    pending_step: bool,
    last_notified: Option<u64>,
    closed: bool,
}

impl<I: Iterator> Publisher<I> {
    /// Wraps an iterable.
    ///
    /// If `config.total` is `None` and the iterator reports an exact length,
    /// that length becomes the total.
    ///
    /// # Errors
    /// Whatever [`TrackerConfig::validate`] rejects.
    pub fn new<It>(iterable: It, config: TrackerConfig) -> Result<Self, ConfigError>
    where
        It: IntoIterator<IntoIter = I>,
    {
        let source = iterable.into_iter();
        let total = config.total.or_else(|| exact_len(source.size_hint()));
        let tracker = ProgressTracker::new(&TrackerConfig {
            total,
            ..config.clone()
        })?;
        Ok(Self::with_tracker(source, tracker, &config))
    }
}

impl<St: Stream + Unpin> Publisher<St> {
    /// Wraps an asynchronous stream, e.g. `FuturesUnordered` of pending work.
    ///
    /// Total inference follows the same rule as [`Publisher::new`].
    pub fn from_stream(stream: St, config: TrackerConfig) -> Result<Self, ConfigError> {
        let total = config.total.or_else(|| exact_len(stream.size_hint()));
        let tracker = ProgressTracker::new(&TrackerConfig {
            total,
            ..config.clone()
        })?;
        Ok(Self::with_tracker(stream, tracker, &config))
    }
}

impl Publisher<Manual> {
    /// Creates a counter driven only by [`update`](Self::update).
    pub fn manual(config: TrackerConfig) -> Result<Self, ConfigError> {
        let tracker = ProgressTracker::new(&config)?;
        Ok(Self::with_tracker(Manual, tracker, &config))
    }
}

impl<S, T: Track> Publisher<S, T> {
    /// Builds a publisher around a custom tracker.
    ///
    /// Only the publishing options of `config` are used (`always_notify`,
    /// `replay`, `callback_policy`); counting settings belong to `tracker`.
    pub fn with_tracker(source: S, tracker: T, config: &TrackerConfig) -> Self {
        Self {
            id: ProgressBarId::new(),
            source,
            tracker,
            registry: CallbackRegistry::new(config.callback_policy),
            always_notify: config.always_notify,
            replay: config.replay,
            pending_step: false,
            last_notified: None,
            closed: false,
        }
    }

    /// Stable identity of this progress bar.
    #[inline]
    pub fn id(&self) -> ProgressBarId {
        self.id
    }

    /// Registers `callback` for every subsequent visible advance.
    ///
    /// With [`ReplayPolicy::Immediate`] the callback is also invoked once with
    /// the current snapshot before this returns.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ProgressSnapshot) + Send + 'static,
    {
        let id = SubscriptionId::new();
        self.registry.insert(id, Box::new(callback));

        if self.replay == ReplayPolicy::Immediate {
            let snapshot = self.tracker.snapshot();
            self.registry.dispatch_one(id, &snapshot);
        }
        id
    }

    /// Removes a subscription; `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.registry.remove(id)
    }

    /// True if `id` is currently registered.
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.registry.contains(id)
    }

    /// Advances by `n` steps; returns whether the change was visible.
    ///
    /// Callbacks run when the change is visible or `always_notify` is set.
    /// Updates after [`close`](Self::close) are ignored.
    pub fn update(&mut self, n: u64) -> bool {
        if self.closed {
            return false;
        }
        let visible = self.tracker.advance(n);
        if visible || self.always_notify {
            self.notify();
        }
        visible
    }

    /// Replaces the expected total (e.g. once a remote job reports its size).
    pub fn set_total(&mut self, total: Option<u64>) {
        self.tracker.set_total(total);
    }

    /// Flushes throttled progress to subscribers and stops accepting updates.
    ///
    /// Called automatically when the source is exhausted. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.pending_step = false;
        let flushed = self.tracker.flush();
        if flushed && self.last_notified != Some(self.tracker.count()) {
            self.notify();
        }
        self.closed = true;
    }

    /// True after [`close`](Self::close) or source exhaustion.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Current full snapshot.
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.tracker.snapshot()
    }

    /// Number of registered callbacks.
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of callback panics caught under `CallbackPolicy::Isolate`.
    pub fn callback_failures(&self) -> u64 {
        self.registry.failures()
    }

    /// Read access to the underlying tracker.
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    fn notify(&mut self) {
        let snapshot = self.tracker.snapshot();
        self.last_notified = Some(snapshot.count);
        self.registry.dispatch(&snapshot);
    }

    /// Counts the iteration of the previously handed-out element.
    fn commit_pending(&mut self) {
        if mem::take(&mut self.pending_step) {
            self.update(1);
        }
    }
}

impl<I: Iterator, T: Track> Iterator for Publisher<I, T> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        if self.closed {
            return None;
        }
        self.commit_pending();

        match self.source.next() {
            Some(item) => {
                self.pending_step = true;
                Some(item)
            }
            None => {
                self.close();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.closed {
            (0, Some(0))
        } else {
            self.source.size_hint()
        }
    }
}

impl<St, T> Stream for Publisher<St, T>
where
    St: Stream + Unpin,
    T: Track + Unpin,
{
    type Item = St::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<St::Item>> {
        let this = self.get_mut();
        if this.closed {
            return Poll::Ready(None);
        }
        this.commit_pending();

        match Pin::new(&mut this.source).poll_next(cx) {
            Poll::Ready(Some(item)) => {
                this.pending_step = true;
                Poll::Ready(Some(item))
            }
            Poll::Ready(None) => {
                this.close();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.closed {
            (0, Some(0))
        } else {
            self.source.size_hint()
        }
    }
}

/// Extension trait: `iter.publish(config)` instead of `Publisher::new(iter, config)`.
pub trait ProgressIteratorExt: Iterator + Sized {
    /// Wraps this iterator in a [`Publisher`].
    fn publish(self, config: TrackerConfig) -> Result<Publisher<Self>, ConfigError> {
        Publisher::new(self, config)
    }
}

impl<I: Iterator> ProgressIteratorExt for I {}

fn exact_len((lower, upper): (usize, Option<usize>)) -> Option<u64> {
    match upper {
        Some(upper) if upper == lower => Some(lower as u64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::policies::CallbackPolicy;

    fn unthrottled() -> TrackerConfig {
        TrackerConfig {
            min_interval: Duration::ZERO,
            ..TrackerConfig::default()
        }
    }

    fn counts() -> (Arc<Mutex<Vec<u64>>>, impl FnMut(&ProgressSnapshot) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |snap: &ProgressSnapshot| {
            sink.lock().unwrap().push(snap.count)
        })
    }

    #[test]
    fn new_publisher_has_no_callbacks() {
        let publisher = Publisher::manual(TrackerConfig::default()).unwrap();
        assert_eq!(publisher.subscriber_count(), 0);
        assert_eq!(publisher.snapshot().count, 0);
    }

    #[test]
    fn yields_the_wrapped_sequence() {
        let items: Vec<_> = Publisher::new(vec!['a', 'b', 'c'], unthrottled())
            .unwrap()
            .collect();
        assert_eq!(items, vec!['a', 'b', 'c']);
    }

    #[test]
    fn infers_total_from_exact_iterators() {
        let publisher = Publisher::new(0..7, TrackerConfig::default()).unwrap();
        assert_eq!(publisher.snapshot().total, Some(7));

        let filtered =
            Publisher::new((0..7).filter(|n| n % 2 == 0), TrackerConfig::default()).unwrap();
        assert_eq!(filtered.snapshot().total, None);
    }

    #[test]
    fn malformed_config_is_rejected_by_every_constructor() {
        let cfg = TrackerConfig {
            smoothing: 5.0,
            min_interval: Duration::ZERO,
            ..TrackerConfig::default()
        };
        let nan = TrackerConfig {
            smoothing: f64::NAN,
            ..cfg.clone()
        };

        assert!(matches!(
            Publisher::manual(cfg.clone()),
            Err(ConfigError::InvalidSmoothing { .. })
        ));
        assert!(Publisher::new(0..3, cfg.clone()).is_err());
        assert!((0..3).publish(cfg).is_err());
        assert!(Publisher::from_stream(futures::stream::iter(0..3), nan).is_err());
    }

    #[test]
    fn explicit_total_wins_over_inference() {
        let cfg = TrackerConfig {
            total: Some(100),
            ..TrackerConfig::default()
        };
        assert_eq!(Publisher::new(0..7, cfg).unwrap().snapshot().total, Some(100));
    }

    #[test]
    fn replays_current_state_on_subscribe() {
        let mut publisher = Publisher::manual(unthrottled()).unwrap();
        publisher.update(3);

        let (seen, callback) = counts();
        publisher.subscribe(callback);
        assert_eq!(*seen.lock().unwrap(), vec![3]);
    }

    #[test]
    fn skip_replay_waits_for_next_advance() {
        let cfg = TrackerConfig {
            replay: ReplayPolicy::Skip,
            ..unthrottled()
        };
        let mut publisher = Publisher::manual(cfg).unwrap();
        let (seen, callback) = counts();
        publisher.subscribe(callback);
        assert!(seen.lock().unwrap().is_empty());

        publisher.update(1);
        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[test]
    fn invocations_equal_visible_advances_times_subscribers() {
        const SUBSCRIBERS: usize = 10;
        const STEPS: u64 = 25;

        let cfg = TrackerConfig {
            replay: ReplayPolicy::Skip,
            ..unthrottled()
        };
        let mut publisher = Publisher::new(0..STEPS, cfg).unwrap();
        let calls = Arc::new(Mutex::new(vec![0usize; SUBSCRIBERS]));
        for i in 0..SUBSCRIBERS {
            let calls = Arc::clone(&calls);
            publisher.subscribe(move |_| calls.lock().unwrap()[i] += 1);
        }

        for _ in publisher.by_ref() {}

        let calls = calls.lock().unwrap();
        assert!(calls.iter().all(|&n| n == STEPS as usize));
        assert_eq!(calls.iter().sum::<usize>(), STEPS as usize * SUBSCRIBERS);
    }

    #[test]
    fn counts_are_monotonic_and_end_at_length() {
        let mut publisher = Publisher::new(0..50, unthrottled()).unwrap();
        let (seen, callback) = counts();
        publisher.subscribe(callback);
        for _ in publisher.by_ref() {}

        let seen = seen.lock().unwrap();
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.last(), Some(&50));
    }

    #[test]
    fn throttled_advances_do_not_notify_but_final_state_is_flushed() {
        let cfg = TrackerConfig {
            min_interval: Duration::from_secs(3600),
            ..TrackerConfig::default()
        };
        let mut publisher = Publisher::new(0..10, cfg).unwrap();
        let (seen, callback) = counts();
        publisher.subscribe(callback);

        for _ in publisher.by_ref() {}
        assert_eq!(*seen.lock().unwrap(), vec![0, 10]);
    }

    #[test]
    fn always_notify_bypasses_throttling() {
        let cfg = TrackerConfig {
            min_interval: Duration::from_secs(3600),
            always_notify: true,
            replay: ReplayPolicy::Skip,
            ..TrackerConfig::default()
        };
        let mut publisher = Publisher::manual(cfg).unwrap();
        let (seen, callback) = counts();
        publisher.subscribe(callback);

        assert!(!publisher.update(1));
        assert!(!publisher.update(1));
        publisher.close();
        // close does not repeat a count that was already delivered
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn unsubscribe_is_idempotent_and_stops_delivery() {
        let mut publisher = Publisher::manual(unthrottled()).unwrap();
        let (seen, callback) = counts();
        let id = publisher.subscribe(callback);

        assert!(publisher.is_subscribed(id));
        assert!(publisher.unsubscribe(id));
        assert!(!publisher.unsubscribe(id));

        publisher.update(1);
        assert_eq!(*seen.lock().unwrap(), vec![0]);
    }

    #[test]
    fn break_does_not_count_the_element_in_hand() {
        let mut publisher = Publisher::new(0..10, unthrottled()).unwrap();
        for item in publisher.by_ref() {
            if item == 3 {
                break;
            }
        }
        publisher.close();
        assert_eq!(publisher.snapshot().count, 3);
        assert!(publisher.is_closed());
        assert!(!publisher.update(1));
    }

    #[test]
    fn isolated_callback_panic_is_counted() {
        let mut publisher = Publisher::manual(unthrottled()).unwrap();
        publisher.subscribe(|snap| {
            if snap.count == 2 {
                panic!("callback failure");
            }
        });
        let (seen, callback) = counts();
        publisher.subscribe(callback);

        publisher.update(1);
        publisher.update(1);
        publisher.update(1);

        assert_eq!(publisher.callback_failures(), 1);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn propagate_policy_unwinds_out_of_update() {
        let cfg = TrackerConfig {
            callback_policy: CallbackPolicy::Propagate,
            replay: ReplayPolicy::Skip,
            ..unthrottled()
        };
        let mut publisher = Publisher::manual(cfg).unwrap();
        publisher.subscribe(|_| panic!("callback failure"));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            publisher.update(1);
        }));
        assert!(result.is_err());
    }

    #[test]
    fn extension_trait_wraps_iterators() {
        let total: u32 = (1..=4).publish(unthrottled()).unwrap().sum();
        assert_eq!(total, 10);
    }

    #[tokio::test]
    async fn stream_source_counts_completed_futures() {
        use futures::StreamExt;
        use futures::stream::FuturesUnordered;

        let work: FuturesUnordered<_> = (0..5u64)
            .map(|i| async move {
                tokio::time::sleep(Duration::from_millis(i)).await;
                i
            })
            .collect();

        let mut publisher = Publisher::from_stream(work, unthrottled()).unwrap();
        assert_eq!(publisher.snapshot().total, Some(5));

        let (seen, callback) = counts();
        publisher.subscribe(callback);

        let mut done = Vec::new();
        while let Some(i) = publisher.next().await {
            done.push(i);
        }
        done.sort_unstable();
        assert_eq!(done, vec![0, 1, 2, 3, 4]);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4, 5]);
    }
}
