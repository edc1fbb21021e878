//! # Publisher shared across threads.
//!
//! A [`Publisher`] is normally owned and advanced by one thread. When several
//! threads must drive the **same** progress bar (e.g. a worker pool reporting
//! into one total-completion counter), wrap it in a [`SharedPublisher`]: every
//! operation goes through one mutex, the same discipline the handler applies to
//! its listener set.
//!
//! ## Rules
//! - Callbacks run while the lock is held; keep them short and never call back
//!   into the same `SharedPublisher` from a callback (it would deadlock).
//! - A poisoned lock is recovered: the publisher state is consistent between
//!   operations, a panic can only interrupt callback dispatch.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::progress::{ProgressBarId, ProgressSnapshot, SubscriptionId};
use crate::publisher::{Manual, Publisher};
use crate::tracker::{ProgressTracker, Track};

/// Cloneable, thread-safe handle to one publisher.
pub struct SharedPublisher<S = Manual, T = ProgressTracker> {
    id: ProgressBarId,
    inner: Arc<Mutex<Publisher<S, T>>>,
}

impl<S, T> Clone for SharedPublisher<S, T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, T: Track> SharedPublisher<S, T> {
    /// Moves `publisher` behind a mutex.
    pub fn new(publisher: Publisher<S, T>) -> Self {
        Self {
            id: publisher.id(),
            inner: Arc::new(Mutex::new(publisher)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Publisher<S, T>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Identity of the shared progress bar (no locking).
    #[inline]
    pub fn id(&self) -> ProgressBarId {
        self.id
    }

    /// See [`Publisher::update`].
    pub fn update(&self, n: u64) -> bool {
        self.lock().update(n)
    }

    /// See [`Publisher::subscribe`].
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ProgressSnapshot) + Send + 'static,
    {
        self.lock().subscribe(callback)
    }

    /// See [`Publisher::unsubscribe`].
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().unsubscribe(id)
    }

    /// See [`Publisher::set_total`].
    pub fn set_total(&self, total: Option<u64>) {
        self.lock().set_total(total);
    }

    /// See [`Publisher::close`].
    pub fn close(&self) {
        self.lock().close();
    }

    /// See [`Publisher::snapshot`].
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.lock().snapshot()
    }

    /// See [`Publisher::subscriber_count`].
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscriber_count()
    }

    /// Pulls the next element from a shared iterator source.
    ///
    /// Counting follows [`Publisher`] iteration: the previous element handed out
    /// (by any thread) is counted when the next one is requested.
    pub fn next_item(&self) -> Option<S::Item>
    where
        S: Iterator,
    {
        self.lock().next()
    }
}

impl<S, T: Track> Publisher<S, T> {
    /// Shares this publisher across threads.
    pub fn into_shared(self) -> SharedPublisher<S, T> {
        SharedPublisher::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    use crate::policies::ReplayPolicy;
    use crate::tracker::TrackerConfig;

    #[test]
    fn many_threads_advance_one_counter() {
        const THREADS: u64 = 8;
        const STEPS: u64 = 100;

        let cfg = TrackerConfig {
            min_interval: Duration::ZERO,
            replay: ReplayPolicy::Skip,
            total: Some(THREADS * STEPS),
            ..TrackerConfig::default()
        };
        let shared = Publisher::manual(cfg).unwrap().into_shared();

        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        shared.subscribe(move |snap| sink.lock().unwrap().push(snap.count));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..STEPS {
                        shared.update(1);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len() as u64, THREADS * STEPS);
        assert!(calls.windows(2).all(|w| w[0] < w[1]));
        assert!(shared.snapshot().is_complete());
    }

    #[test]
    fn shared_iteration_hands_out_each_element_once() {
        let cfg = TrackerConfig {
            min_interval: Duration::ZERO,
            ..TrackerConfig::default()
        };
        let shared = Publisher::new(0..100u32, cfg).unwrap().into_shared();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let mut mine = Vec::new();
                    while let Some(item) = shared.next_item() {
                        mine.push(item);
                    }
                    mine
                })
            })
            .collect();

        let mut all: Vec<u32> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
        assert_eq!(shared.snapshot().count, 100);
    }
}
