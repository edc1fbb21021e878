//! # Callback registry owned by one publisher.
//!
//! Insertion-ordered list of `SubscriptionId → callback`. Dispatch walks the
//! list in registration order and applies the configured [`CallbackPolicy`].
//!
//! ## Rules
//! - Only the owning publisher touches the registry (`&mut self` everywhere).
//! - A removed callback is dropped immediately; it can never be invoked again.
//! - Under `Isolate`, a panic is counted and logged, then dispatch continues.

use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::error::panic_message;
use crate::policies::CallbackPolicy;
use crate::progress::{ProgressSnapshot, SubscriptionId};

/// Boxed subscriber callback.
pub type Callback = Box<dyn FnMut(&ProgressSnapshot) + Send + 'static>;

struct Registration {
    id: SubscriptionId,
    callback: Callback,
}

/// Ordered set of callbacks with failure accounting.
pub(crate) struct CallbackRegistry {
    entries: Vec<Registration>,
    policy: CallbackPolicy,
    failures: u64,
}

impl CallbackRegistry {
    pub(crate) fn new(policy: CallbackPolicy) -> Self {
        Self {
            entries: Vec::new(),
            policy,
            failures: 0,
        }
    }

    pub(crate) fn insert(&mut self, id: SubscriptionId, callback: Callback) {
        self.entries.push(Registration { id, callback });
    }

    /// Removes a registration; `false` if the id is unknown.
    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        match self.entries.iter().position(|r| r.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn contains(&self, id: SubscriptionId) -> bool {
        self.entries.iter().any(|r| r.id == id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn failures(&self) -> u64 {
        self.failures
    }

    /// Invokes every callback in registration order.
    pub(crate) fn dispatch(&mut self, snapshot: &ProgressSnapshot) {
        for entry in &mut self.entries {
            if !invoke(self.policy, entry.id, &mut entry.callback, snapshot) {
                self.failures += 1;
            }
        }
    }

    /// Invokes a single callback (used for replay-on-subscribe).
    pub(crate) fn dispatch_one(&mut self, id: SubscriptionId, snapshot: &ProgressSnapshot) {
        if let Some(entry) = self.entries.iter_mut().find(|r| r.id == id) {
            if !invoke(self.policy, entry.id, &mut entry.callback, snapshot) {
                self.failures += 1;
            }
        }
    }
}

/// Runs one callback under `policy`; returns `false` if it panicked and was isolated.
fn invoke(
    policy: CallbackPolicy,
    id: SubscriptionId,
    callback: &mut Callback,
    snapshot: &ProgressSnapshot,
) -> bool {
    match policy {
        CallbackPolicy::Propagate => {
            callback(snapshot);
            true
        }
        CallbackPolicy::Isolate => {
            match panic::catch_unwind(AssertUnwindSafe(|| callback(snapshot))) {
                Ok(()) => true,
                Err(payload) => {
                    warn!(
                        subscription = %id,
                        count = snapshot.count,
                        panic = %panic_message(&*payload),
                        "progress callback panicked"
                    );
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> Callback {
        let log = Arc::clone(log);
        Box::new(move |_| log.lock().unwrap().push(name))
    }

    #[test]
    fn dispatches_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = CallbackRegistry::new(CallbackPolicy::Isolate);
        registry.insert(SubscriptionId::new(), recorder(&log, "a"));
        registry.insert(SubscriptionId::new(), recorder(&log, "b"));
        registry.insert(SubscriptionId::new(), recorder(&log, "c"));

        registry.dispatch(&ProgressSnapshot::empty(None));
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn isolate_keeps_going_after_a_panic() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = CallbackRegistry::new(CallbackPolicy::Isolate);
        registry.insert(SubscriptionId::new(), recorder(&log, "before"));
        registry.insert(SubscriptionId::new(), Box::new(|_| panic!("boom")));
        registry.insert(SubscriptionId::new(), recorder(&log, "after"));

        registry.dispatch(&ProgressSnapshot::empty(None));
        assert_eq!(*log.lock().unwrap(), vec!["before", "after"]);
        assert_eq!(registry.failures(), 1);
    }

    #[test]
    fn propagate_aborts_remaining_callbacks() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = CallbackRegistry::new(CallbackPolicy::Propagate);
        registry.insert(SubscriptionId::new(), recorder(&log, "before"));
        registry.insert(SubscriptionId::new(), Box::new(|_| panic!("boom")));
        registry.insert(SubscriptionId::new(), recorder(&log, "after"));

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            registry.dispatch(&ProgressSnapshot::empty(None))
        }));
        assert!(result.is_err());
        assert_eq!(*log.lock().unwrap(), vec!["before"]);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut registry = CallbackRegistry::new(CallbackPolicy::Isolate);
        let id = SubscriptionId::new();
        registry.insert(id, Box::new(|_| {}));

        assert!(registry.contains(id));
        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert_eq!(registry.len(), 0);
    }
}
