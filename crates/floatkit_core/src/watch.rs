//! Latest-value observables
//!
//! `WatchableValue<T>` is a small publish primitive with subject semantics:
//! it always holds a current value, a new watcher immediately receives that
//! value, and every later `set` is delivered to all watchers in subscription
//! order. There is no history or replay beyond the latest value.
//!
//! This is the seam between the physics layer (which emits positions every
//! frame) and the view layer (which repositions the visual element).

use slotmap::{new_key_type, SlotMap};
use std::sync::{Arc, Mutex, Weak};
use tracing::trace;

new_key_type! {
    /// Unique identifier for a registered watcher
    pub struct WatcherKey;
}

type Watcher<T> = Box<dyn FnMut(&T) + Send>;

struct Inner<T> {
    value: T,
    watchers: SlotMap<WatcherKey, Watcher<T>>,
}

/// A shareable, observable value with latest-value semantics
///
/// Cloning produces another handle to the same underlying value; all handles
/// see the same current value and watcher list.
pub struct WatchableValue<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for WatchableValue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> WatchableValue<T> {
    /// Create a new watchable value with an initial value
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                value: initial,
                watchers: SlotMap::with_key(),
            })),
        }
    }

    /// Get a clone of the current value
    pub fn get(&self) -> T {
        self.inner.lock().unwrap().value.clone()
    }

    /// Replace the current value and notify all watchers in order
    pub fn set(&self, value: T) {
        let mut inner = self.inner.lock().unwrap();
        inner.value = value;
        // Split borrow so watchers can read the stored value
        let Inner {
            ref value,
            ref mut watchers,
        } = *inner;
        for (_, watcher) in watchers.iter_mut() {
            watcher(value);
        }
    }

    /// Register a watcher
    ///
    /// The watcher is invoked immediately with the current value, then once
    /// per subsequent `set`. The subscription lives until the returned guard
    /// is dropped (or detached).
    ///
    /// Watchers run while the value's lock is held, so they must not call
    /// back into the same `WatchableValue`.
    pub fn watch<F>(&self, mut watcher: F) -> WatchGuard
    where
        F: FnMut(&T) + Send + 'static,
    {
        let key = {
            let mut inner = self.inner.lock().unwrap();
            watcher(&inner.value);
            inner.watchers.insert(Box::new(watcher))
        };
        trace!(?key, "watcher registered");

        let weak: Weak<Mutex<Inner<T>>> = Arc::downgrade(&self.inner);
        WatchGuard {
            unsubscribe: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.lock().unwrap().watchers.remove(key);
                }
            })),
        }
    }

    /// Number of currently registered watchers
    pub fn watcher_count(&self) -> usize {
        self.inner.lock().unwrap().watchers.len()
    }
}

/// Subscription guard returned by [`WatchableValue::watch`]
///
/// Dropping the guard unregisters the watcher.
pub struct WatchGuard {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl WatchGuard {
    /// Keep the subscription alive for the lifetime of the value
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}
