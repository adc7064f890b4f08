//! Change feeds: in-process listener registries
//!
//! Each write that should be observable publishes to a feed after its
//! transaction commits. Listeners run on the writing thread, in
//! subscription order, and must not subscribe or cancel from inside the
//! callback.

use garden_core::Subscription;
use indexmap::IndexMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tracing::debug;

type Listener<T> = Box<dyn FnMut(T) + Send + 'static>;

struct Listeners<T> {
    next_id: u64,
    entries: IndexMap<u64, Listener<T>>,
}

/// A registry of listeners for one stream of records
pub(crate) struct Feed<T> {
    name: &'static str,
    listeners: Arc<Mutex<Listeners<T>>>,
}

impl<T: Clone + Send + 'static> Feed<T> {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            listeners: Arc::new(Mutex::new(Listeners {
                next_id: 0,
                entries: IndexMap::new(),
            })),
        }
    }

    /// Register a listener until the returned subscription is cancelled
    ///
    /// The subscription only holds a weak handle, so cancelling after the
    /// store is gone does nothing.
    pub(crate) fn subscribe(&self, listener: Listener<T>) -> Subscription {
        let id = {
            let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.insert(id, listener);
            id
        };
        debug!(feed = self.name, listener = id, "listener added");

        let weak: Weak<Mutex<Listeners<T>>> = Arc::downgrade(&self.listeners);
        Subscription::new(format!("{}#{id}", self.name), move || {
            if let Some(listeners) = weak.upgrade() {
                let mut listeners = listeners.lock().unwrap_or_else(PoisonError::into_inner);
                listeners.entries.shift_remove(&id);
            }
        })
    }

    /// Deliver a record to every listener
    pub(crate) fn publish(&self, record: &T) {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.entries.values_mut() {
            listener(record.clone());
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collecting(feed: &Feed<u32>) -> (Subscription, Arc<Mutex<Vec<u32>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let sub = feed.subscribe(Box::new(move |n| sink.lock().unwrap().push(n)));
        (sub, seen)
    }

    #[test]
    fn test_publish_reaches_all_listeners() {
        let feed = Feed::new("numbers");
        let (_a, seen_a) = collecting(&feed);
        let (_b, seen_b) = collecting(&feed);

        feed.publish(&7);

        assert_eq!(*seen_a.lock().unwrap(), [7]);
        assert_eq!(*seen_b.lock().unwrap(), [7]);
    }

    #[test]
    fn test_cancelled_listener_is_removed() {
        let feed = Feed::new("numbers");
        let (mut sub, seen) = collecting(&feed);

        feed.publish(&1);
        sub.cancel();
        feed.publish(&2);

        assert_eq!(*seen.lock().unwrap(), [1]);
        assert_eq!(feed.len(), 0);
    }

    #[test]
    fn test_cancel_after_feed_dropped() {
        let feed = Feed::new("numbers");
        let (mut sub, _seen) = collecting(&feed);
        drop(feed);

        sub.cancel();
        assert!(!sub.is_active());
    }
}
