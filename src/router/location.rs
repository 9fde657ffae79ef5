use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::model::Subscription;

type Listener = Arc<dyn Fn(&str) + Send + Sync>;

/// The address bar half of routing: the current URL plus notifications of
/// navigation the app did not initiate.
pub trait Location: Send + Sync {
    fn current(&self) -> String;

    /// Record `url` as the current URL. Must not notify listeners.
    fn push(&self, url: &str);

    /// Call `listener` on every external navigation until the subscription
    /// is dropped.
    fn subscribe(&self, listener: Box<dyn Fn(&str) + Send + Sync>) -> Subscription;
}

#[derive(Default)]
struct LocationState {
    current: String,
    history: Vec<String>,
}

struct LocationInner {
    state: Mutex<LocationState>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

/// In-process [`Location`] with a navigation history.
///
/// Cloning shares the same location.
#[derive(Clone)]
pub struct MemoryLocation {
    inner: Arc<LocationInner>,
}

impl MemoryLocation {
    pub fn new(initial: impl Into<String>) -> Self {
        let initial = initial.into();
        Self {
            inner: Arc::new(LocationInner {
                state: Mutex::new(LocationState {
                    current: initial.clone(),
                    history: vec![initial],
                }),
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Simulate the user navigating (typing a URL, pressing back).
    pub fn navigate_external(&self, url: &str) {
        self.record(url);
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        tracing::debug!(url, listeners = listeners.len(), "External navigation");
        for listener in listeners {
            listener(url);
        }
    }

    /// Every URL this location has held, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.inner.state.lock().history.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    fn record(&self, url: &str) {
        let mut state = self.inner.state.lock();
        state.current = url.to_string();
        state.history.push(url.to_string());
    }
}

impl Location for MemoryLocation {
    fn current(&self) -> String {
        self.inner.state.lock().current.clone()
    }

    fn push(&self, url: &str) {
        tracing::debug!(url, "Location push");
        self.record(url);
    }

    fn subscribe(&self, listener: Box<dyn Fn(&str) + Send + Sync>) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner.listeners.lock().push((id, Arc::from(listener)));

        let inner: Weak<LocationInner> = Arc::downgrade(&self.inner);
        Subscription::on_drop(move || {
            if let Some(inner) = inner.upgrade() {
                inner.listeners.lock().retain(|(other, _)| *other != id);
            }
        })
    }
}

impl std::fmt::Debug for MemoryLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLocation")
            .field("current", &self.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_does_not_notify() {
        let location = MemoryLocation::new("/");
        let hits = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&hits);
        let _sub = location.subscribe(Box::new(move |_: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        location.push("/a");
        assert_eq!(location.current(), "/a");
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        location.navigate_external("/b");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(location.history(), vec!["/", "/a", "/b"]);
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let location = MemoryLocation::new("/");
        let sub = location.subscribe(Box::new(|_: &str| {}));
        assert_eq!(location.listener_count(), 1);
        drop(sub);
        assert_eq!(location.listener_count(), 0);
    }
}
