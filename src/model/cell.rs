use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use super::subscription::Subscription;

type Listener<M> = dyn Fn(&M) + Send + Sync;

struct CellInner<M> {
    value: RwLock<M>,
    version: AtomicU64,
    listeners: Mutex<Vec<Weak<Listener<M>>>>,
}

/// Owned state container for a running app.
///
/// Only the dispatch engine writes to it; everything else receives a
/// [`ModelView`].
pub(crate) struct ModelCell<M> {
    inner: Arc<CellInner<M>>,
}

impl<M> Clone for ModelCell<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: Clone + Send + Sync + 'static> ModelCell<M> {
    pub(crate) fn new(model: M) -> Self {
        Self {
            inner: Arc::new(CellInner {
                value: RwLock::new(model),
                version: AtomicU64::new(0),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn get(&self) -> M {
        self.inner.value.read().clone()
    }

    pub(crate) fn with<T>(&self, f: impl FnOnce(&M) -> T) -> T {
        f(&self.inner.value.read())
    }

    /// Replace the model and notify listeners.
    pub(crate) fn set(&self, model: M) {
        *self.inner.value.write() = model;
        self.inner.version.fetch_add(1, Ordering::SeqCst);
        self.notify();
    }

    /// Replace the model with `f(current)`.
    pub(crate) fn replace_with(&self, f: impl FnOnce(M) -> M) {
        let current = self.get();
        self.set(f(current));
    }

    pub(crate) fn view(&self) -> ModelView<M> {
        ModelView { cell: self.clone() }
    }

    fn notify(&self) {
        let live: Vec<Arc<Listener<M>>> = {
            let mut listeners = self.inner.listeners.lock();
            listeners.retain(|weak| weak.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        if live.is_empty() {
            return;
        }
        // Listeners get a snapshot so they may read the view or dispatch
        // without holding the value lock.
        let snapshot = self.get();
        for listener in live {
            listener(&snapshot);
        }
    }
}

/// Read-only, reactive projection of the model.
///
/// Handed to render functions and pages. Cloning is cheap.
pub struct ModelView<M> {
    cell: ModelCell<M>,
}

impl<M> Clone for ModelView<M> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<M: Clone + Send + Sync + 'static> ModelView<M> {
    /// Get a clone of the current model.
    pub fn get(&self) -> M {
        self.cell.get()
    }

    /// Read the current model without cloning it.
    ///
    /// Do not dispatch from inside `f`.
    pub fn with<T>(&self, f: impl FnOnce(&M) -> T) -> T {
        self.cell.with(f)
    }

    /// Number of writes since the app started.
    pub fn version(&self) -> u64 {
        self.cell.inner.version.load(Ordering::SeqCst)
    }

    /// Call `listener` with every new model until the subscription is dropped.
    pub fn subscribe(&self, listener: impl Fn(&M) + Send + Sync + 'static) -> Subscription {
        let listener: Arc<Listener<M>> = Arc::new(listener);
        self.cell
            .inner
            .listeners
            .lock()
            .push(Arc::downgrade(&listener));
        Subscription::hold(listener)
    }
}

impl<M> std::fmt::Debug for ModelView<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelView")
            .field("version", &self.cell.inner.version.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_model_and_bumps_version() {
        let cell = ModelCell::new(1);
        let view = cell.view();
        assert_eq!(view.version(), 0);

        cell.set(2);
        assert_eq!(view.get(), 2);
        assert_eq!(view.version(), 1);
    }

    #[test]
    fn replace_with_sees_current_value() {
        let cell = ModelCell::new(10);
        cell.set(20);
        cell.replace_with(|m| m + 1);
        assert_eq!(cell.get(), 21);
    }

    #[test]
    fn listeners_notified_in_registration_order() {
        let cell = ModelCell::new(0);
        let view = cell.view();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        let _a = view.subscribe(move |m| first.lock().push(("a", *m)));
        let second = Arc::clone(&seen);
        let _b = view.subscribe(move |m| second.lock().push(("b", *m)));

        cell.set(7);
        assert_eq!(*seen.lock(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn dropped_subscription_stops_notifications() {
        let cell = ModelCell::new(0);
        let view = cell.view();
        let count = Arc::new(AtomicU64::new(0));

        let counter = Arc::clone(&count);
        let sub = view.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        cell.set(1);
        drop(sub);
        cell.set(2);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listener_can_read_view_during_notification() {
        let cell = ModelCell::new(0u64);
        let view = cell.view();
        let observed = Arc::new(AtomicU64::new(0));

        let inner_view = view.clone();
        let out = Arc::clone(&observed);
        let _sub = view.subscribe(move |_| {
            out.store(inner_view.get(), Ordering::SeqCst);
        });

        cell.set(5);
        assert_eq!(observed.load(Ordering::SeqCst), 5);
    }
}
