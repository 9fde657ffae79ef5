use std::any::Any;

/// RAII guard for a registered listener.
///
/// The listener stays registered for as long as the guard is alive.
pub struct Subscription {
    guard: Option<Box<dyn Any + Send>>,
    on_drop: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Keep `guard` alive until the subscription is dropped.
    ///
    /// Used by sources that hold their listeners weakly.
    pub fn hold<T: Any + Send>(guard: T) -> Self {
        Self {
            guard: Some(Box::new(guard)),
            on_drop: None,
        }
    }

    /// Run `unsubscribe` when the subscription is dropped.
    pub fn on_drop(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            guard: None,
            on_drop: Some(Box::new(unsubscribe)),
        }
    }

    /// A subscription that owns nothing.
    pub fn empty() -> Self {
        Self {
            guard: None,
            on_drop: None,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.guard.take();
        if let Some(unsubscribe) = self.on_drop.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("holds_guard", &self.guard.is_some())
            .field("has_unsubscribe", &self.on_drop.is_some())
            .finish()
    }
}
