use std::sync::Arc;

type Getter<M, R> = Arc<dyn Fn(&M) -> R + Send + Sync>;
type Setter<M, R> = Arc<dyn Fn(R, M) -> M + Send + Sync>;

/// Explicit getter/setter pair focusing on one part of a model.
///
/// A well-behaved lens satisfies `get(&set(r, m)) == r`; see
/// [`Lens::round_trips`].
pub struct Lens<M, R> {
    get: Getter<M, R>,
    set: Setter<M, R>,
}

impl<M, R> Clone for Lens<M, R> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

impl<M, R> Lens<M, R> {
    pub fn new(
        get: impl Fn(&M) -> R + Send + Sync + 'static,
        set: impl Fn(R, M) -> M + Send + Sync + 'static,
    ) -> Self {
        Self {
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    pub fn get(&self, model: &M) -> R {
        (self.get)(model)
    }

    pub fn set(&self, value: R, model: M) -> M {
        (self.set)(value, model)
    }

    /// Whether setting `value` into `model` reads back as `value`.
    pub fn round_trips(&self, value: R, model: M) -> bool
    where
        R: PartialEq + Clone,
    {
        self.get(&self.set(value.clone(), model)) == value
    }
}

impl<M, R> std::fmt::Debug for Lens<M, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lens").finish_non_exhaustive()
    }
}
