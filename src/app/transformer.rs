use super::App;

/// A capability layered onto an [`App`] without touching its update logic.
///
/// A transformer takes the wrapped app by value and returns the wrapping
/// one. Applying `t1` and then `t2` makes `t2` the outer layer: its init
/// wrapper sees the model produced by `t1`'s, and its update wrapper calls
/// `t1`'s. Start hooks still run in application order, `t1` first.
pub trait AppTransformer<M, Msg, R> {
    /// Name recorded in [`App::layers`].
    fn name(&self) -> &'static str;

    fn transform(self: Box<Self>, app: App<M, Msg, R>) -> App<M, Msg, R>;
}

/// Transformer built from a closure. See [`layer`].
pub struct FnLayer<F> {
    name: &'static str,
    f: F,
}

/// Wrap a closure as a named transformer.
pub fn layer<F>(name: &'static str, f: F) -> FnLayer<F> {
    FnLayer { name, f }
}

impl<M, Msg, R, F> AppTransformer<M, Msg, R> for FnLayer<F>
where
    F: FnOnce(App<M, Msg, R>) -> App<M, Msg, R>,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn transform(self: Box<Self>, app: App<M, Msg, R>) -> App<M, Msg, R> {
        let FnLayer { f, .. } = *self;
        f(app)
    }
}

/// Explicit, ordered list of transformers.
pub struct Pipeline<M, Msg, R> {
    stages: Vec<Box<dyn AppTransformer<M, Msg, R>>>,
}

impl<M, Msg, R> Default for Pipeline<M, Msg, R> {
    fn default() -> Self {
        Self { stages: Vec::new() }
    }
}

impl<M, Msg, R> Pipeline<M, Msg, R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage; it will wrap every stage added before it.
    pub fn then(mut self, stage: impl AppTransformer<M, Msg, R> + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Stage names, innermost first.
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Apply every stage to `app`, in order.
    pub fn apply(self, app: App<M, Msg, R>) -> App<M, Msg, R> {
        self.stages
            .into_iter()
            .fold(app, |app, stage| app.apply_boxed(stage))
    }
}

impl<M, Msg, R> std::fmt::Debug for Pipeline<M, Msg, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.names())
            .finish()
    }
}
