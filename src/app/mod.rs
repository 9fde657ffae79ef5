//! Application definition and startup.
//!
//! An [`App`] is an owned bundle of init, update and render plus whatever
//! layers have been applied to it. Layers are [`AppTransformer`]s; the
//! building blocks they use are [`App::map_init`], [`App::map_update`],
//! [`App::on_start`], [`App::on_start_first`] and
//! [`App::label_messages_with`].
//!
//! [`App::run`] establishes the model, starts the dispatch engine, runs the
//! start hooks in the order their layers were applied (hooks added with
//! [`App::on_start_first`] ahead of the rest), then renders once.

mod transformer;

use std::sync::Arc;

pub use transformer::{layer, AppTransformer, FnLayer, Pipeline};

use crate::action::Action;
use crate::config::RuntimeConfig;
use crate::dispatch::{Dispatch, Engine, Labeler, Runtime, UpdateFn};
use crate::error::DispatchError;
use crate::model::{Model, ModelView};

type InitFn<M> = Box<dyn FnOnce() -> M>;
type RenderFn<M, Msg, R> = Box<dyn FnOnce(Dispatch<Msg>, ModelView<M>) -> R>;
type StartHook<M, Msg> = Box<dyn FnOnce(&Runtime<M, Msg>) -> Result<(), DispatchError>>;

pub struct App<M, Msg, R> {
    init: InitFn<M>,
    update: UpdateFn<M, Msg>,
    render: RenderFn<M, Msg, R>,
    start_hooks: Vec<StartHook<M, Msg>>,
    labeler: Option<Labeler<Msg>>,
    layers: Vec<&'static str>,
    config: RuntimeConfig,
}

impl<M, Msg, R> App<M, Msg, R> {
    /// Names of the applied layers, innermost first.
    pub fn layers(&self) -> &[&'static str] {
        &self.layers
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Apply one transformer. It becomes the outermost layer.
    pub fn with(self, transformer: impl AppTransformer<M, Msg, R> + 'static) -> Self {
        self.apply_boxed(Box::new(transformer))
    }

    /// Apply every stage of `pipeline`, in order.
    pub fn with_pipeline(self, pipeline: Pipeline<M, Msg, R>) -> Self {
        pipeline.apply(self)
    }

    fn apply_boxed(self, transformer: Box<dyn AppTransformer<M, Msg, R>>) -> Self {
        let name = transformer.name();
        tracing::debug!(layer = name, "Applying app layer");
        let mut app = transformer.transform(self);
        app.layers.push(name);
        app
    }
}

impl<M: Model, Msg: Send + 'static, R: 'static> App<M, Msg, R> {
    /// Define an app whose update returns an [`Action`].
    pub fn create(
        init: impl FnOnce() -> M + 'static,
        update: impl Fn(Msg, &M) -> Action<M, Msg> + Send + Sync + 'static,
        render: impl FnOnce(Dispatch<Msg>, ModelView<M>) -> R + 'static,
    ) -> Self {
        Self {
            init: Box::new(init),
            update: Arc::new(update),
            render: Box::new(render),
            start_hooks: Vec::new(),
            labeler: None,
            layers: Vec::new(),
            config: RuntimeConfig::default(),
        }
    }

    /// Define an app whose update returns the next model.
    pub fn create_simple(
        init: impl FnOnce() -> M + 'static,
        update: impl Fn(Msg, &M) -> M + Send + Sync + 'static,
        render: impl FnOnce(Dispatch<Msg>, ModelView<M>) -> R + 'static,
    ) -> Self {
        Self::create(init, move |msg, model| Action::SetModel(update(msg, model)), render)
    }

    /// Transform the initial model produced by the wrapped init.
    pub fn map_init(mut self, f: impl FnOnce(M) -> M + 'static) -> Self {
        let inner = self.init;
        self.init = Box::new(move || f(inner()));
        self
    }

    /// Wrap update. `f` receives the wrapped update and decides whether and
    /// how to call it.
    pub fn map_update(
        mut self,
        f: impl Fn(Msg, &M, &UpdateFn<M, Msg>) -> Action<M, Msg> + Send + Sync + 'static,
    ) -> Self {
        let inner = self.update;
        self.update = Arc::new(move |msg: Msg, model: &M| f(msg, model, &inner));
        self
    }

    /// Run `hook` after the engine has started and before the first render.
    ///
    /// An error aborts [`App::run`].
    pub fn on_start(
        mut self,
        hook: impl FnOnce(&Runtime<M, Msg>) -> Result<(), DispatchError> + 'static,
    ) -> Self {
        self.start_hooks.push(Box::new(hook));
        self
    }

    /// [`App::on_start`], but ahead of every start hook added so far.
    pub fn on_start_first(
        mut self,
        hook: impl FnOnce(&Runtime<M, Msg>) -> Result<(), DispatchError> + 'static,
    ) -> Self {
        self.start_hooks.insert(0, Box::new(hook));
        self
    }

    /// Install a message labeler. The outermost one wins.
    pub fn label_messages_with(
        mut self,
        labeler: impl Fn(&Msg) -> String + Send + Sync + 'static,
    ) -> Self {
        self.labeler = Some(Arc::new(labeler));
        self
    }

    /// Start the app.
    pub fn run(self) -> Result<Running<M, Msg, R>, DispatchError> {
        let App {
            init,
            update,
            render,
            start_hooks,
            labeler,
            layers,
            config,
        } = self;

        let model = init();
        let runtime = Runtime::new(Engine::start(model, update, labeler, config));
        tracing::info!(instance = %runtime.id(), layers = ?layers, "App starting");

        for hook in start_hooks {
            if let Err(e) = hook(&runtime) {
                tracing::warn!(instance = %runtime.id(), error = %e, "Start hook failed");
                runtime.teardown();
                return Err(e);
            }
        }

        let view = render(runtime.dispatch(), runtime.view());
        Ok(Running { runtime, view })
    }
}

impl<M, Msg, R> std::fmt::Debug for App<M, Msg, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("layers", &self.layers)
            .field("start_hooks", &self.start_hooks.len())
            .field("labeled", &self.labeler.is_some())
            .finish()
    }
}

/// A started app. Dropping it tears the runtime down.
pub struct Running<M: Model, Msg: Send + 'static, R> {
    runtime: Runtime<M, Msg>,
    view: R,
}

impl<M: Model, Msg: Send + 'static, R> Running<M, Msg, R> {
    pub fn runtime(&self) -> &Runtime<M, Msg> {
        &self.runtime
    }

    pub fn dispatch(&self) -> Dispatch<Msg> {
        self.runtime.dispatch()
    }

    pub fn model(&self) -> M {
        self.runtime.model()
    }

    /// The value returned by render.
    pub fn view(&self) -> &R {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut R {
        &mut self.view
    }
}

impl<M: Model, Msg: Send + 'static, R> Drop for Running<M, Msg, R> {
    fn drop(&mut self) {
        self.runtime.teardown();
    }
}
