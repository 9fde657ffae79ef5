use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};
use scopeguard::defer;
use uuid::Uuid;

use super::{Dispatch, DispatchState, Dispatcher, Labeler, Origin, Resolution, ResolvedHook, Spawner, UpdateFn};
use crate::action::{resolver, Action};
use crate::config::RuntimeConfig;
use crate::error::{DispatchError, ErrorRegistry};
use crate::model::{Model, ModelCell, ModelView};

type TeardownHook = Box<dyn FnOnce() + Send>;

/// Owns the model cell of a running app and serializes every write to it.
pub(crate) struct Engine<M, Msg> {
    id: Uuid,
    cell: ModelCell<M>,
    update: UpdateFn<M, Msg>,
    labeler: Option<Labeler<Msg>>,
    dispatch: Dispatch<Msg>,
    gate: ReentrantMutex<()>,
    depth: AtomicUsize,
    torn_down: AtomicBool,
    resolved_hooks: Mutex<Vec<Arc<ResolvedHook<M>>>>,
    teardown_hooks: Mutex<Vec<TeardownHook>>,
    spawner: Spawner,
    errors: ErrorRegistry,
    config: RuntimeConfig,
}

impl<M: Model, Msg: Send + 'static> Engine<M, Msg> {
    pub(crate) fn start(
        model: M,
        update: UpdateFn<M, Msg>,
        labeler: Option<Labeler<Msg>>,
        config: RuntimeConfig,
    ) -> Arc<Self> {
        let id = Uuid::new_v4();
        let errors = ErrorRegistry::new(config.runtime.error_history);
        let handle = tokio::runtime::Handle::try_current().ok();
        if handle.is_none() {
            tracing::debug!(instance = %id, "No tokio runtime at start; async commands need one at dispatch time");
        }
        let spawner = Spawner::new(handle, errors.clone(), id);

        tracing::info!(instance = %id, "Runtime started");

        Arc::new_cyclic(|weak: &Weak<Self>| {
            let target: Weak<dyn Dispatcher<Msg>> = weak.clone();
            Self {
                id,
                cell: ModelCell::new(model),
                update,
                labeler,
                dispatch: Dispatch::new(target),
                gate: ReentrantMutex::new(()),
                depth: AtomicUsize::new(0),
                torn_down: AtomicBool::new(false),
                resolved_hooks: Mutex::new(Vec::new()),
                teardown_hooks: Mutex::new(Vec::new()),
                spawner,
                errors,
                config,
            }
        })
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn dispatch_handle(&self) -> Dispatch<Msg> {
        self.dispatch.clone()
    }

    pub(crate) fn view(&self) -> ModelView<M> {
        self.cell.view()
    }

    pub(crate) fn model(&self) -> M {
        self.cell.get()
    }

    pub(crate) fn errors(&self) -> &ErrorRegistry {
        &self.errors
    }

    pub(crate) fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub(crate) fn state(&self) -> DispatchState {
        match self.depth.load(Ordering::SeqCst) {
            0 => DispatchState::Idle,
            depth => DispatchState::Dispatching { depth },
        }
    }

    pub(crate) fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    pub(crate) fn add_resolved_hook(&self, hook: Arc<ResolvedHook<M>>) {
        self.resolved_hooks.lock().push(hook);
    }

    pub(crate) fn add_teardown_hook(&self, hook: TeardownHook) {
        if self.is_torn_down() {
            hook();
            return;
        }
        self.teardown_hooks.lock().push(hook);
    }

    /// Resolve `action` outside of `update`.
    pub(crate) fn resolve_action(
        &self,
        action: Action<M, Msg>,
        label: Option<String>,
    ) -> Result<(), DispatchError> {
        self.serialized(Origin::Action { label }, |engine| engine.resolve(action))
    }

    /// Replace the model without running `update`.
    pub(crate) fn restore(&self, model: M) {
        let result = self.serialized(Origin::TimeTravel, |engine| {
            engine.cell.set(model);
            Ok(())
        });
        debug_assert!(result.is_ok());
    }

    pub(crate) fn teardown(&self) {
        let _gate = self.gate.lock();
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }

        let hooks: Vec<TeardownHook> = std::mem::take(&mut *self.teardown_hooks.lock());
        tracing::info!(instance = %self.id, hooks = hooks.len(), "Runtime teardown");
        for hook in hooks {
            hook();
        }
        self.resolved_hooks.lock().clear();
    }

    fn resolve(&self, action: Action<M, Msg>) -> Result<(), DispatchError> {
        resolver::resolve(action, &self.cell, &self.dispatch, &self.spawner)
    }

    /// Run `body` under the dispatch gate, then the post-resolution hooks.
    fn serialized(
        &self,
        origin: Origin,
        body: impl FnOnce(&Self) -> Result<(), DispatchError>,
    ) -> Result<(), DispatchError> {
        if self.is_torn_down() {
            tracing::trace!(instance = %self.id, "Resolution after teardown ignored");
            return Ok(());
        }

        let _gate = self.gate.lock();
        // Teardown may have completed while this thread waited for the gate.
        if self.is_torn_down() {
            return Ok(());
        }

        let depth = self.depth.fetch_add(1, Ordering::SeqCst) + 1;
        defer! {
            self.depth.fetch_sub(1, Ordering::SeqCst);
        }

        let result = body(self);
        if let Err(ref e) = result {
            tracing::debug!(instance = %self.id, depth, label = ?origin.label(), error = %e, "Resolution failed");
        }

        self.run_resolved_hooks(&origin, depth);
        result
    }

    fn run_resolved_hooks(&self, origin: &Origin, depth: usize) {
        let hooks: Vec<Arc<ResolvedHook<M>>> = self.resolved_hooks.lock().clone();
        if hooks.is_empty() {
            return;
        }
        let model = self.cell.get();
        let resolution = Resolution {
            origin,
            model: &model,
            depth,
        };
        for hook in hooks {
            hook(&resolution);
        }
    }
}

impl<M: Model, Msg: Send + 'static> Dispatcher<Msg> for Engine<M, Msg> {
    fn dispatch(&self, msg: Msg) -> Result<(), DispatchError> {
        let label = self.labeler.as_ref().map(|labeler| labeler(&msg));
        tracing::trace!(instance = %self.id, label = ?label, "Dispatch");

        self.serialized(Origin::Message { label }, move |engine| {
            let current = engine.cell.get();
            let action = (engine.update)(msg, &current);
            drop(current);
            engine.resolve(action)
        })
    }
}
