use std::sync::{Arc, Weak};

use uuid::Uuid;

use super::{Dispatch, DispatchState, Engine, Resolution};
use crate::action::Action;
use crate::config::RuntimeConfig;
use crate::error::{DispatchError, ErrorRegistry};
use crate::model::{Model, ModelView};

/// Handle to a running app's engine.
///
/// Layers receive it in their start hooks. Unlike [`Dispatch`], it keeps the
/// engine alive; hooks that outlive a call should hold a [`WeakRuntime`].
pub struct Runtime<M, Msg> {
    engine: Arc<Engine<M, Msg>>,
}

impl<M, Msg> Clone for Runtime<M, Msg> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<M: Model, Msg: Send + 'static> Runtime<M, Msg> {
    pub(crate) fn new(engine: Arc<Engine<M, Msg>>) -> Self {
        Self { engine }
    }

    /// Instance id, used in log fields.
    pub fn id(&self) -> Uuid {
        self.engine.id()
    }

    pub fn dispatch(&self) -> Dispatch<Msg> {
        self.engine.dispatch_handle()
    }

    /// Read-only view of the model.
    pub fn view(&self) -> ModelView<M> {
        self.engine.view()
    }

    /// Snapshot of the current model.
    pub fn model(&self) -> M {
        self.engine.model()
    }

    pub fn state(&self) -> DispatchState {
        self.engine.state()
    }

    /// Resolve `action` as if `update` had returned it.
    pub fn resolve(&self, action: Action<M, Msg>) -> Result<(), DispatchError> {
        self.engine.resolve_action(action, None)
    }

    /// Like [`Runtime::resolve`], with a label shown to post-resolution hooks.
    pub fn resolve_labeled(
        &self,
        action: Action<M, Msg>,
        label: impl Into<String>,
    ) -> Result<(), DispatchError> {
        self.engine.resolve_action(action, Some(label.into()))
    }

    /// Replace the model without running `update`.
    ///
    /// Hooks observe the write with [`super::Origin::TimeTravel`].
    pub fn restore(&self, model: M) {
        self.engine.restore(model);
    }

    /// Run `hook` after every resolution, in registration order.
    pub fn on_resolved(&self, hook: impl Fn(&Resolution<'_, M>) + Send + Sync + 'static) {
        self.engine.add_resolved_hook(Arc::new(hook));
    }

    /// Run `hook` once at teardown, in registration order.
    ///
    /// Runs immediately if the runtime is already torn down.
    pub fn on_teardown(&self, hook: impl FnOnce() + Send + 'static) {
        self.engine.add_teardown_hook(Box::new(hook));
    }

    pub fn errors(&self) -> &ErrorRegistry {
        self.engine.errors()
    }

    pub fn config(&self) -> &RuntimeConfig {
        self.engine.config()
    }

    /// Stop the app. Later dispatches are no-ops.
    pub fn teardown(&self) {
        self.engine.teardown();
    }

    pub fn is_torn_down(&self) -> bool {
        self.engine.is_torn_down()
    }

    pub fn downgrade(&self) -> WeakRuntime<M, Msg> {
        WeakRuntime {
            engine: Arc::downgrade(&self.engine),
        }
    }
}

impl<M, Msg> std::fmt::Debug for Runtime<M, Msg> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime").finish_non_exhaustive()
    }
}

/// Non-owning [`Runtime`] handle.
pub struct WeakRuntime<M, Msg> {
    engine: Weak<Engine<M, Msg>>,
}

impl<M, Msg> Clone for WeakRuntime<M, Msg> {
    fn clone(&self) -> Self {
        Self {
            engine: Weak::clone(&self.engine),
        }
    }
}

impl<M: Model, Msg: Send + 'static> WeakRuntime<M, Msg> {
    /// `None` once the app has been dropped or torn down.
    pub fn upgrade(&self) -> Option<Runtime<M, Msg>> {
        self.engine
            .upgrade()
            .filter(|engine| !engine.is_torn_down())
            .map(Runtime::new)
    }
}
