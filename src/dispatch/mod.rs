//! Dispatch engine.
//!
//! Every model write of a running app goes through the [`engine`]: a
//! message is labelled, passed to `update`, and the returned action is
//! resolved against the model cell. Post-resolution hooks then observe the
//! new model.
//!
//! # Invariants
//!
//! 1. Dispatch is serialized. Calls made from inside a resolution on the
//!    same thread nest depth-first; calls from other threads wait until the
//!    engine is [`DispatchState::Idle`].
//! 2. Post-resolution hooks run once per resolution, also when a command
//!    failed part way (mutations already applied are real).
//! 3. A [`Dispatch`] never keeps the engine alive. After teardown every
//!    call is a no-op returning `Ok(())`.

mod engine;
mod runtime;
mod spawner;

use std::sync::{Arc, Weak};

pub(crate) use engine::Engine;
pub use runtime::{Runtime, WeakRuntime};
pub(crate) use spawner::Spawner;

use crate::action::Action;
use crate::error::DispatchError;

/// The application's update function, shared by the engine and the layers
/// that wrap it.
pub type UpdateFn<M, Msg> = Arc<dyn Fn(Msg, &M) -> Action<M, Msg> + Send + Sync>;

/// Produces a human-readable label for a message (used by devtools).
pub type Labeler<Msg> = Arc<dyn Fn(&Msg) -> String + Send + Sync>;

pub(crate) type ResolvedHook<M> = dyn Fn(&Resolution<'_, M>) + Send + Sync;

/// Target of a [`Dispatch`] handle.
pub(crate) trait Dispatcher<Msg>: Send + Sync {
    fn dispatch(&self, msg: Msg) -> Result<(), DispatchError>;
}

/// Stand-in target for handles that are not bound to any engine.
struct Detached;

impl<Msg> Dispatcher<Msg> for Detached {
    fn dispatch(&self, _msg: Msg) -> Result<(), DispatchError> {
        Ok(())
    }
}

/// Handle used to send messages into a running app.
///
/// Cheap to clone, `Send + Sync`, and safe to call from inside commands.
pub struct Dispatch<Msg> {
    target: Weak<dyn Dispatcher<Msg>>,
}

impl<Msg: Send + 'static> Dispatch<Msg> {
    pub(crate) fn new(target: Weak<dyn Dispatcher<Msg>>) -> Self {
        Self { target }
    }

    /// A handle bound to nothing; every send is a no-op.
    pub fn detached() -> Self {
        let target: Weak<dyn Dispatcher<Msg>> = Weak::<Detached>::new();
        Self { target }
    }

    /// Send `msg` and resolve the resulting action before returning.
    ///
    /// Returns the error of a failing synchronous command. Sending to an
    /// app that has been torn down does nothing.
    pub fn send(&self, msg: Msg) -> Result<(), DispatchError> {
        match self.target.upgrade() {
            Some(target) => target.dispatch(msg),
            None => {
                tracing::trace!("Dispatch after teardown ignored");
                Ok(())
            }
        }
    }

    /// Whether the app behind this handle is still running.
    pub fn is_connected(&self) -> bool {
        self.target.strong_count() > 0
    }
}

impl<Msg> Clone for Dispatch<Msg> {
    fn clone(&self) -> Self {
        Self {
            target: Weak::clone(&self.target),
        }
    }
}

impl<Msg> std::fmt::Debug for Dispatch<Msg> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatch")
            .field("connected", &(self.target.strong_count() > 0))
            .finish()
    }
}

/// Whether the engine is currently resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    /// `depth` is the number of nested resolutions on the dispatching
    /// thread, starting at 1.
    Dispatching { depth: usize },
}

impl DispatchState {
    pub fn is_idle(&self) -> bool {
        matches!(self, DispatchState::Idle)
    }
}

/// What started a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// A message sent through [`Dispatch::send`].
    Message { label: Option<String> },
    /// An action resolved directly through [`Runtime::resolve`].
    Action { label: Option<String> },
    /// A model restored by [`Runtime::restore`].
    TimeTravel,
}

impl Origin {
    pub fn label(&self) -> Option<&str> {
        match self {
            Origin::Message { label } | Origin::Action { label } => label.as_deref(),
            Origin::TimeTravel => None,
        }
    }
}

/// Passed to post-resolution hooks.
#[derive(Debug)]
pub struct Resolution<'a, M> {
    pub origin: &'a Origin,
    /// The model after resolution.
    pub model: &'a M,
    pub depth: usize,
}
