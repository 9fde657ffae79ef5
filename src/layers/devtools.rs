use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;

use crate::app::{App, AppTransformer};
use crate::devtools::{DevtoolsConnection, DevtoolsError};
use crate::dispatch::{Origin, Runtime, WeakRuntime};
use crate::error::{ErrorRegistry, RuntimeError};
use crate::model::Model;

/// Label of the snapshot holding the initial model.
pub const INIT_LABEL: &str = "@@INIT";

/// Mirrors every resolution to a devtools connection and restores earlier
/// models on request.
///
/// The session starts ahead of the other layers' start hooks, so `@@INIT`
/// holds the model before any startup resolution and those resolutions are
/// mirrored whichever order the layers were applied in.
///
/// Messages are labelled with their `Debug` output. Jumps replace the model
/// directly: `update` does not run and the jump is not mirrored. A failing
/// connection disables mirroring; the app keeps running.
pub struct RemoteDev {
    connection: Arc<dyn DevtoolsConnection>,
}

impl RemoteDev {
    pub fn new(connection: impl DevtoolsConnection + 'static) -> Self {
        Self {
            connection: Arc::new(connection),
        }
    }
}

impl<M, Msg, R> AppTransformer<M, Msg, R> for RemoteDev
where
    M: Model + Serialize,
    Msg: Debug + Send + 'static,
    R: 'static,
{
    fn name(&self) -> &'static str {
        "remote_dev"
    }

    fn transform(self: Box<Self>, app: App<M, Msg, R>) -> App<M, Msg, R> {
        let connection = self.connection;
        app.label_messages_with(|msg: &Msg| format!("{:?}", msg))
            .on_start_first(move |runtime| {
                Session::start(connection, runtime);
                Ok(())
            })
    }
}

struct History<M> {
    snapshots: VecDeque<M>,
    /// Snapshots dropped from the front; index `evicted` is the oldest kept.
    evicted: usize,
}

struct Session<M> {
    connection: Arc<dyn DevtoolsConnection>,
    history: Mutex<History<M>>,
    max_history: usize,
    enabled: AtomicBool,
    errors: ErrorRegistry,
}

impl<M: Model + Serialize> Session<M> {
    fn start<Msg: Send + 'static>(connection: Arc<dyn DevtoolsConnection>, runtime: &Runtime<M, Msg>) {
        let session = Arc::new(Session {
            connection,
            history: Mutex::new(History {
                snapshots: VecDeque::new(),
                evicted: 0,
            }),
            max_history: runtime.config().devtools.max_history.max(1),
            enabled: AtomicBool::new(true),
            errors: runtime.errors().clone(),
        });

        session.record(INIT_LABEL, &runtime.model());
        if !session.is_enabled() {
            return;
        }

        let weak_session: Weak<Session<M>> = Arc::downgrade(&session);
        let weak_runtime: WeakRuntime<M, Msg> = runtime.downgrade();
        let registered = session.connection.on_jump(Box::new(move |index: usize| {
            if let (Some(session), Some(runtime)) = (weak_session.upgrade(), weak_runtime.upgrade()) {
                session.jump(&runtime, index);
            }
        }));
        if let Err(e) = registered {
            session.disable(e);
            return;
        }

        tracing::info!(instance = %runtime.id(), max_history = session.max_history, "Devtools connected");
        runtime.on_resolved(move |resolution| {
            let label = match resolution.origin {
                Origin::TimeTravel => return,
                Origin::Message { label } => label.as_deref().unwrap_or("Message"),
                Origin::Action { label } => label.as_deref().unwrap_or("Action"),
            };
            session.record(label, resolution.model);
        });
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn record(&self, label: &str, model: &M) {
        if !self.is_enabled() {
            return;
        }

        let snapshot = match serde_json::to_value(model) {
            Ok(snapshot) => snapshot,
            Err(source) => {
                self.disable(DevtoolsError::Encode {
                    label: label.to_string(),
                    source,
                });
                return;
            }
        };
        if let Err(e) = self.connection.send(label, &snapshot) {
            self.disable(e);
            return;
        }

        let mut history = self.history.lock();
        history.snapshots.push_back(model.clone());
        if history.snapshots.len() > self.max_history {
            history.snapshots.pop_front();
            history.evicted += 1;
        }
    }

    fn jump<Msg: Send + 'static>(&self, runtime: &Runtime<M, Msg>, index: usize) {
        if !self.is_enabled() {
            return;
        }

        let model = {
            let history = self.history.lock();
            index
                .checked_sub(history.evicted)
                .and_then(|offset| history.snapshots.get(offset))
                .cloned()
        };

        match model {
            Some(model) => {
                tracing::debug!(instance = %runtime.id(), index, "Time travel");
                runtime.restore(model);
            }
            None => {
                tracing::warn!(instance = %runtime.id(), index, "Snapshot not in history, jump ignored");
            }
        }
    }

    fn disable(&self, error: DevtoolsError) {
        if self.enabled.swap(false, Ordering::SeqCst) {
            tracing::warn!(error = %error, "Devtools mirroring disabled");
            self.errors.report(&RuntimeError::Devtools(error));
        }
    }
}

impl<M, Msg, R> App<M, Msg, R>
where
    M: Model + Serialize,
    Msg: Debug + Send + 'static,
    R: 'static,
{
    /// Mirror the app to `connection` for time-travel debugging.
    pub fn with_remote_dev(self, connection: impl DevtoolsConnection + 'static) -> Self {
        self.with(RemoteDev::new(connection))
    }
}
