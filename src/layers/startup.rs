use crate::action::Action;
use crate::app::{App, AppTransformer};
use crate::model::Model;

/// Label of the resolution started by [`InitAction`].
pub const INIT_ACTION_LABEL: &str = "@@INIT_ACTION";

/// Resolves an action once, after the initial model is established and
/// before the first render.
pub struct InitAction<M, Msg> {
    action: Action<M, Msg>,
}

impl<M, Msg> InitAction<M, Msg> {
    pub fn new(action: Action<M, Msg>) -> Self {
        Self { action }
    }
}

impl<M: Model, Msg: Send + 'static, R: 'static> AppTransformer<M, Msg, R> for InitAction<M, Msg> {
    fn name(&self) -> &'static str {
        "init_action"
    }

    fn transform(self: Box<Self>, app: App<M, Msg, R>) -> App<M, Msg, R> {
        let action = self.action;
        app.on_start(move |runtime| runtime.resolve_labeled(action, INIT_ACTION_LABEL))
    }
}

/// Dispatches a message once, after the initial model is established and
/// before the first render.
pub struct InitMessage<Msg> {
    msg: Msg,
}

impl<Msg> InitMessage<Msg> {
    pub fn new(msg: Msg) -> Self {
        Self { msg }
    }
}

impl<M: Model, Msg: Send + 'static, R: 'static> AppTransformer<M, Msg, R> for InitMessage<Msg> {
    fn name(&self) -> &'static str {
        "init_message"
    }

    fn transform(self: Box<Self>, app: App<M, Msg, R>) -> App<M, Msg, R> {
        let msg = self.msg;
        app.on_start(move |runtime| runtime.dispatch().send(msg))
    }
}

impl<M: Model, Msg: Send + 'static, R: 'static> App<M, Msg, R> {
    pub fn with_init_action(self, action: Action<M, Msg>) -> Self {
        self.with(InitAction::new(action))
    }

    pub fn with_init_message(self, msg: Msg) -> Self {
        self.with(InitMessage::new(msg))
    }
}
