//! Actions: declarative descriptions of model changes and commands.
//!
//! An update function returns an [`Action`]; the resolver applies it to the
//! model cell. Actions combine with [`Action::combine`] (or `+`):
//!
//! - `DoNothing` is the identity on both sides.
//! - Combination is associative: `(a + b) + c` and `a + (b + c)` resolve to
//!   the same model with the same command invocations in the same order.
//! - Elements of `Combined` resolve left to right, each against the model
//!   left by the previous one.

pub(crate) mod resolver;

use std::collections::VecDeque;
use std::future::Future;
use std::ops::Add;
use std::pin::Pin;

use crate::dispatch::Dispatch;

/// Boxed future returned by async commands.
pub type CommandFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

pub type UpdateModelFn<M> = Box<dyn FnOnce(M) -> M + Send>;
pub type CommandFn<Msg> = Box<dyn FnOnce(&Dispatch<Msg>) -> anyhow::Result<()> + Send>;
pub type AsyncCommandFn<Msg> = Box<dyn FnOnce(Dispatch<Msg>) -> CommandFuture + Send>;

/// What to do with the model, and which commands to run, for one message.
pub enum Action<M, Msg> {
    /// Leave the model alone.
    DoNothing,
    /// Replace the model.
    SetModel(M),
    /// Replace the model with a function of the model as currently resolved.
    UpdateModel(UpdateModelFn<M>),
    /// Run a command now, synchronously.
    Command(CommandFn<Msg>),
    /// Spawn a command as an independent task.
    CommandAsync(AsyncCommandFn<Msg>),
    /// Resolve each action in order.
    Combined(VecDeque<Action<M, Msg>>),
}

impl<M, Msg> Action<M, Msg> {
    pub fn none() -> Self {
        Action::DoNothing
    }

    pub fn set_model(model: M) -> Self {
        Action::SetModel(model)
    }

    pub fn update_model(f: impl FnOnce(M) -> M + Send + 'static) -> Self {
        Action::UpdateModel(Box::new(f))
    }

    pub fn command(f: impl FnOnce(&Dispatch<Msg>) -> anyhow::Result<()> + Send + 'static) -> Self {
        Action::Command(Box::new(f))
    }

    pub fn command_async<F, Fut>(f: F) -> Self
    where
        F: FnOnce(Dispatch<Msg>) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Action::CommandAsync(Box::new(move |dispatch| Box::pin(f(dispatch))))
    }

    /// Command that dispatches `msg`.
    pub fn dispatch(msg: Msg) -> Self
    where
        Msg: Send + 'static,
    {
        Action::command(move |dispatch| dispatch.send(msg).map_err(anyhow::Error::from))
    }

    /// A `Combined` of exactly `actions`, in order, without flattening.
    pub fn sequence(actions: impl IntoIterator<Item = Action<M, Msg>>) -> Self {
        Action::Combined(actions.into_iter().collect())
    }

    /// Combine many actions, left to right.
    pub fn batch(actions: impl IntoIterator<Item = Action<M, Msg>>) -> Self {
        actions.into_iter().fold(Action::DoNothing, Action::combine)
    }

    /// `self` then `other`.
    pub fn combine(self, other: Action<M, Msg>) -> Self {
        match (self, other) {
            (Action::DoNothing, other) => other,
            (this, Action::DoNothing) => this,
            (Action::Combined(mut left), Action::Combined(right)) => {
                left.extend(right);
                Action::Combined(left)
            }
            (Action::Combined(mut left), other) => {
                left.push_back(other);
                Action::Combined(left)
            }
            (this, Action::Combined(mut right)) => {
                right.push_front(this);
                Action::Combined(right)
            }
            (this, other) => Action::Combined(VecDeque::from([this, other])),
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Action::DoNothing)
    }

    fn variant_name(&self) -> &'static str {
        match self {
            Action::DoNothing => "DoNothing",
            Action::SetModel(_) => "SetModel",
            Action::UpdateModel(_) => "UpdateModel",
            Action::Command(_) => "Command",
            Action::CommandAsync(_) => "CommandAsync",
            Action::Combined(_) => "Combined",
        }
    }
}

impl<M, Msg> Default for Action<M, Msg> {
    fn default() -> Self {
        Action::DoNothing
    }
}

impl<M, Msg> Add for Action<M, Msg> {
    type Output = Action<M, Msg>;

    fn add(self, rhs: Action<M, Msg>) -> Self::Output {
        self.combine(rhs)
    }
}

impl<M, Msg> std::fmt::Debug for Action<M, Msg> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Combined(items) => {
                // Shallow on purpose: nested sequences can be very deep.
                let names: Vec<&'static str> = items.iter().map(Action::variant_name).collect();
                f.debug_tuple("Combined").field(&names).finish()
            }
            other => f.write_str(other.variant_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type A = Action<i32, ()>;

    #[test]
    fn nothing_is_identity_on_both_sides() {
        let left: A = Action::none() + Action::set_model(1);
        assert!(matches!(left, Action::SetModel(1)));

        let right: A = Action::set_model(2) + Action::none();
        assert!(matches!(right, Action::SetModel(2)));
    }

    #[test]
    fn combine_flattens_sequences_in_order() {
        let a: A = Action::set_model(1) + Action::set_model(2);
        let b: A = Action::set_model(3) + Action::set_model(4);
        match a + b {
            Action::Combined(items) => {
                let models: Vec<i32> = items
                    .into_iter()
                    .map(|item| match item {
                        Action::SetModel(m) => m,
                        other => panic!("unexpected {:?}", other),
                    })
                    .collect();
                assert_eq!(models, vec![1, 2, 3, 4]);
            }
            other => panic!("expected Combined, got {:?}", other),
        }
    }

    #[test]
    fn single_action_prepends_to_sequence() {
        let tail: A = Action::set_model(2) + Action::set_model(3);
        match Action::set_model(1) + tail {
            Action::Combined(items) => {
                assert_eq!(items.len(), 3);
                assert!(matches!(items[0], Action::SetModel(1)));
            }
            other => panic!("expected Combined, got {:?}", other),
        }
    }

    #[test]
    fn long_right_chain_stays_flat() {
        let mut action: A = Action::set_model(0) + Action::set_model(0);
        for i in 1..=100_000 {
            action = Action::set_model(i) + action;
        }
        match action {
            Action::Combined(items) => {
                assert_eq!(items.len(), 100_002);
                assert!(matches!(items[0], Action::SetModel(100_000)));
                assert!(items.iter().all(|item| matches!(item, Action::SetModel(_))));
            }
            other => panic!("expected Combined, got {:?}", other),
        }
    }

    #[test]
    fn sequence_keeps_nesting() {
        let inner: A = Action::set_model(1) + Action::set_model(2);
        match Action::sequence(vec![inner, Action::none()]) {
            Action::Combined(items) => {
                assert_eq!(items.len(), 2);
                assert!(matches!(items[0], Action::Combined(_)));
                assert!(items[1].is_nothing());
            }
            other => panic!("expected Combined, got {:?}", other),
        }
    }

    #[test]
    fn batch_of_nothing_is_nothing() {
        let action: A = Action::batch(vec![Action::none(), Action::none()]);
        assert!(action.is_nothing());
    }

    #[test]
    fn debug_is_shallow() {
        let action: A = Action::set_model(1) + Action::update_model(|m: i32| m + 1);
        assert_eq!(format!("{:?}", action), "Combined([\"SetModel\", \"UpdateModel\"])");
    }
}
