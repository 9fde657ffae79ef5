//! Action resolver.
//!
//! Applies an [`Action`] to the model cell. Mutations are written to the
//! cell as they happen, so a command that dispatches sees every mutation
//! made before it in the same sequence.

use super::Action;
use crate::dispatch::{Dispatch, Spawner};
use crate::error::DispatchError;
use crate::model::{Model, ModelCell};

/// Resolve `action` against `cell`.
///
/// `Combined` sequences are unrolled onto an explicit work list, so
/// arbitrarily long or deeply nested sequences use constant stack.
///
/// A failing synchronous command stops resolution; mutations applied
/// before it are kept.
pub(crate) fn resolve<M: Model, Msg: Send + 'static>(
    action: Action<M, Msg>,
    cell: &ModelCell<M>,
    dispatch: &Dispatch<Msg>,
    spawner: &Spawner,
) -> Result<(), DispatchError> {
    let mut pending = vec![action];

    while let Some(next) = pending.pop() {
        let step = match next {
            Action::DoNothing => Ok(()),
            Action::SetModel(model) => {
                cell.set(model);
                Ok(())
            }
            Action::UpdateModel(f) => {
                cell.replace_with(f);
                Ok(())
            }
            Action::Command(f) => f(dispatch).map_err(DispatchError::Command),
            Action::CommandAsync(f) => spawner.spawn(f(dispatch.clone())),
            Action::Combined(sequence) => {
                pending.extend(sequence.into_iter().rev());
                Ok(())
            }
        };

        if let Err(e) = step {
            discard(pending);
            return Err(e);
        }
    }

    Ok(())
}

/// Drop unresolved actions without recursing into nested sequences.
fn discard<M, Msg>(mut pending: Vec<Action<M, Msg>>) {
    while let Some(next) = pending.pop() {
        if let Action::Combined(sequence) = next {
            pending.extend(sequence);
        }
    }
}
