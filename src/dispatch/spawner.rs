use tokio::runtime::Handle;
use uuid::Uuid;

use crate::action::CommandFuture;
use crate::error::{DispatchError, ErrorRegistry, RuntimeError};

/// Runs async commands as supervised tokio tasks.
///
/// A failing or panicking command is reported to the registry and never
/// reaches the dispatcher or the host scheduler.
#[derive(Clone)]
pub(crate) struct Spawner {
    handle: Option<Handle>,
    errors: ErrorRegistry,
    instance: Uuid,
}

impl Spawner {
    /// `handle` is used when the resolving thread is not inside a runtime.
    pub(crate) fn new(handle: Option<Handle>, errors: ErrorRegistry, instance: Uuid) -> Self {
        Self {
            handle,
            errors,
            instance,
        }
    }

    pub(crate) fn spawn(&self, task: CommandFuture) -> Result<(), DispatchError> {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => self.handle.clone().ok_or(DispatchError::NoAsyncRuntime)?,
        };

        let errors = self.errors.clone();
        let instance = self.instance;
        let command = handle.spawn(task);

        handle.spawn(async move {
            match command.await {
                Ok(Ok(())) => {
                    tracing::trace!(instance = %instance, "Async command finished");
                }
                Ok(Err(e)) => errors.report(&RuntimeError::AsyncCommand(e)),
                Err(join) if join.is_panic() => {
                    let payload = join.into_panic();
                    let message = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "non-string panic payload".to_string());
                    errors.report(&RuntimeError::AsyncCommandPanicked(message));
                }
                Err(_) => {
                    tracing::debug!(instance = %instance, "Async command cancelled");
                }
            }
        });

        Ok(())
    }
}
