//! Error types and the runtime error registry.
//!
//! Two kinds of failure exist:
//! - [`DispatchError`] propagates to whoever called `Dispatch::send`,
//!   `Runtime::resolve` or `App::run`.
//! - [`RuntimeError`] is reported, never propagated: it is logged and kept
//!   in the [`ErrorRegistry`] of the running app.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use thiserror::Error;

use crate::devtools::DevtoolsError;
use crate::storage::StoreError;

/// Errors returned from a resolution.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A synchronous command returned an error.
    #[error("command failed: {0:#}")]
    Command(anyhow::Error),

    /// An async command was resolved with no tokio runtime available.
    #[error("async command requires a tokio runtime")]
    NoAsyncRuntime,
}

/// Failures that are reported at the dispatch boundary and never abort it.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("async command failed: {0:#}")]
    AsyncCommand(anyhow::Error),

    #[error("async command panicked: {0}")]
    AsyncCommandPanicked(String),

    #[error("failed to encode model for '{key}': {source}")]
    PersistEncode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to store model under '{key}': {source}")]
    PersistSave {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("devtools: {0}")]
    Devtools(#[from] DevtoolsError),
}

impl RuntimeError {
    /// Short category for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            RuntimeError::AsyncCommand(_) => "async_command",
            RuntimeError::AsyncCommandPanicked(_) => "async_panic",
            RuntimeError::PersistEncode { .. } => "persist_encode",
            RuntimeError::PersistSave { .. } => "persist_save",
            RuntimeError::Devtools(_) => "devtools",
        }
    }
}

/// A reported error, as kept by the registry.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: SystemTime,
    pub kind: &'static str,
    pub message: String,
}

/// Bounded ring of recently reported errors.
///
/// Cloning shares the same ring.
#[derive(Clone)]
pub struct ErrorRegistry {
    inner: Arc<Mutex<VecDeque<ErrorRecord>>>,
    capacity: usize,
}

impl ErrorRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    /// Log `error` and keep it, evicting the oldest record when full.
    pub fn report(&self, error: &RuntimeError) {
        tracing::warn!(kind = error.kind(), error = %error, "Runtime error reported");
        let record = ErrorRecord {
            timestamp: SystemTime::now(),
            kind: error.kind(),
            message: error.to_string(),
        };
        let mut ring = self.inner.lock();
        if ring.len() == self.capacity {
            ring.pop_front();
        }
        ring.push_back(record);
    }

    /// Records oldest first.
    pub fn recent(&self) -> Vec<ErrorRecord> {
        self.inner.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl std::fmt::Debug for ErrorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorRegistry")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
