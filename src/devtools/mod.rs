//! Time-travel debugger connection.
//!
//! The devtools layer mirrors every resolution as a labelled JSON snapshot
//! and accepts jump requests back to earlier snapshots.

mod memory;

use thiserror::Error;

pub use memory::{DevtoolsEntry, MemoryDevtools};

#[derive(Debug, Error)]
pub enum DevtoolsError {
    #[error("Devtools connection unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to send '{label}' to devtools: {message}")]
    Send { label: String, message: String },

    #[error("Failed to encode snapshot for '{label}': {source}")]
    Encode {
        label: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Jump callback: receives the index of the snapshot to restore.
pub type JumpHandler = Box<dyn Fn(usize) + Send + Sync>;

/// Connection to an external time-travel debugger.
pub trait DevtoolsConnection: Send + Sync {
    /// Mirror one snapshot. Called on the dispatching thread; must not wait
    /// on the remote end.
    fn send(&self, label: &str, snapshot: &serde_json::Value) -> Result<(), DevtoolsError>;

    /// Register the callback invoked when the debugger asks to jump to the
    /// snapshot at an index (0 is the initial model).
    fn on_jump(&self, handler: JumpHandler) -> Result<(), DevtoolsError>;
}
