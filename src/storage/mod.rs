//! Key-value persistence backends.

mod file;
mod memory;

use std::path::PathBuf;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors returned by [`KeyValueStore::set`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid storage key '{key}'")]
    InvalidKey { key: String },

    #[error("Failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// String-valued key-value storage.
///
/// `get` is called once while the app starts. `set` is called from a
/// background writer thread.
pub trait KeyValueStore: Send + Sync {
    /// `None` when the key is absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
